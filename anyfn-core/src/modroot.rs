//! Locating the enclosing Go module.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Error;

/// Well-known manifest file marking the root of a Go module.
pub const GO_MOD: &str = "go.mod";

/// Walk from `start_dir` toward the filesystem root and return the absolute
/// path of the first regular file named `manifest`.
///
/// A directory with a matching name does not satisfy the search. The
/// filesystem root itself is never examined.
pub fn find_toward_root(start_dir: &Path, manifest: &str) -> Result<PathBuf, Error> {
    if manifest.is_empty() {
        return Err(Error::EmptyManifestName);
    }
    if !start_dir.is_dir() {
        return Err(Error::DirNotFound {
            dir: start_dir.display().to_string(),
        });
    }

    let mut dir = std::path::absolute(start_dir)?;
    while let Some(parent) = dir.parent().map(Path::to_path_buf) {
        let candidate = dir.join(manifest);
        if candidate.is_file() {
            debug!(manifest = %candidate.display(), "found module manifest");
            return Ok(candidate);
        }
        dir = parent;
    }

    Err(Error::ManifestNotFound {
        file: manifest.to_string(),
    })
}

/// True if `path` lies inside `root`, compared component-wise on absolute
/// paths.
pub fn is_inside(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}
