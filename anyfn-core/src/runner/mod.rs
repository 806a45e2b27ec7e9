//! Execution orchestration.
//!
//! The two public entry points rewrite or harness a target file and hand it
//! to the go toolchain. Temporary artifacts and the working-directory switch
//! are scoped guards, so both are undone on every exit path. One invocation
//! at a time per process: the working-directory switch is process-global.

mod toolchain;

use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ast::SourceAst;
use crate::error::Error;
use crate::modroot::{self, GO_MOD};

#[cfg(test)]
pub(crate) use toolchain::go_available;

/// Run `func` in `file` as if it were the program's main func.
///
/// The file is reparented into `package main`, `func` is name-swapped with
/// `main`, and the rendering is persisted to a fresh temp dir and handed to
/// `go run` with inherited stdio.
pub fn run_as_main(file: &str, func: &str) -> Result<(), Error> {
    if file.is_empty() {
        return Err(Error::EmptyFileArg);
    }
    if func.is_empty() {
        return Err(Error::EmptyFnArg);
    }

    let mut ast = SourceAst::parse(Path::new(file))?;
    if !ast.contains_func(func) {
        return Err(Error::FuncNotFound {
            file: file.to_string(),
            func: func.to_string(),
        });
    }

    ast.set_package("main")?;
    ast.swap_funcs(func, "main", false)?;

    let artifact = ast.persist(None, "main.go")?;
    toolchain::go_run(artifact.path())
}

/// Run `func` in `file` through a synthesized `go test` harness.
///
/// The target file must lie inside the Go module enclosing the current
/// working directory. A `TestMain` harness calling `func` is written next to
/// the file, and `go test -v` runs the enclosing package from the module
/// root with its pass-summary output suppressed.
///
/// The target package must not already define `TestMain`; the generated
/// harness collides with it.
pub fn run_as_test(file: &str, func: &str) -> Result<(), Error> {
    if file.is_empty() {
        return Err(Error::EmptyFileArg);
    }
    if func.is_empty() {
        return Err(Error::EmptyFnArg);
    }

    let abs = std::path::absolute(file)?;

    let manifest = modroot::find_toward_root(Path::new("."), GO_MOD)
        .map_err(|_| Error::OutsideAnyModule)?;
    let Some(root) = manifest.parent() else {
        return Err(Error::OutsideAnyModule);
    };

    if !modroot::is_inside(&abs, root) {
        return Err(Error::OutsideModule {
            file: file.to_string(),
            root: root.display().to_string(),
        });
    }

    let ast = SourceAst::parse(Path::new(file))?;
    let Some(decl) = ast.func_decl(func) else {
        return Err(Error::FuncNotFound {
            file: file.to_string(),
            func: func.to_string(),
        });
    };
    if decl.has_params() {
        return Err(Error::FuncHasArgs {
            func: func.to_string(),
        });
    }

    let Some(dir) = abs.parent() else {
        return Err(Error::DirNotFound {
            dir: abs.display().to_string(),
        });
    };

    // The go tool skips files whose names start with '.' or '_', so the
    // harness name must begin with a plain prefix.
    let mut harness = tempfile::Builder::new()
        .prefix("anyfn")
        .suffix("_test.go")
        .tempfile_in(dir)?;
    harness.write_all(test_harness(ast.package_name(), func).as_bytes())?;
    harness.flush()?;
    debug!(harness = %harness.path().display(), "wrote test harness");

    let pkg = package_path(dir, root);
    let _workdir = Workdir::enter(root)?;
    toolchain::go_test(&pkg)
}

/// Package path of `dir` relative to the module root, with the leading
/// relative marker the go tool expects.
fn package_path(dir: &Path, root: &Path) -> String {
    let rel = dir.strip_prefix(root).unwrap_or(Path::new(""));
    format!("./{}", rel.display())
}

fn test_harness(package: &str, func: &str) -> String {
    format!(
        "package {package}\n\nimport (\n\t\"testing\"\n)\n\nfunc TestMain(m *testing.M) {{\n\t{func}()\n}}\n"
    )
}

/// Scoped working-directory switch; the saved directory is restored on drop.
struct Workdir {
    saved: PathBuf,
}

impl Workdir {
    fn enter(dir: &Path) -> Result<Workdir, Error> {
        let saved = env::current_dir()?;
        env::set_current_dir(dir)?;
        debug!(dir = %dir.display(), "entered module root");
        Ok(Workdir { saved })
    }
}

impl Drop for Workdir {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.saved);
    }
}
