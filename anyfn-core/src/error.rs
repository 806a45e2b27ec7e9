//! Error types shared by every component.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Everything that can go wrong while rewriting or running a Go file.
///
/// All failures are synchronous and terminal for the invocation; none are
/// retried.
#[derive(Error, Debug)]
pub enum Error {
    #[error("file must not be empty")]
    EmptyFileArg,

    #[error("fn must not be empty")]
    EmptyFnArg,

    #[error("package name must not be empty")]
    EmptyPackageName,

    #[error("manifest file name must not be empty")]
    EmptyManifestName,

    #[error("cannot read '{}': {source}", .path.display())]
    ReadFile { path: PathBuf, source: io::Error },

    #[error("cannot parse '{file}': line {line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("file '{file}' has no func '{func}'")]
    FuncNotFound { file: String, func: String },

    #[error("func '{fn1}' or func '{fn2}' is not found")]
    SwapNotFound { fn1: String, fn2: String },

    #[error("func '{fn1}' and '{fn2}' must not have arguments and return values")]
    SwapSignature { fn1: String, fn2: String },

    #[error("func '{func}' must have no args")]
    FuncHasArgs { func: String },

    #[error("dir '{dir}' is not found")]
    DirNotFound { dir: String },

    #[error("file '{file}' is not found")]
    ManifestNotFound { file: String },

    #[error("must be invoked from within a Go module")]
    OutsideAnyModule,

    #[error("file '{file}' must be inside the module dir '{root}'")]
    OutsideModule { file: String, root: String },

    #[error("'{tool}' is not found in PATH")]
    ToolchainMissing { tool: &'static str },

    #[error("go {subcommand} failed: {status}")]
    Subprocess {
        subcommand: &'static str,
        status: ExitStatus,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
