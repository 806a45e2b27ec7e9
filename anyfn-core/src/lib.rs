//! AnyFn Core Library
//!
//! Runs an arbitrary top-level, no-argument func in a Go source file as if
//! it were the program entry point:
//! - Syntax-tree parsing, func renaming, and canonical re-rendering
//! - Module-root discovery and package-relative test execution
//! - go toolchain invocation with filtered test output

pub mod ast;
pub mod error;
pub mod modroot;
pub mod runner;

pub use ast::{FuncDecl, Persisted, SourceAst};
pub use error::Error;
pub use runner::{run_as_main, run_as_test};
