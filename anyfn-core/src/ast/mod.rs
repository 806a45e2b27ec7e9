//! Parsed Go source files and the rewrites performed on them.
//!
//! A [`SourceAst`] owns the package clause plus the ordered arena of
//! top-level declarations of one file. Mutations go through name lookups on
//! that arena, and the canonical rendering re-emits the token stream with
//! comments and insignificant whitespace normalized away. Two trees are
//! structurally equal exactly when their renderings are equal strings; that
//! is the only equality notion in the system.

mod parse;
mod scan;

pub use parse::FuncDecl;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::Error;
use parse::{emit, Decl};

/// One parsed Go source file.
#[derive(Debug)]
pub struct SourceAst {
    package: String,
    decls: Vec<Decl>,
}

impl SourceAst {
    /// Parse the Go source file at `path`.
    pub fn parse(path: &Path) -> Result<SourceAst, Error> {
        let source = fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&source).map_err(|err| match err {
            Error::Syntax { line, message } => Error::Parse {
                file: path.display().to_string(),
                line,
                message,
            },
            other => other,
        })
    }

    /// Parse Go source text already in memory.
    pub fn parse_str(source: &str) -> Result<SourceAst, Error> {
        let tokens = scan::scan(source).map_err(|e| Error::Syntax {
            line: e.line,
            message: e.message,
        })?;
        let (package, decls) = parse::parse_tokens(tokens).map_err(|e| Error::Syntax {
            line: e.line,
            message: e.message,
        })?;
        debug!(package = %package, decls = decls.len(), "parsed source file");
        Ok(SourceAst { package, decls })
    }

    /// The package name from the package clause.
    pub fn package_name(&self) -> &str {
        &self.package
    }

    /// Change the package name. A no-op when the name already matches.
    pub fn set_package(&mut self, name: &str) -> Result<(), Error> {
        if name.is_empty() {
            return Err(Error::EmptyPackageName);
        }
        if self.package != name {
            self.package = name.to_string();
        }
        Ok(())
    }

    /// Look up a top-level func declaration by exact, case-sensitive name.
    ///
    /// Funcs nested inside bodies are never found; the empty name never
    /// matches.
    pub fn func_decl(&self, name: &str) -> Option<&FuncDecl> {
        if name.is_empty() {
            return None;
        }
        self.decls.iter().find_map(|decl| match decl {
            Decl::Func(fd) if fd.name == name => Some(fd),
            _ => None,
        })
    }

    /// True if [`SourceAst::func_decl`] finds `name`.
    pub fn contains_func(&self, name: &str) -> bool {
        self.func_decl(name).is_some()
    }

    /// Exchange the names of two func declarations.
    ///
    /// Every resolved name must denote a func with no parameters and no
    /// result list. With `strict`, both names must resolve; without it, a
    /// single resolved name is renamed one-sidedly and resolving neither is
    /// a no-op. Validation happens before any mutation, so a failed swap
    /// leaves the tree untouched.
    pub fn swap_funcs(&mut self, fn1: &str, fn2: &str, strict: bool) -> Result<(), Error> {
        if strict && (!self.contains_func(fn1) || !self.contains_func(fn2)) {
            return Err(Error::SwapNotFound {
                fn1: fn1.to_string(),
                fn2: fn2.to_string(),
            });
        }

        let simple = |name: &str| {
            self.func_decl(name)
                .map_or(true, |fd| !fd.has_params() && !fd.has_results())
        };
        if !simple(fn1) || !simple(fn2) {
            return Err(Error::SwapSignature {
                fn1: fn1.to_string(),
                fn2: fn2.to_string(),
            });
        }

        if fn1 == fn2 {
            return Ok(());
        }

        for decl in &mut self.decls {
            if let Decl::Func(fd) = decl {
                if fd.name == fn1 {
                    fd.name = fn2.to_string();
                } else if fd.name == fn2 {
                    fd.name = fn1.to_string();
                }
            }
        }
        Ok(())
    }

    /// Canonical rendering: deterministic, with comments and insignificant
    /// whitespace stripped. The output rescans to the identical token
    /// stream, so rendering is stable under parse/render round trips.
    pub fn render(&self) -> String {
        let mut out = String::new();
        emit(&mut out, "package");
        emit(&mut out, &self.package);
        emit(&mut out, ";");
        for decl in &self.decls {
            match decl {
                Decl::Func(fd) => fd.emit(&mut out),
                Decl::Type(tokens) | Decl::Other(tokens) => {
                    for t in tokens {
                        emit(&mut out, &t.text);
                    }
                    emit(&mut out, ";");
                }
            }
        }
        out
    }

    /// Write the rendering to `filename` inside `dest`, or inside a fresh
    /// temporary directory when `dest` is `None`.
    ///
    /// The returned [`Persisted`] removes the artifact when released or
    /// dropped, on every exit path.
    pub fn persist(&self, dest: Option<&Path>, filename: &str) -> Result<Persisted, Error> {
        let (dir, owned) = match dest {
            Some(dir) => (dir.to_path_buf(), None),
            None => {
                let tmp = tempfile::Builder::new().prefix("anyfn").tempdir()?;
                (tmp.path().to_path_buf(), Some(tmp))
            }
        };
        let path = dir.join(filename);
        fs::write(&path, self.render())?;
        debug!(path = %path.display(), "persisted rendered source");
        let file = dest.map(|_| path.clone());
        Ok(Persisted {
            path,
            dir: owned,
            file,
        })
    }
}

impl fmt::Display for SourceAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Structural equality, defined as equality of canonical renderings.
impl PartialEq for SourceAst {
    fn eq(&self, other: &Self) -> bool {
        self.render() == other.render()
    }
}

/// A rendered tree written to disk, removed again on release or drop.
pub struct Persisted {
    path: PathBuf,
    dir: Option<TempDir>,
    file: Option<PathBuf>,
}

impl Persisted {
    /// Path of the written file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the artifact. Safe to call more than once; also runs on drop.
    pub fn release(&mut self) {
        if let Some(dir) = self.dir.take() {
            let _ = dir.close();
        }
        if let Some(file) = self.file.take() {
            let _ = fs::remove_file(file);
        }
    }
}

impl Drop for Persisted {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = r#"package sample

import "fmt"

func test1() {
	fmt.Println("test1")
}

func test2() {
	fmt.Println("test2")
}

func withArgs(n int) {
	fmt.Println(n)
}

func withResult() int {
	return 0
}
"#;

    fn ast(src: &str) -> SourceAst {
        SourceAst::parse_str(src).unwrap()
    }

    #[test]
    fn lookup_is_exact_and_top_level_only() {
        let tree = ast(SRC);
        assert!(tree.contains_func("test1"));
        assert!(!tree.contains_func("Test1"));
        assert!(!tree.contains_func("missing"));
        assert!(!tree.contains_func(""));

        let nested = ast("package p\n\nfunc outer() {\n\tinner := func() {}\n\t_ = inner\n}\n");
        assert!(nested.contains_func("outer"));
        assert!(!nested.contains_func("inner"));
    }

    #[test]
    fn set_package_renames_and_is_idempotent() {
        let mut tree = ast(SRC);
        tree.set_package("main").unwrap();
        assert_eq!(tree.package_name(), "main");
        let once = tree.render();
        tree.set_package("main").unwrap();
        assert_eq!(tree.render(), once);
    }

    #[test]
    fn empty_package_name_is_rejected() {
        let mut tree = ast(SRC);
        assert!(matches!(
            tree.set_package(""),
            Err(Error::EmptyPackageName)
        ));
    }

    #[test]
    fn render_ignores_comments_and_blank_lines() {
        let plain = ast("package p\n\nfunc f() {\n\tx := 1\n\t_ = x\n}\n");
        let noisy = ast(
            "// header comment\npackage p\n\n\n/* block\ncomment */\nfunc f() {\n\tx := 1 // note\n\n\t_ = x\n}\n",
        );
        assert_eq!(plain.render(), noisy.render());
        assert_eq!(plain, noisy);
    }

    #[test]
    fn swap_is_self_inverse() {
        let original = ast(SRC);
        let mut tree = ast(SRC);
        tree.swap_funcs("test1", "test2", true).unwrap();
        assert_ne!(tree, original);
        tree.swap_funcs("test1", "test2", true).unwrap();
        assert_eq!(tree, original);
    }

    #[test]
    fn swap_same_name_is_identity() {
        let original = ast(SRC);
        let mut tree = ast(SRC);
        tree.swap_funcs("test1", "test1", true).unwrap();
        assert_eq!(tree, original);
    }

    #[test]
    fn swap_same_name_still_checks_the_signature() {
        let mut tree = ast(SRC);
        assert!(matches!(
            tree.swap_funcs("withArgs", "withArgs", false),
            Err(Error::SwapSignature { .. })
        ));
    }

    #[test]
    fn strict_swap_requires_both_names() {
        let mut tree = ast(SRC);
        let err = tree.swap_funcs("test1", "missing", true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "func 'test1' or func 'missing' is not found"
        );
    }

    #[test]
    fn strict_resolution_is_checked_before_signatures() {
        let mut tree = ast(SRC);
        assert!(matches!(
            tree.swap_funcs("withArgs", "missing", true),
            Err(Error::SwapNotFound { .. })
        ));
    }

    #[test]
    fn signature_violations_fail_regardless_of_strict() {
        for strict in [false, true] {
            let mut tree = ast(SRC);
            assert!(matches!(
                tree.swap_funcs("test1", "withArgs", strict),
                Err(Error::SwapSignature { .. })
            ));
            let mut tree = ast(SRC);
            assert!(matches!(
                tree.swap_funcs("withResult", "test1", strict),
                Err(Error::SwapSignature { .. })
            ));
        }
    }

    #[test]
    fn failed_swap_leaves_the_tree_untouched() {
        let mut tree = ast(SRC);
        let before = tree.render();
        let _ = tree.swap_funcs("test1", "withArgs", false);
        assert_eq!(tree.render(), before);
    }

    #[test]
    fn non_strict_swap_renames_one_sidedly() {
        let mut tree = ast(SRC);
        tree.swap_funcs("test1", "main", false).unwrap();
        assert!(!tree.contains_func("test1"));
        assert!(tree.contains_func("main"));

        let expected = ast(&SRC.replace("func test1()", "func main()"));
        assert_eq!(tree, expected);
    }

    #[test]
    fn non_strict_swap_with_neither_name_is_a_no_op() {
        let mut tree = ast(SRC);
        let before = tree.render();
        tree.swap_funcs("nope1", "nope2", false).unwrap();
        assert_eq!(tree.render(), before);
    }

    #[test]
    fn display_matches_render() {
        let tree = ast(SRC);
        assert_eq!(tree.to_string(), tree.render());
    }

    #[test]
    fn persist_writes_the_rendering_and_release_removes_it() {
        let tree = ast(SRC);
        let mut persisted = tree.persist(None, "main.go").unwrap();
        let path = persisted.path().to_path_buf();
        assert_eq!(fs::read_to_string(&path).unwrap(), tree.render());

        persisted.release();
        assert!(!path.exists());
        persisted.release();
    }

    #[test]
    fn persist_cleans_up_on_drop() {
        let tree = ast(SRC);
        let path = {
            let persisted = tree.persist(None, "main.go").unwrap();
            persisted.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn persist_into_a_supplied_dir_removes_only_the_file() {
        let tree = ast(SRC);
        let dir = tempfile::TempDir::new().unwrap();
        let path = {
            let persisted = tree.persist(Some(dir.path()), "out.go").unwrap();
            assert!(persisted.path().exists());
            persisted.path().to_path_buf()
        };
        assert!(!path.exists());
        assert!(dir.path().exists());
    }
}
