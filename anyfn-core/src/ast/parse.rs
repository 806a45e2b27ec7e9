//! Declaration-level parser.
//!
//! Splits a token stream into the ordered sequence of top-level declarations
//! and decomposes `func` declarations far enough to expose their name,
//! parameter list, and result list. Bodies stay opaque token runs, so nested
//! funcs are never visible as declarations.

use std::iter::Peekable;
use std::vec::IntoIter;

use super::scan::{TokKind, Token};

/// One top-level declaration, in source order.
#[derive(Debug, Clone)]
pub(crate) enum Decl {
    Func(FuncDecl),
    Type(Vec<Token>),
    Other(Vec<Token>),
}

/// A top-level func declaration (plain funcs and methods alike).
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub(crate) name: String,
    pub(crate) receiver: Option<Vec<Token>>,
    pub(crate) type_params: Option<Vec<Token>>,
    pub(crate) params: Vec<Token>,
    pub(crate) results: Vec<Token>,
    pub(crate) body: Option<Vec<Token>>,
}

impl FuncDecl {
    /// The declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the declaration takes any parameters.
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }

    /// True if the declaration has a result list.
    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    pub(crate) fn emit(&self, out: &mut String) {
        emit(out, "func");
        if let Some(receiver) = &self.receiver {
            emit(out, "(");
            for t in receiver {
                emit(out, &t.text);
            }
            emit(out, ")");
        }
        emit(out, &self.name);
        if let Some(type_params) = &self.type_params {
            emit(out, "[");
            for t in type_params {
                emit(out, &t.text);
            }
            emit(out, "]");
        }
        emit(out, "(");
        for t in &self.params {
            emit(out, &t.text);
        }
        emit(out, ")");
        for t in &self.results {
            emit(out, &t.text);
        }
        if let Some(body) = &self.body {
            emit(out, "{");
            for t in body {
                emit(out, &t.text);
            }
            emit(out, "}");
        }
        emit(out, ";");
    }
}

/// Append one token of canonical output.
///
/// A newline goes after `{` and `;` and nowhere else; both are positions
/// where rescanning the output can never insert a further semicolon, which
/// keeps the rendering a fixed point of scan-then-render.
pub(crate) fn emit(out: &mut String, text: &str) {
    out.push_str(text);
    out.push(match text {
        ";" | "{" => '\n',
        _ => ' ',
    });
}

#[derive(Debug)]
pub(crate) struct ParseIssue {
    pub line: usize,
    pub message: String,
}

/// Parse a scanned token stream into the package name and declaration arena.
pub(crate) fn parse_tokens(tokens: Vec<Token>) -> Result<(String, Vec<Decl>), ParseIssue> {
    let mut parser = Parser {
        input: tokens.into_iter().peekable(),
        last_line: 1,
    };
    let package = parser.package_clause()?;
    let mut decls = Vec::new();
    while parser.input.peek().is_some() {
        decls.push(parser.declaration()?);
    }
    Ok((package, decls))
}

struct Parser {
    input: Peekable<IntoIter<Token>>,
    last_line: usize,
}

impl Parser {
    fn bump(&mut self) -> Option<Token> {
        let tok = self.input.next();
        if let Some(tok) = &tok {
            self.last_line = tok.line;
        }
        tok
    }

    fn at_punct(&mut self, text: &str) -> bool {
        self.input
            .peek()
            .is_some_and(|t| t.kind == TokKind::Punct && t.text == text)
    }

    fn err(&self, message: impl Into<String>) -> ParseIssue {
        ParseIssue {
            line: self.last_line,
            message: message.into(),
        }
    }

    fn package_clause(&mut self) -> Result<String, ParseIssue> {
        match self.bump() {
            Some(t) if t.kind == TokKind::Keyword && t.text == "package" => {}
            _ => return Err(self.err("missing package clause")),
        }
        let name = match self.bump() {
            Some(t) if t.kind == TokKind::Ident => t.text,
            _ => return Err(self.err("expected package name")),
        };
        match self.bump() {
            Some(t) if t.kind == TokKind::Semi => {}
            _ => return Err(self.err("expected newline or ';' after package clause")),
        }
        Ok(name)
    }

    fn declaration(&mut self) -> Result<Decl, ParseIssue> {
        if let Some(first) = self.input.peek() {
            if first.kind == TokKind::Keyword && first.text == "func" {
                self.bump();
                return self.func_decl().map(Decl::Func);
            }
        }
        let is_type = self
            .input
            .peek()
            .is_some_and(|t| t.kind == TokKind::Keyword && t.text == "type");
        let tokens = self.balanced_until_semi()?;
        Ok(if is_type {
            Decl::Type(tokens)
        } else {
            Decl::Other(tokens)
        })
    }

    /// Collect tokens up to (and consuming, but not keeping) the first
    /// semicolon at bracket depth zero.
    fn balanced_until_semi(&mut self) -> Result<Vec<Token>, ParseIssue> {
        let mut out = Vec::new();
        let mut depth: i32 = 0;
        while let Some(tok) = self.bump() {
            match tok.kind {
                TokKind::Semi if depth == 0 => return Ok(out),
                TokKind::Punct => match tok.text.as_str() {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => depth -= 1,
                    _ => {}
                },
                _ => {}
            }
            out.push(tok);
        }
        Err(self.err("unexpected end of file in declaration"))
    }

    /// Collect tokens up to (and consuming, but not keeping) the closing
    /// delimiter matching an already consumed opener.
    fn balanced_group(&mut self, close: &str) -> Result<Vec<Token>, ParseIssue> {
        let mut out = Vec::new();
        let mut depth: i32 = 0;
        while let Some(tok) = self.bump() {
            if tok.kind == TokKind::Punct {
                match tok.text.as_str() {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => {
                        if depth == 0 {
                            if tok.text == close {
                                return Ok(out);
                            }
                            return Err(
                                self.err(format!("expected '{close}', found '{}'", tok.text))
                            );
                        }
                        depth -= 1;
                    }
                    _ => {}
                }
            }
            out.push(tok);
        }
        Err(self.err(format!("missing closing '{close}'")))
    }

    fn func_decl(&mut self) -> Result<FuncDecl, ParseIssue> {
        let receiver = if self.at_punct("(") {
            self.bump();
            Some(self.balanced_group(")")?)
        } else {
            None
        };

        let name = match self.bump() {
            Some(t) if t.kind == TokKind::Ident => t.text,
            _ => return Err(self.err("expected func name")),
        };

        let type_params = if self.at_punct("[") {
            self.bump();
            Some(self.balanced_group("]")?)
        } else {
            None
        };

        if !self.at_punct("(") {
            return Err(self.err(format!("expected parameter list for func '{name}'")));
        }
        self.bump();
        let params = self.balanced_group(")")?;

        let results = self.result_list(&name)?;

        let body = if self.at_punct("{") {
            self.bump();
            Some(self.balanced_group("}")?)
        } else {
            None
        };

        match self.bump() {
            Some(t) if t.kind == TokKind::Semi => {}
            _ => return Err(self.err(format!("expected newline or ';' after func '{name}'"))),
        }

        Ok(FuncDecl {
            name,
            receiver,
            type_params,
            params,
            results,
            body,
        })
    }

    /// Collect result-list tokens, stopping before the body `{` or the
    /// terminating semicolon of a bodyless declaration.
    ///
    /// A `{` directly after `struct` or `interface` opens a type literal,
    /// not the body, and is consumed with its braces into the result list.
    fn result_list(&mut self, name: &str) -> Result<Vec<Token>, ParseIssue> {
        let mut out = Vec::new();
        let mut depth: i32 = 0;
        let mut after_type_kw = false;
        loop {
            let Some(next) = self.input.peek() else {
                return Err(self.err(format!("unexpected end of file in func '{name}'")));
            };
            if depth == 0 && !after_type_kw {
                match next.kind {
                    TokKind::Semi => return Ok(out),
                    TokKind::Punct if next.text == "{" => return Ok(out),
                    _ => {}
                }
            }
            let Some(tok) = self.bump() else {
                return Err(self.err(format!("unexpected end of file in func '{name}'")));
            };
            if tok.kind == TokKind::Punct {
                match tok.text.as_str() {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => depth -= 1,
                    _ => {}
                }
            }
            after_type_kw =
                tok.kind == TokKind::Keyword && matches!(tok.text.as_str(), "struct" | "interface");
            out.push(tok);
        }
    }
}
