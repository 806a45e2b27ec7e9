//! Go source tokenizer.
//!
//! Produces the token stream the declaration parser and the canonical
//! renderer work with. Comments are discarded here, and semicolons are
//! materialized according to Go's automatic semicolon insertion rule, so
//! every later stage sees explicit statement boundaries.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokKind {
    Ident,
    Keyword,
    Lit,
    Punct,
    Semi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokKind,
    pub text: String,
    pub line: usize,
}

#[derive(Debug)]
pub(crate) struct ScanError {
    pub line: usize,
    pub message: String,
}

const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

const OPS3: &[&str] = &["<<=", ">>=", "&^=", "..."];
const OPS2: &[&str] = &[
    "==", "!=", "<=", ">=", "&&", "||", "<-", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "<<", ">>", "&^", ":=",
];
const OPS1: &str = "+-*/%&|^<>=!:.,()[]{}~";

/// Tokenize one Go source file.
pub(crate) fn scan(src: &str) -> Result<Vec<Token>, ScanError> {
    Scanner::new(src).run()
}

struct Scanner<'a> {
    input: Peekable<Chars<'a>>,
    line: usize,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            input: src.chars().peekable(),
            line: 1,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, ScanError> {
        while let Some(c) = self.input.next() {
            match c {
                '\n' => {
                    self.maybe_insert_semi();
                    self.line += 1;
                }
                ' ' | '\t' | '\r' => {}
                '/' => match self.input.peek() {
                    Some('/') => {
                        self.input.next();
                        self.eat_line_comment();
                    }
                    Some('*') => {
                        self.input.next();
                        self.eat_block_comment()?;
                    }
                    _ => self.operator('/')?,
                },
                '"' => self.interpreted_string()?,
                '`' => self.raw_string()?,
                '\'' => self.rune()?,
                ';' => self.push(TokKind::Semi, ";"),
                '.' if self.input.peek().is_some_and(|&d| d.is_ascii_digit()) => self.number('.'),
                c if is_ident_start(c) => self.ident_or_keyword(c),
                c if c.is_ascii_digit() => self.number(c),
                c => self.operator(c)?,
            }
        }
        // The scanner also inserts a semicolon at end of input.
        self.maybe_insert_semi();
        Ok(self.tokens)
    }

    fn push(&mut self, kind: TokKind, text: impl Into<String>) {
        self.tokens.push(Token {
            kind,
            text: text.into(),
            line: self.line,
        });
    }

    fn err(&self, message: impl Into<String>) -> ScanError {
        ScanError {
            line: self.line,
            message: message.into(),
        }
    }

    fn maybe_insert_semi(&mut self) {
        if self.tokens.last().is_some_and(asi_eligible) {
            self.push(TokKind::Semi, ";");
        }
    }

    fn eat_line_comment(&mut self) {
        // The terminating newline stays in the input so the main loop can
        // apply semicolon insertion for it.
        while let Some(&c) = self.input.peek() {
            if c == '\n' {
                break;
            }
            self.input.next();
        }
    }

    fn eat_block_comment(&mut self) -> Result<(), ScanError> {
        // A general comment containing a newline counts as a line end.
        let mut saw_newline = false;
        loop {
            match self.input.next() {
                Some('*') if self.input.peek() == Some(&'/') => {
                    self.input.next();
                    break;
                }
                Some('\n') => {
                    saw_newline = true;
                    self.line += 1;
                }
                Some(_) => {}
                None => return Err(self.err("block comment not terminated")),
            }
        }
        if saw_newline {
            self.maybe_insert_semi();
        }
        Ok(())
    }

    fn ident_or_keyword(&mut self, first: char) {
        let mut text = String::from(first);
        while let Some(&c) = self.input.peek() {
            if !is_ident_continue(c) {
                break;
            }
            text.push(c);
            self.input.next();
        }
        let kind = if KEYWORDS.contains(&text.as_str()) {
            TokKind::Keyword
        } else {
            TokKind::Ident
        };
        self.push(kind, text);
    }

    fn number(&mut self, first: char) {
        let mut text = String::from(first);
        while let Some(&c) = self.input.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                text.push(c);
                self.input.next();
            } else if (c == '+' || c == '-') && exponent_pending(&text) {
                text.push(c);
                self.input.next();
            } else {
                break;
            }
        }
        self.push(TokKind::Lit, text);
    }

    fn interpreted_string(&mut self) -> Result<(), ScanError> {
        let mut text = String::from('"');
        loop {
            match self.input.next() {
                Some('"') => {
                    text.push('"');
                    break;
                }
                Some('\\') => {
                    text.push('\\');
                    match self.input.next() {
                        Some('\n') | None => {
                            return Err(self.err("string literal not terminated"))
                        }
                        Some(escaped) => text.push(escaped),
                    }
                }
                Some('\n') | None => return Err(self.err("string literal not terminated")),
                Some(c) => text.push(c),
            }
        }
        self.push(TokKind::Lit, text);
        Ok(())
    }

    fn raw_string(&mut self) -> Result<(), ScanError> {
        let mut text = String::from('`');
        loop {
            match self.input.next() {
                Some('`') => {
                    text.push('`');
                    break;
                }
                Some('\n') => {
                    text.push('\n');
                    self.line += 1;
                }
                Some(c) => text.push(c),
                None => return Err(self.err("raw string literal not terminated")),
            }
        }
        self.push(TokKind::Lit, text);
        Ok(())
    }

    fn rune(&mut self) -> Result<(), ScanError> {
        let mut text = String::from('\'');
        loop {
            match self.input.next() {
                Some('\'') => {
                    text.push('\'');
                    break;
                }
                Some('\\') => {
                    text.push('\\');
                    match self.input.next() {
                        Some('\n') | None => return Err(self.err("rune literal not terminated")),
                        Some(escaped) => text.push(escaped),
                    }
                }
                Some('\n') | None => return Err(self.err("rune literal not terminated")),
                Some(c) => text.push(c),
            }
        }
        self.push(TokKind::Lit, text);
        Ok(())
    }

    fn operator(&mut self, first: char) -> Result<(), ScanError> {
        if !OPS1.contains(first) {
            return Err(self.err(format!("illegal character {first:?}")));
        }
        let mut text = String::from(first);
        if let Some(&second) = self.input.peek() {
            let mut two = text.clone();
            two.push(second);
            if OPS2.contains(&two.as_str()) || OPS3.iter().any(|op| op.starts_with(two.as_str())) {
                self.input.next();
                text = two;
                if let Some(&third) = self.input.peek() {
                    let mut three = text.clone();
                    three.push(third);
                    if OPS3.contains(&three.as_str()) {
                        self.input.next();
                        text = three;
                    }
                }
            }
        }
        if text == ".." {
            return Err(self.err("unexpected '..'"));
        }
        self.push(TokKind::Punct, text);
        Ok(())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn exponent_pending(text: &str) -> bool {
    let hex = text.starts_with("0x") || text.starts_with("0X");
    match text.chars().last() {
        Some('e' | 'E') => !hex,
        Some('p' | 'P') => hex,
        _ => false,
    }
}

fn asi_eligible(tok: &Token) -> bool {
    match tok.kind {
        TokKind::Ident | TokKind::Lit => true,
        TokKind::Keyword => matches!(
            tok.text.as_str(),
            "break" | "continue" | "fallthrough" | "return"
        ),
        TokKind::Punct => matches!(tok.text.as_str(), ")" | "]" | "}" | "++" | "--"),
        TokKind::Semi => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(src: &str) -> Vec<String> {
        scan(src).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn inserts_semicolon_at_line_end() {
        assert_eq!(
            texts("x := 1\ny := 2\n"),
            vec!["x", ":=", "1", ";", "y", ":=", "2", ";"]
        );
    }

    #[test]
    fn no_semicolon_after_a_binary_operator() {
        assert_eq!(texts("x :=\n1\n"), vec!["x", ":=", "1", ";"]);
    }

    #[test]
    fn inserts_semicolon_at_end_of_input() {
        assert_eq!(texts("return"), vec!["return", ";"]);
    }

    #[test]
    fn comments_are_discarded() {
        assert_eq!(
            texts("x := 1 // trailing\n// whole line\ny := 2\n"),
            texts("x := 1\ny := 2\n")
        );
        assert_eq!(texts("x := /* inline */ 1\n"), texts("x := 1\n"));
    }

    #[test]
    fn block_comment_spanning_lines_ends_the_line() {
        assert_eq!(texts("x := 1 /* spans\nlines */ y := 2\n"), texts("x := 1\ny := 2\n"));
    }

    #[test]
    fn raw_string_spans_lines() {
        let toks = scan("s := `a\nb`\n").unwrap();
        assert_eq!(toks[2].text, "`a\nb`");
        assert_eq!(toks[3].kind, TokKind::Semi);
    }

    #[test]
    fn string_escapes_stay_verbatim() {
        let toks = scan(r#"s := "a\"b{""#).unwrap();
        assert_eq!(toks[2].text, r#""a\"b{""#);
        assert_eq!(toks[2].kind, TokKind::Lit);
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(
            texts("a <<= b <- c &^ d\n"),
            vec!["a", "<<=", "b", "<-", "c", "&^", "d", ";"]
        );
        assert_eq!(texts("f(xs...)\n"), vec!["f", "(", "xs", "...", ")", ";"]);
    }

    #[test]
    fn numeric_literals_are_single_tokens() {
        assert_eq!(
            texts("x := 1e+9 + 0x1p-2 + 3i\n"),
            vec!["x", ":=", "1e+9", "+", "0x1p-2", "+", "3i", ";"]
        );
    }

    #[test]
    fn unterminated_literals_are_errors() {
        assert!(scan("s := \"abc\n").is_err());
        assert!(scan("s := `abc").is_err());
        assert!(scan("/* never closed").is_err());
    }

    #[test]
    fn line_numbers_are_tracked() {
        let toks = scan("a\nb\n").unwrap();
        assert_eq!(toks[0].line, 1);
        assert_eq!(toks[2].line, 2);
    }
}
