//! A small C++ tokenizer.
//!
//! This is not a front-end: it only splits a snippet into the token
//! categories libclang reports, so that [`crate::AstBuilder`] can attach
//! realistic token streams to hand-built nodes.

use std::ops::Range;

use crate::TokenKind;

/// Reserved words reported as [`TokenKind::Keyword`].
pub const KEYWORDS: &[&str] = &[
    "alignas", "alignof", "auto", "bool", "break", "case", "catch", "char", "class", "const",
    "const_cast", "constexpr", "continue", "decltype", "default", "delete", "do", "double",
    "dynamic_cast", "else", "enum", "explicit", "extern", "false", "float", "for", "friend",
    "goto", "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "nullptr",
    "operator", "override", "private", "protected", "public", "reinterpret_cast", "return",
    "short", "signed", "sizeof", "static", "static_cast", "struct", "switch", "template", "this",
    "throw", "true", "try", "typedef", "typename", "union", "unsigned", "using", "virtual",
    "void", "volatile", "while",
];

/// Multi-character punctuators, longest first so the scan is greedy.
const PUNCTUATORS: &[&str] = &[
    "<<=", ">>=", "->*", "...", "::", "->", "++", "--", "==", "!=", "<=", ">=", "&&", "||", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", ".*",
];

/// Check if a string is a reserved C++ keyword.
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// A token produced by [`Lexer`], with its byte span in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexToken {
    pub kind: TokenKind,
    pub text: String,
    pub span: Range<usize>,
}

/// Simple lexer over a UTF-8 string.
pub struct Lexer<'src> {
    src: &'src str,
    pos: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'src str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn consume_while<F>(&mut self, mut pred: F)
    where
        F: FnMut(char) -> bool,
    {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn make(&self, kind: TokenKind, start: usize) -> LexToken {
        LexToken {
            kind,
            text: self.src[start..self.pos].to_string(),
            span: start..self.pos,
        }
    }

    fn comment(&mut self, start: usize) -> Option<LexToken> {
        let rest = self.rest();
        if rest.starts_with("//") {
            let len = rest.find('\n').unwrap_or(rest.len());
            self.pos += len;
            Some(self.make(TokenKind::Comment, start))
        } else if rest.starts_with("/*") {
            let len = rest[2..].find("*/").map(|i| i + 4).unwrap_or(rest.len());
            self.pos += len;
            Some(self.make(TokenKind::Comment, start))
        } else {
            None
        }
    }

    fn quoted(&mut self, start: usize, quote: char) -> LexToken {
        self.pos += quote.len_utf8();
        let mut escaped = false;
        while let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                break;
            }
        }
        self.make(TokenKind::Literal, start)
    }

    fn number(&mut self, start: usize) -> LexToken {
        self.consume_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '\'');
        self.make(TokenKind::Literal, start)
    }

    fn word(&mut self, start: usize) -> LexToken {
        self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let kind = if is_keyword(&self.src[start..self.pos]) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.make(kind, start)
    }

    fn punctuation(&mut self, start: usize, first: char) -> LexToken {
        let rest = self.rest();
        let len = PUNCTUATORS
            .iter()
            .find(|p| rest.starts_with(*p))
            .map(|p| p.len())
            .unwrap_or(first.len_utf8());
        self.pos += len;
        self.make(TokenKind::Punctuation, start)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = LexToken;

    fn next(&mut self) -> Option<LexToken> {
        self.skip_whitespace();
        let start = self.pos;
        let ch = self.peek()?;
        if let Some(comment) = self.comment(start) {
            return Some(comment);
        }
        let next_is_digit = self.rest()[ch.len_utf8()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit());
        let token = match ch {
            '"' | '\'' => self.quoted(start, ch),
            c if c.is_ascii_digit() => self.number(start),
            '.' if next_is_digit => self.number(start),
            c if c.is_ascii_alphabetic() || c == '_' => self.word(start),
            c => self.punctuation(start, c),
        };
        Some(token)
    }
}

/// Tokenize a whole snippet.
pub fn tokenize(src: &str) -> Vec<LexToken> {
    Lexer::new(src).collect()
}
