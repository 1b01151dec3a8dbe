//! Token Types
//!
//! Tokens of the inline handler language.

/// Source span (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// Token with kind and span
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    String(Box<str>),
    Boolean(bool),
    Null,
    Undefined,

    Identifier(Box<str>),

    // Keywords
    This,
    Return,

    // Punctuators
    LParen,
    RParen,
    Dot,
    Comma,
    Semicolon,
    Eq,

    Eof,
    Error(Box<str>),
}

/// Map reserved words to their token
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    Some(match s {
        "true" => TokenKind::Boolean(true),
        "false" => TokenKind::Boolean(false),
        "null" => TokenKind::Null,
        "undefined" => TokenKind::Undefined,
        "this" => TokenKind::This,
        "return" => TokenKind::Return,
        _ => return None,
    })
}
