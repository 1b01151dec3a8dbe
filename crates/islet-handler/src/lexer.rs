//! Handler Lexer
//!
//! Tokenizes inline handler source such as `save(); return false`.

use super::token::{keyword_from_str, Span, Token, TokenKind};
use std::iter::Peekable;
use std::str::Chars;

pub struct Lexer<'src> {
    source: &'src str,
    chars: Peekable<Chars<'src>>,
    pos: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            pos: 0,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.pos as usize..].chars();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                Some('/') if self.peek_next() == Some('*') => {
                    self.advance();
                    self.advance();
                    while let Some(c) = self.advance() {
                        if c == '*' && self.peek() == Some('/') {
                            self.advance();
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let start = self.pos;
        let Some(c) = self.advance() else {
            return Token::new(TokenKind::Eof, Span::new(start, start));
        };

        let kind = match c {
            c if c.is_alphabetic() || c == '_' || c == '$' => self.scan_identifier(start),
            '0'..='9' => self.scan_number(start),
            '.' if matches!(self.peek(), Some('0'..='9')) => self.scan_number(start),
            '"' | '\'' => self.scan_string(c),
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '=' => TokenKind::Eq,
            _ => TokenKind::Error(format!("Unexpected character: {}", c).into()),
        };

        Token::new(kind, Span::new(start, self.pos))
    }

    fn scan_identifier(&mut self, start: u32) -> TokenKind {
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.advance();
        }

        let text = &self.source[start as usize..self.pos as usize];
        keyword_from_str(text).unwrap_or_else(|| TokenKind::Identifier(text.into()))
    }

    fn scan_number(&mut self, start: u32) -> TokenKind {
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        if self.peek() == Some('.') && matches!(self.peek_next(), Some('0'..='9')) {
            self.advance();
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }

        let text = &self.source[start as usize..self.pos as usize];
        match text.parse::<f64>() {
            Ok(n) => TokenKind::Number(n),
            Err(_) => TokenKind::Error(format!("Invalid number: {}", text).into()),
        }
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        let mut value = String::new();

        loop {
            match self.advance() {
                None | Some('\n') => return TokenKind::Error("Unterminated string".into()),
                Some(c) if c == quote => break,
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('0') => value.push('\0'),
                    Some('u') => match self.scan_unicode_escape() {
                        Some(c) => value.push(c),
                        None => return TokenKind::Error("Invalid unicode escape".into()),
                    },
                    Some(other) => value.push(other),
                    None => return TokenKind::Error("Unterminated string".into()),
                },
                Some(c) => value.push(c),
            }
        }

        TokenKind::String(value.into())
    }

    /// `\uXXXX` after the `u`
    fn scan_unicode_escape(&mut self) -> Option<char> {
        let mut code = 0u32;
        for _ in 0..4 {
            code = code * 16 + self.advance()?.to_digit(16)?;
        }
        char::from_u32(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                return out;
            }
            out.push(token.kind);
        }
    }

    #[test]
    fn test_call_tokens() {
        assert_eq!(
            kinds("save(1, 'a')"),
            vec![
                TokenKind::Identifier("save".into()),
                TokenKind::LParen,
                TokenKind::Number(1.0),
                TokenKind::Comma,
                TokenKind::String("a".into()),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_keywords_and_comments() {
        assert_eq!(
            kinds("/* x */ return false; // done"),
            vec![TokenKind::Return, TokenKind::Boolean(false), TokenKind::Semicolon]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\u0041""#),
            vec![TokenKind::String("a\"bA".into())]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1.5 .25 2e3"),
            vec![TokenKind::Number(1.5), TokenKind::Number(0.25), TokenKind::Number(2000.0)]
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(kinds("'abc")[0], TokenKind::Error(_)));
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let mut lexer = Lexer::new("  ok");
        assert_eq!(lexer.next_token().span, Span::new(2, 4));
    }
}
