//! Handler Parser
//!
//! Recursive-descent parser from tokens into a `Program`.

use super::ast::{Ast, AstNodeKind, ExprId, LiteralValue, Program};
use super::lexer::Lexer;
use super::token::{Token, TokenKind};
use crate::HandlerError;

/// Deepest expression nesting a handler may use
pub const MAX_NESTING: u32 = 128;

pub struct Parser<'src> {
    source: &'src str,
    lexer: Lexer<'src>,
    current: Token,
    ast: Ast,
    /// Nesting of the expression being parsed; bounds AST height
    depth: u32,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            source,
            lexer,
            current,
            ast: Ast::new(),
            depth: 0,
        }
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn consume(&mut self, kind: TokenKind) -> Result<(), HandlerError> {
        if self.check(&kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("Expected {:?}, got {:?}", kind, self.current.kind)))
        }
    }

    fn error(&self, message: String) -> HandlerError {
        let message = match &self.current.kind {
            TokenKind::Error(lex) => lex.to_string(),
            _ => message,
        };
        HandlerError::Syntax {
            message,
            offset: self.current.span.start,
        }
    }

    /// One level deeper; fails once the handler nests too far
    fn enter(&mut self) -> Result<(), HandlerError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(HandlerError::Syntax {
                message: "handler nested too deeply".into(),
                offset: self.current.span.start,
            });
        }
        Ok(())
    }

    /// Parse a complete handler body
    pub fn parse(mut self) -> Result<Program, HandlerError> {
        let mut body = Vec::new();

        loop {
            while self.check(&TokenKind::Semicolon) {
                self.advance();
            }
            if self.check(&TokenKind::Eof) {
                break;
            }

            body.push(self.parse_statement()?);

            if !self.check(&TokenKind::Semicolon) && !self.check(&TokenKind::Eof) {
                return Err(self.error(format!(
                    "Expected ';' or end of handler, got {:?}",
                    self.current.kind
                )));
            }
        }

        Ok(Program::new(self.ast, body, self.source))
    }

    fn parse_statement(&mut self) -> Result<ExprId, HandlerError> {
        if self.check(&TokenKind::Return) {
            self.advance();
            let argument = if self.check(&TokenKind::Semicolon) || self.check(&TokenKind::Eof) {
                None
            } else {
                Some(self.parse_expression()?)
            };
            return Ok(self.ast.add(AstNodeKind::ReturnStatement { argument }));
        }

        let expr = self.parse_expression()?;
        Ok(self.ast.add(AstNodeKind::ExpressionStatement { expr }))
    }

    fn parse_expression(&mut self) -> Result<ExprId, HandlerError> {
        self.enter()?;
        let expr = self.parse_assignment()?;
        self.depth -= 1;
        Ok(expr)
    }

    fn parse_assignment(&mut self) -> Result<ExprId, HandlerError> {
        let target = self.parse_postfix()?;

        if !self.check(&TokenKind::Eq) {
            return Ok(target);
        }

        let is_member = matches!(self.ast.get(target), Some(AstNodeKind::Member { .. }));
        if !is_member {
            return Err(self.error("Invalid assignment target".into()));
        }

        self.advance(); // =
        let value = self.parse_expression()?;
        Ok(self.ast.add(AstNodeKind::Assign { target, value }))
    }

    fn parse_postfix(&mut self) -> Result<ExprId, HandlerError> {
        let mut expr = self.parse_primary()?;

        // Each member or call wraps the expression once more
        let outer = self.depth;
        loop {
            if self.check(&TokenKind::Dot) || self.check(&TokenKind::LParen) {
                self.enter()?;
            }
            if self.check(&TokenKind::Dot) {
                self.advance();
                let property = match &self.current.kind {
                    TokenKind::Identifier(name) => name.clone(),
                    // Reserved words are fine as property names
                    TokenKind::Return => "return".into(),
                    TokenKind::This => "this".into(),
                    _ => return Err(self.error("Expected property name after '.'".into())),
                };
                self.advance();
                expr = self.ast.add(AstNodeKind::Member { object: expr, property });
            } else if self.check(&TokenKind::LParen) {
                self.advance();
                let arguments = self.parse_arguments()?;
                expr = self.ast.add(AstNodeKind::Call { callee: expr, arguments });
            } else {
                self.depth = outer;
                return Ok(expr);
            }
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<ExprId>, HandlerError> {
        let mut arguments = Vec::new();

        if self.check(&TokenKind::RParen) {
            self.advance();
            return Ok(arguments);
        }

        loop {
            arguments.push(self.parse_expression()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
                // Trailing comma
                if self.check(&TokenKind::RParen) {
                    break;
                }
            } else {
                break;
            }
        }
        self.consume(TokenKind::RParen)?;

        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<ExprId, HandlerError> {
        let kind = match &self.current.kind {
            TokenKind::Identifier(name) => AstNodeKind::Identifier { name: name.clone() },
            TokenKind::This => AstNodeKind::This,
            TokenKind::Number(n) => literal(LiteralValue::Number(*n)),
            TokenKind::String(s) => literal(LiteralValue::String(s.clone())),
            TokenKind::Boolean(b) => literal(LiteralValue::Boolean(*b)),
            TokenKind::Null => literal(LiteralValue::Null),
            TokenKind::Undefined => literal(LiteralValue::Undefined),
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(TokenKind::RParen)?;
                return Ok(expr);
            }
            other => return Err(self.error(format!("Unexpected token {:?}", other))),
        };

        self.advance();
        Ok(self.ast.add(kind))
    }
}

fn literal(value: LiteralValue) -> AstNodeKind {
    AstNodeKind::Literal { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Program, HandlerError> {
        Parser::new(source).parse()
    }

    fn identifiers(program: &Program) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for id in 0..u32::MAX {
            let Some(node) = program.ast.get(ExprId(id)) else {
                break;
            };
            if let AstNodeKind::Identifier { name } = node {
                if !names.contains(&&**name) {
                    names.push(name);
                }
            }
        }
        names
    }

    #[test]
    fn test_single_call() {
        let program = parse("save()").unwrap();
        assert_eq!(program.statement_count(), 1);
        assert_eq!(identifiers(&program), vec!["save"]);
    }

    #[test]
    fn test_statements_and_return() {
        let program = parse("log('a'); event.preventDefault(); return false;").unwrap();
        assert_eq!(program.statement_count(), 3);
        assert_eq!(identifiers(&program), vec!["log", "event"]);
    }

    #[test]
    fn test_member_assignment() {
        let program = parse("this.value = pick(1, 'two',)").unwrap();
        assert_eq!(program.statement_count(), 1);
        assert_eq!(identifiers(&program), vec!["pick"]);
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(parse("").unwrap().statement_count(), 0);
        assert_eq!(parse(" ;; ").unwrap().statement_count(), 0);
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = parse("save = 1").unwrap_err();
        assert!(matches!(err, HandlerError::Syntax { .. }));
    }

    #[test]
    fn test_missing_paren_reports_offset() {
        match parse("save(1").unwrap_err() {
            HandlerError::Syntax { offset, .. } => assert_eq!(offset, 6),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_operator() {
        assert!(parse("a + b").is_err());
        assert!(parse("a b").is_err());
    }

    #[test]
    fn test_nesting_limit_on_parentheses() {
        let inside = format!("{}save(){}", "(".repeat(100), ")".repeat(100));
        assert!(parse(&inside).is_ok());

        let deep = format!("{}save(){}", "(".repeat(1000), ")".repeat(1000));
        match parse(&deep).unwrap_err() {
            HandlerError::Syntax { message, offset } => {
                assert_eq!(message, "handler nested too deeply");
                assert_eq!(offset, MAX_NESTING);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_nesting_limit_counts_member_chains() {
        let chain = format!("a{}", ".b".repeat(MAX_NESTING as usize + 1));
        assert!(matches!(parse(&chain), Err(HandlerError::Syntax { .. })));

        // Depth is released once a chain ends
        let siblings = vec!["a.b.c.d"; 200].join("; ");
        assert_eq!(parse(&siblings).unwrap().statement_count(), 200);
    }

    #[test]
    fn test_nesting_limit_counts_calls_and_assignments() {
        let calls = format!("{}x{}", "f(".repeat(500), ")".repeat(500));
        assert!(matches!(parse(&calls), Err(HandlerError::Syntax { .. })));

        let assignments = format!("{}1", "a.b = ".repeat(500));
        assert!(matches!(parse(&assignments), Err(HandlerError::Syntax { .. })));

        let short = format!("{}1", "a.b = ".repeat(20));
        assert!(parse(&short).is_ok());
    }
}
