//! [`Parser`] state, token cursor helpers and the program entry point
//!
//! The grammar itself lives in sibling files that each add an `impl Parser`
//! block: `declarations` (types, declarators, structs, functions),
//! `statements` and `expressions`.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use std::fmt;

/// Parser error type
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Recursive descent parser for C subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
}

impl Parser {
    /// Tokenize `source` and build a parser over the tokens
    pub fn new(source: &str) -> Result<Self, LexError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self::from_tokens(tokens))
    }

    /// Build a parser over an already-lexed token sequence.
    ///
    /// An `Eof` token is appended if the sequence does not end with one.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token::Eof(_))) {
            let loc = tokens.last().map(Token::location).unwrap_or_default();
            tokens.push(Token::Eof(loc));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse the entire program (top-level declarations)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            let decl = self.parse_top_level_declaration()?;
            program.nodes.push(decl);
        }

        Ok(program)
    }

    // Token cursor

    pub(crate) fn is_type_keyword(&self) -> bool {
        matches!(
            self.peek(),
            Token::Int(_) | Token::Char(_) | Token::Void(_) | Token::Struct(_)
        )
    }

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.peek().clone()
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn error<T>(&self, message: impl Into<String>) -> Result<T, ParseError> {
        Err(ParseError {
            message: message.into(),
            location: self.current_location(),
        })
    }

    /// Consume the punctuator built by `punct`, or fail naming what was found
    pub(crate) fn expect(
        &mut self,
        punct: fn(SourceLocation) -> Token,
        ctx: &str,
    ) -> Result<(), ParseError> {
        let expected = punct(self.current_location());
        if self.match_token(&expected) {
            return Ok(());
        }
        self.error(format!("Expected {} {}, found {}", expected, ctx, self.peek()))
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect(Token::LParen, ctx)
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect(Token::RParen, ctx)
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect(Token::LBrace, ctx)
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect(Token::RBrace, ctx)
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect(Token::Semicolon, ctx)
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            self.error(format!("Expected identifier, found {}", self.peek()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_program().unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_program().unwrap_err()
    }

    #[test]
    fn test_parse_simple_function() {
        let program = parse("int main() { return 0; }");

        assert_eq!(program.nodes.len(), 1);
        match &program.nodes[0] {
            AstNode::FunctionDef {
                name,
                params,
                return_type,
                body,
                ..
            } => {
                assert_eq!(name, "main");
                assert_eq!(params.len(), 0);
                assert_eq!(return_type.base, BaseType::Int);
                assert_eq!(body.len(), 1);
            }
            _ => panic!("Expected function definition"),
        }
    }

    #[test]
    fn test_parse_precedence() {
        let program = parse("int main() { return 1 + 2 * 3; }");

        let AstNode::FunctionDef { body, .. } = &program.nodes[0] else {
            panic!("Expected function definition");
        };
        let AstNode::Return { expr: Some(expr), .. } = &body[0] else {
            panic!("Expected return");
        };
        match expr.as_ref() {
            AstNode::BinaryOp {
                op: BinOp::Add,
                right,
                ..
            } => {
                assert!(matches!(
                    right.as_ref(),
                    AstNode::BinaryOp { op: BinOp::Mul, .. }
                ));
            }
            other => panic!("Expected addition at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_struct_definition() {
        let program = parse("struct Point { int x; int y; };");

        assert_eq!(program.nodes.len(), 1);
        match &program.nodes[0] {
            AstNode::Declaration {
                base: BaseType::Struct(spec),
                declarators,
                ..
            } => {
                assert_eq!(spec.tag.as_deref(), Some("Point"));
                assert_eq!(spec.fields.as_ref().map(Vec::len), Some(2));
                assert!(declarators.is_empty());
            }
            _ => panic!("Expected struct definition"),
        }
    }

    #[test]
    fn test_parse_globals_with_several_declarators() {
        let program = parse("int g1, g2[4];");

        match &program.nodes[0] {
            AstNode::Declaration { declarators, .. } => {
                assert_eq!(declarators.len(), 2);
                assert_eq!(declarators[0].name, "g1");
                assert!(declarators[0].derived.is_empty());
                assert_eq!(declarators[1].derived, vec![Derived::Array(4)]);
            }
            _ => panic!("Expected declaration"),
        }
    }

    #[test]
    fn test_missing_semicolon_reports_location() {
        let err = parse_err("int main() {\n  return 0\n}");
        assert!(err.message.contains("Expected ';'"));
        assert_eq!(err.location.line, 3);
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let err = parse_err("int main() { return (1 + 2; }");
        assert!(err.message.contains("Expected ')'"));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = parse_err("float x;");
        assert!(err.message.contains("Expected"));
    }
}
