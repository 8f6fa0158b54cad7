//! Statements
//!
//! - Variable declarations: `int x = 42, *p;`
//! - Control flow: `if`, `while`, `for`
//! - Jump statements: `return`
//! - Compound statements: `{ ... }`
//! - Expression statements and the empty statement `;`
//!
//! # Grammar
//!
//! ```text
//! statement ::= declaration | if_stmt | while_stmt | for_stmt
//!             | return_stmt | block | expr_stmt | ";"
//! for_stmt  ::= "for" "(" ( declaration | expr? ";" ) expr? ";" expr? ")" statement
//! ```

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves)
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        match self.peek() {
            Token::Return(_) => {
                self.advance();
                self.parse_return_statement()
            }
            Token::If(_) => {
                self.advance();
                self.parse_if_statement()
            }
            Token::While(_) => {
                self.advance();
                self.parse_while_statement()
            }
            Token::For(_) => {
                self.advance();
                self.parse_for_statement()
            }
            Token::LBrace(_) => {
                self.advance();
                let statements = self.parse_block_statements()?;
                self.expect_rbrace("after block")?;
                Ok(AstNode::Block {
                    statements,
                    location: loc,
                })
            }
            // `;` alone is an empty block
            Token::Semicolon(_) => {
                self.advance();
                Ok(AstNode::Block {
                    statements: Vec::new(),
                    location: loc,
                })
            }
            _ if self.is_type_keyword() => self.parse_declaration(),
            _ => {
                let expr = Box::new(self.parse_expression()?);
                self.expect_semicolon("after expression")?;
                Ok(AstNode::ExpressionStatement {
                    expr,
                    location: loc,
                })
            }
        }
    }

    /// Parse the body of a control statement.
    ///
    /// A braced body becomes its statement list; any other statement becomes a
    /// one-element list. Either way the resolver opens one scope for it.
    pub(crate) fn parse_statement_or_block(&mut self) -> Result<Vec<AstNode>, ParseError> {
        match self.parse_statement()? {
            AstNode::Block { statements, .. } => Ok(statements),
            stmt => Ok(vec![stmt]),
        }
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        let expr = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect_semicolon("after return")?;

        Ok(AstNode::Return {
            expr,
            location: loc,
        })
    }

    /// Parse if statement
    fn parse_if_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'if'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_rparen("after if condition")?;

        let then_branch = self.parse_statement_or_block()?;

        let else_branch = if self.match_token(&Token::Else(self.current_location())) {
            Some(self.parse_statement_or_block()?)
        } else {
            None
        };

        Ok(AstNode::If {
            condition,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'while'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_rparen("after while condition")?;

        let body = self.parse_statement_or_block()?;

        Ok(AstNode::While {
            condition,
            body,
            location: loc,
        })
    }

    /// Parse for statement
    fn parse_for_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'for'")?;

        let init = if self.match_token(&Token::Semicolon(self.current_location())) {
            None
        } else if self.is_type_keyword() {
            // Declaration consumes its own ';'
            Some(Box::new(self.parse_declaration()?))
        } else {
            let init_loc = self.current_location();
            let expr = self.parse_expression()?;
            self.expect_semicolon("after for loop initializer")?;
            Some(Box::new(AstNode::ExpressionStatement {
                expr: Box::new(expr),
                location: init_loc,
            }))
        };

        let condition = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_semicolon("after for loop condition")?;

        let increment = if self.check(&Token::RParen(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_rparen("after for loop clauses")?;

        let body = self.parse_statement_or_block()?;

        Ok(AstNode::For {
            init,
            condition,
            increment,
            body,
            location: loc,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn body_of(source: &str) -> Vec<AstNode> {
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();
        match program.nodes.into_iter().next() {
            Some(AstNode::FunctionDef { body, .. }) => body,
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else_bodies() {
        let body = body_of("int f() { int x; if (0) x = 2; else { x = 3; x = 4; } return x; }");
        match &body[1] {
            AstNode::If {
                then_branch,
                else_branch: Some(else_branch),
                ..
            } => {
                assert_eq!(then_branch.len(), 1);
                assert_eq!(else_branch.len(), 2);
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_for_with_declaration_and_empty_clauses() {
        let body = body_of("int f() { for (int i = 0; i < 3; i++) ; for (;;) return 1; }");
        assert!(matches!(
            &body[0],
            AstNode::For { init: Some(init), condition: Some(_), increment: Some(_), .. }
                if matches!(init.as_ref(), AstNode::Declaration { .. })
        ));
        assert!(matches!(
            &body[1],
            AstNode::For { init: None, condition: None, increment: None, .. }
        ));
    }

    #[test]
    fn test_nested_block_is_kept() {
        let body = body_of("int f() { int x = 2; { int x2 = 3; } return x; }");
        assert!(matches!(&body[1], AstNode::Block { statements, .. } if statements.len() == 1));
    }

    #[test]
    fn test_return_without_value() {
        let body = body_of("void f() { return; }");
        assert!(matches!(&body[0], AstNode::Return { expr: None, .. }));
    }
}
