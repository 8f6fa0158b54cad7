//! Expression grammar
//!
//! Binary operators go through a single level-indexed loop; everything else
//! is plain recursive descent.
//!
//! # Forms
//!
//! - Integer, character and string literals, identifiers
//! - Binary operators: arithmetic, comparison, logical
//! - Unary operators: `+`, `-`, `!`, `&`, `*`, `++`, `--`
//! - Postfix: `[]`, `.`, `->`, `()`, `++`, `--`
//! - Comma operator
//! - `sizeof` operator on a type name or an expression
//!
//! # Precedence
//!
//! From lowest to highest: comma, assignment (right-associative), `||`,
//! `&&`, equality, relational, additive, multiplicative, unary, postfix,
//! primary.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

/// Number of left-associative binary precedence levels
const BINARY_LEVELS: usize = 6;

/// Operator for `token` at a precedence level, loosest (`||`) first
fn binary_op(level: usize, token: &Token) -> Option<BinOp> {
    let op = match (level, token) {
        (0, Token::OrOr(_)) => BinOp::Or,
        (1, Token::AndAnd(_)) => BinOp::And,
        (2, Token::EqEq(_)) => BinOp::Eq,
        (2, Token::NotEq(_)) => BinOp::Ne,
        (3, Token::Lt(_)) => BinOp::Lt,
        (3, Token::Le(_)) => BinOp::Le,
        (3, Token::Gt(_)) => BinOp::Gt,
        (3, Token::Ge(_)) => BinOp::Ge,
        (4, Token::Plus(_)) => BinOp::Add,
        (4, Token::Minus(_)) => BinOp::Sub,
        (5, Token::Star(_)) => BinOp::Mul,
        (5, Token::Slash(_)) => BinOp::Div,
        (5, Token::Percent(_)) => BinOp::Mod,
        _ => return None,
    };
    Some(op)
}

impl Parser {
    /// Parse expression (top-level entry point, includes the comma operator)
    pub(crate) fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_assignment()?;

        while self.match_token(&Token::Comma(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_assignment()?);
            left = AstNode::Comma {
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse assignment (right-associative)
    pub(crate) fn parse_assignment(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_binary(0)?;

        let loc = self.current_location();
        if self.match_token(&Token::Eq(loc)) {
            let rhs = Box::new(self.parse_assignment()?);
            return Ok(AstNode::Assignment {
                lhs: Box::new(expr),
                rhs,
                location: loc,
            });
        }

        let compound_op = match self.peek() {
            Token::PlusEq(_) => Some(BinOp::AddAssign),
            Token::MinusEq(_) => Some(BinOp::SubAssign),
            Token::StarEq(_) => Some(BinOp::MulAssign),
            Token::SlashEq(_) => Some(BinOp::DivAssign),
            Token::PercentEq(_) => Some(BinOp::ModAssign),
            _ => None,
        };

        if let Some(op) = compound_op {
            self.advance();
            let rhs = Box::new(self.parse_assignment()?);
            return Ok(AstNode::CompoundAssignment {
                lhs: Box::new(expr),
                op,
                rhs,
                location: loc,
            });
        }

        Ok(expr)
    }

    /// Binary operators from `||` down to `* / %`, one loop per level
    fn parse_binary(&mut self, level: usize) -> Result<AstNode, ParseError> {
        if level == BINARY_LEVELS {
            return self.parse_unary();
        }

        let mut left = self.parse_binary(level + 1)?;
        while let Some(op) = binary_op(level, self.peek()) {
            let location = self.current_location();
            self.advance();
            let right = Box::new(self.parse_binary(level + 1)?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location,
            };
        }

        Ok(left)
    }

    /// Parse unary (! - + & * ++ -- sizeof)
    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        let prefix = if self.match_token(&Token::Bang(loc)) {
            Some(UnOp::Not)
        } else if self.match_token(&Token::Plus(loc)) {
            Some(UnOp::Plus)
        } else if self.match_token(&Token::Minus(loc)) {
            Some(UnOp::Neg)
        } else if self.match_token(&Token::Amp(loc)) {
            Some(UnOp::AddrOf)
        } else if self.match_token(&Token::Star(loc)) {
            Some(UnOp::Deref)
        } else if self.match_token(&Token::PlusPlus(loc)) {
            Some(UnOp::PreInc)
        } else if self.match_token(&Token::MinusMinus(loc)) {
            Some(UnOp::PreDec)
        } else {
            None
        };

        if let Some(op) = prefix {
            let operand = Box::new(self.parse_unary()?);
            return Ok(AstNode::UnaryOp {
                op,
                operand,
                location: loc,
            });
        }

        if self.match_token(&Token::Sizeof(loc)) {
            return self.parse_sizeof(loc);
        }

        self.parse_postfix()
    }

    /// Parse the operand of `sizeof`: `(type-name)` or a unary expression
    fn parse_sizeof(&mut self, loc: SourceLocation) -> Result<AstNode, ParseError> {
        let is_type_name = self.check(&Token::LParen(self.current_location()))
            && matches!(
                self.peek_ahead(1),
                Some(Token::Int(_) | Token::Char(_) | Token::Void(_) | Token::Struct(_))
            );

        if is_type_name {
            self.advance(); // consume '('
            let target_type = self.parse_type_name()?;
            self.expect_rparen("after sizeof type")?;
            return Ok(AstNode::SizeofType {
                target_type,
                location: loc,
            });
        }

        let expr = Box::new(self.parse_unary()?);
        Ok(AstNode::SizeofExpr {
            expr,
            location: loc,
        })
    }

    /// Parse postfix (++ -- [] . -> ())
    fn parse_postfix(&mut self) -> Result<AstNode, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let loc = self.current_location();

            if self.match_token(&Token::PlusPlus(loc)) {
                expr = AstNode::UnaryOp {
                    op: UnOp::PostInc,
                    operand: Box::new(expr),
                    location: loc,
                };
            } else if self.match_token(&Token::MinusMinus(loc)) {
                expr = AstNode::UnaryOp {
                    op: UnOp::PostDec,
                    operand: Box::new(expr),
                    location: loc,
                };
            } else if self.match_token(&Token::LBracket(loc)) {
                let index = Box::new(self.parse_expression()?);
                self.expect(Token::RBracket, "after array index")?;
                expr = AstNode::ArrayAccess {
                    array: Box::new(expr),
                    index,
                    location: loc,
                };
            } else if self.match_token(&Token::Dot(loc)) {
                let member = self.expect_identifier()?;
                expr = AstNode::MemberAccess {
                    object: Box::new(expr),
                    member,
                    location: loc,
                };
            } else if self.match_token(&Token::Arrow(loc)) {
                let member = self.expect_identifier()?;
                expr = AstNode::PointerMemberAccess {
                    object: Box::new(expr),
                    member,
                    location: loc,
                };
            } else if self.check(&Token::LParen(loc)) {
                // Function call; only a plain identifier can be called
                let name = match &expr {
                    AstNode::Variable(n, _) => n.clone(),
                    _ => {
                        return Err(ParseError {
                            message: "Function call must be on identifier".to_string(),
                            location: loc,
                        });
                    }
                };
                let call_loc = *expr.location();
                self.advance(); // consume '('
                let args = self.parse_argument_list()?;
                self.expect_rparen("after function arguments")?;

                expr = AstNode::FunctionCall {
                    name,
                    args,
                    location: call_loc,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse argument list: (expr, expr, ...)
    fn parse_argument_list(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut args = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_assignment()?);

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(args)
    }

    /// Parse primary (literals, variables, parenthesized expressions)
    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        match self.peek_token() {
            Token::IntLiteral(n, loc) => {
                self.advance();
                Ok(AstNode::IntLiteral(n, loc))
            }
            Token::CharLiteral(c, loc) => {
                self.advance();
                Ok(AstNode::CharLiteral(c, loc))
            }
            Token::StringLiteral(s, loc) => {
                self.advance();
                Ok(AstNode::StringLiteral(s, loc))
            }
            Token::Ident(name, loc) => {
                self.advance();
                Ok(AstNode::Variable(name, loc))
            }
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                Ok(expr)
            }
            _ => Err(ParseError {
                message: format!("Unexpected token: {}", self.peek()),
                location: loc,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    /// Parse `source` as the body of `return <expr>;` and return the expression
    fn expr(source: &str) -> AstNode {
        let mut parser = Parser::new(&format!("int f() {{ return {}; }}", source)).unwrap();
        let program = parser.parse_program().unwrap();
        let Some(AstNode::FunctionDef { mut body, .. }) = program.nodes.into_iter().next() else {
            panic!("Expected function definition");
        };
        match body.remove(0) {
            AstNode::Return { expr: Some(e), .. } => *e,
            other => panic!("Expected return statement, got {:?}", other),
        }
    }

    #[test]
    fn test_comma_is_lowest() {
        match expr("1, 2, 3") {
            AstNode::Comma { left, right, .. } => {
                assert!(matches!(*right, AstNode::IntLiteral(3, _)));
                assert!(matches!(*left, AstNode::Comma { .. }));
            }
            other => panic!("Expected comma, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_is_right_associative() {
        match expr("a = b = 3") {
            AstNode::Assignment { lhs, rhs, .. } => {
                assert!(matches!(*lhs, AstNode::Variable(ref n, _) if n == "a"));
                assert!(matches!(*rhs, AstNode::Assignment { .. }));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_postfix_binds_tighter_than_deref() {
        // (*p++)-- : the outer decrement applies to *(p++)
        match expr("(*p++)--") {
            AstNode::UnaryOp {
                op: UnOp::PostDec,
                operand,
                ..
            } => match *operand {
                AstNode::UnaryOp {
                    op: UnOp::Deref,
                    operand: inner,
                    ..
                } => assert!(matches!(*inner, AstNode::UnaryOp { op: UnOp::PostInc, .. })),
                other => panic!("Expected deref, got {:?}", other),
            },
            other => panic!("Expected post-decrement, got {:?}", other),
        }
    }

    #[test]
    fn test_sizeof_forms() {
        assert!(matches!(expr("sizeof(int)"), AstNode::SizeofType { .. }));
        assert!(matches!(expr("sizeof x"), AstNode::SizeofExpr { .. }));
        assert!(matches!(expr("sizeof(x = 2)"), AstNode::SizeofExpr { .. }));

        // sizeof binds to the unary operand, not the whole sum
        assert!(matches!(
            expr("sizeof **x + 1"),
            AstNode::BinaryOp { op: BinOp::Add, ref left, .. }
                if matches!(**left, AstNode::SizeofExpr { .. })
        ));

        match expr("sizeof(int (*)[3])") {
            AstNode::SizeofType { target_type, .. } => {
                assert_eq!(target_type.derived, vec![Derived::Array(3), Derived::Pointer]);
            }
            other => panic!("Expected sizeof type, got {:?}", other),
        }
    }

    #[test]
    fn test_commutative_subscript_parses() {
        assert!(matches!(expr("2[x]"), AstNode::ArrayAccess { .. }));
    }

    #[test]
    fn test_unary_plus_and_negation() {
        match expr("- -+10") {
            AstNode::UnaryOp {
                op: UnOp::Neg,
                operand,
                ..
            } => assert!(matches!(
                *operand,
                AstNode::UnaryOp { op: UnOp::Neg, ref operand, .. }
                    if matches!(
                        **operand,
                        AstNode::UnaryOp { op: UnOp::Plus, .. }
                    )
            )),
            other => panic!("Expected negation, got {:?}", other),
        }
    }

    #[test]
    fn test_call_arguments_are_assignments() {
        match expr("f(1, 2 + 3)") {
            AstNode::FunctionCall { name, args, .. } => {
                assert_eq!(name, "f");
                assert_eq!(args.len(), 2);
            }
            other => panic!("Expected call, got {:?}", other),
        }
    }
}
