//! Declaration parsing implementation
//!
//! This module handles parsing of declarations in C programs:
//!
//! - Struct specifiers: `struct Name`, `struct Name { ... }`, `struct { ... }`
//! - Function definitions and prototypes: `type name(params) { ... }`
//! - Variable declarations with several declarators: `int x = 1, *p, a[2][3];`
//! - Declarators: pointers, array suffixes and parenthesized forms
//! - Type names for `sizeof(type)`: `int *`, `int[3]`, `int (*)[3]`
//!
//! # Grammar
//!
//! ```text
//! top_level    ::= base_type ";"
//!                | base_type declarator "(" params ")" ( ";" | "{" statements "}" )
//!                | declaration
//! declaration  ::= base_type ( init_decl ( "," init_decl )* )? ";"
//! init_decl    ::= declarator ( "=" assignment )?
//! base_type    ::= "int" | "char" | "void" | struct_spec
//! struct_spec  ::= "struct" identifier? ( "{" ( base_type declarator_list ";" )* "}" )?
//! declarator   ::= "*"* ( "(" declarator ")" | identifier? ) ( "[" int "]" )*
//! type_name    ::= base_type declarator        (without identifier)
//! ```
//!
//! Declarator layers are collected innermost first into a `Vec<Derived>`, so
//! `int x[2][3]` yields `[Array(3), Array(2)]` and the outermost layer is last.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

/// Result of parsing one declarator: optional name, layers and name location
type ParsedDeclarator = (Option<String>, Vec<Derived>, SourceLocation);

impl Parser {
    /// Parse a top-level declaration (function, prototype, struct or globals)
    pub(crate) fn parse_top_level_declaration(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();
        let base = self.parse_base_type()?;

        // struct Tag { ... };
        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(AstNode::Declaration {
                base,
                declarators: Vec::new(),
                location: loc,
            });
        }

        let (name, derived, name_loc) = self.parse_named_declarator()?;

        if self.match_token(&Token::LParen(self.current_location())) {
            return self.parse_function_rest(name, Type { base, derived }, name_loc);
        }

        let first = self.parse_initializer(name, derived, name_loc)?;
        self.parse_declarator_list(base, Some(first), loc)
    }

    /// Parse a block-level declaration statement
    pub(crate) fn parse_declaration(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();
        let base = self.parse_base_type()?;

        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(AstNode::Declaration {
                base,
                declarators: Vec::new(),
                location: loc,
            });
        }

        self.parse_declarator_list(base, None, loc)
    }

    /// Parse the remaining `, declarator = init` list and the closing `;`
    fn parse_declarator_list(
        &mut self,
        base: BaseType,
        first: Option<Declarator>,
        loc: SourceLocation,
    ) -> Result<AstNode, ParseError> {
        let mut declarators = Vec::new();

        match first {
            Some(decl) => declarators.push(decl),
            None => {
                let (name, derived, name_loc) = self.parse_named_declarator()?;
                declarators.push(self.parse_initializer(name, derived, name_loc)?);
            }
        }

        while self.match_token(&Token::Comma(self.current_location())) {
            let (name, derived, name_loc) = self.parse_named_declarator()?;
            declarators.push(self.parse_initializer(name, derived, name_loc)?);
        }

        self.expect_semicolon("after declaration")?;

        Ok(AstNode::Declaration {
            base,
            declarators,
            location: loc,
        })
    }

    fn parse_initializer(
        &mut self,
        name: String,
        derived: Vec<Derived>,
        location: SourceLocation,
    ) -> Result<Declarator, ParseError> {
        let init = if self.match_token(&Token::Eq(self.current_location())) {
            Some(Box::new(self.parse_assignment()?))
        } else {
            None
        };

        Ok(Declarator {
            name,
            derived,
            init,
            location,
        })
    }

    /// Parse `params ) ;` or `params ) { body }` after a function name and `(`
    fn parse_function_rest(
        &mut self,
        name: String,
        return_type: Type,
        loc: SourceLocation,
    ) -> Result<AstNode, ParseError> {
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;

        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(AstNode::FunctionDecl {
                name,
                params,
                return_type,
                location: loc,
            });
        }

        self.expect_lbrace("before function body")?;
        let body = self.parse_block_statements()?;
        self.expect_rbrace("after function body")?;

        Ok(AstNode::FunctionDef {
            name,
            params,
            body,
            return_type,
            location: loc,
        })
    }

    /// Parse parameter list: (type name, type name, ...)
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(params);
        }

        // Special case: (void) means no parameters in C
        if self.check(&Token::Void(self.current_location()))
            && matches!(self.peek_ahead(1), Some(Token::RParen(_)))
        {
            self.advance(); // consume 'void'
            return Ok(params);
        }

        loop {
            let base = self.parse_base_type()?;
            let (name, derived, location) = self.parse_named_declarator()?;
            params.push(Param {
                name,
                param_type: Type { base, derived },
                location,
            });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse base type: int | char | void | struct specifier
    pub(crate) fn parse_base_type(&mut self) -> Result<BaseType, ParseError> {
        let loc = self.current_location();

        if self.match_token(&Token::Int(loc)) {
            Ok(BaseType::Int)
        } else if self.match_token(&Token::Char(loc)) {
            Ok(BaseType::Char)
        } else if self.match_token(&Token::Void(loc)) {
            Ok(BaseType::Void)
        } else if self.match_token(&Token::Struct(loc)) {
            self.parse_struct_spec(loc).map(BaseType::Struct)
        } else {
            self.error(format!("Expected type, found {}", self.peek()))
        }
    }

    /// Parse the rest of a struct specifier after `struct`
    fn parse_struct_spec(&mut self, location: SourceLocation) -> Result<StructSpec, ParseError> {
        let tag = match self.peek_token() {
            Token::Ident(name, _) => {
                self.advance();
                Some(name)
            }
            _ => None,
        };

        if !self.match_token(&Token::LBrace(self.current_location())) {
            if tag.is_none() {
                return self.error(format!(
                    "Expected struct name or '{{', found {}",
                    self.peek()
                ));
            }
            return Ok(StructSpec {
                tag,
                fields: None,
                location,
            });
        }

        let mut fields = Vec::new();
        while !self.check(&Token::RBrace(self.current_location())) {
            if self.is_at_end() {
                return self.error("Expected '}' after struct fields, found end of file");
            }

            let base = self.parse_base_type()?;
            loop {
                let (name, derived, _) = self.parse_named_declarator()?;
                fields.push(Field {
                    name,
                    field_type: Type {
                        base: base.clone(),
                        derived,
                    },
                });
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
            }
            self.expect_semicolon("after struct field")?;
        }

        self.expect_rbrace("after struct fields")?;

        Ok(StructSpec {
            tag,
            fields: Some(fields),
            location,
        })
    }

    /// Parse a type name as used by `sizeof(type)`
    pub(crate) fn parse_type_name(&mut self) -> Result<Type, ParseError> {
        let base = self.parse_base_type()?;
        let (name, derived, loc) = self.parse_declarator(Vec::new())?;

        if let Some(name) = name {
            return Err(ParseError {
                message: format!("Unexpected identifier '{}' in type name", name),
                location: loc,
            });
        }

        Ok(Type { base, derived })
    }

    /// Parse a declarator that must introduce a name
    pub(crate) fn parse_named_declarator(
        &mut self,
    ) -> Result<(String, Vec<Derived>, SourceLocation), ParseError> {
        let (name, derived, loc) = self.parse_declarator(Vec::new())?;
        match name {
            Some(name) => Ok((name, derived, loc)),
            None => Err(ParseError {
                message: format!("Expected identifier, found {}", self.peek()),
                location: loc,
            }),
        }
    }

    /// Parse a declarator on top of the layers already in `derived`.
    ///
    /// For `( inner ) suffix` the inner declarator is skipped first so the
    /// suffix can be applied before the inner layers, then re-parsed.
    fn parse_declarator(
        &mut self,
        mut derived: Vec<Derived>,
    ) -> Result<ParsedDeclarator, ParseError> {
        while self.match_token(&Token::Star(self.current_location())) {
            derived.push(Derived::Pointer);
        }

        let loc = self.current_location();

        if self.check(&Token::LParen(loc)) && self.is_nested_declarator() {
            self.advance(); // consume '('
            let inner_start = self.position;
            self.parse_declarator(Vec::new())?;
            self.expect_rparen("in declarator")?;
            self.parse_array_suffix(&mut derived)?;

            let end = self.position;
            self.position = inner_start;
            let result = self.parse_declarator(derived)?;
            self.position = end;
            return Ok(result);
        }

        let name = match self.peek_token() {
            Token::Ident(name, _) => {
                self.advance();
                Some(name)
            }
            _ => None,
        };

        self.parse_array_suffix(&mut derived)?;
        Ok((name, derived, loc))
    }

    /// True when the `(` at the cursor opens a nested declarator
    fn is_nested_declarator(&self) -> bool {
        matches!(
            self.peek_ahead(1),
            Some(Token::Star(_)) | Some(Token::LParen(_)) | Some(Token::Ident(_, _))
        )
    }

    /// Parse `[N][M]...` and push the layers so the leftmost is outermost
    fn parse_array_suffix(&mut self, derived: &mut Vec<Derived>) -> Result<(), ParseError> {
        let mut dims = Vec::new();

        while self.match_token(&Token::LBracket(self.current_location())) {
            match self.peek_token() {
                Token::IntLiteral(n, loc) => {
                    if n < 0 {
                        return Err(ParseError {
                            message: format!("Array size must not be negative: {}", n),
                            location: loc,
                        });
                    }
                    self.advance();
                    dims.push(n as usize);
                }
                _ => {
                    return self.error(format!(
                        "Array size must be a constant integer, found {}",
                        self.peek()
                    ));
                }
            }
            self.expect(Token::RBracket, "after array size")?;
        }

        derived.extend(dims.into_iter().rev().map(Derived::Array));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn first_declarator(source: &str) -> Declarator {
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();
        match program.nodes.into_iter().next() {
            Some(AstNode::Declaration {
                mut declarators, ..
            }) => declarators.remove(0),
            other => panic!("Expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_multi_dimensional_array() {
        let decl = first_declarator("int x[2][3];");
        assert_eq!(decl.derived, vec![Derived::Array(3), Derived::Array(2)]);
    }

    #[test]
    fn test_array_of_pointers_vs_pointer_to_array() {
        let decl = first_declarator("int *x[3];");
        assert_eq!(decl.derived, vec![Derived::Pointer, Derived::Array(3)]);

        let decl = first_declarator("int (*x)[3];");
        assert_eq!(decl.derived, vec![Derived::Array(3), Derived::Pointer]);
    }

    #[test]
    fn test_nested_anonymous_struct_field() {
        let mut parser = Parser::new("struct { struct { char b; } a; } x;").unwrap();
        let program = parser.parse_program().unwrap();

        let AstNode::Declaration {
            base: BaseType::Struct(outer),
            declarators,
            ..
        } = &program.nodes[0]
        else {
            panic!("Expected struct declaration");
        };
        assert!(outer.tag.is_none());
        assert_eq!(declarators[0].name, "x");

        let fields = outer.fields.as_ref().unwrap();
        assert_eq!(fields[0].name, "a");
        assert!(matches!(
            &fields[0].field_type.base,
            BaseType::Struct(inner) if inner.fields.as_ref().map(Vec::len) == Some(1)
        ));
    }

    #[test]
    fn test_comma_separated_fields() {
        let mut parser = Parser::new("struct S { int a, b; };").unwrap();
        let program = parser.parse_program().unwrap();

        let AstNode::Declaration {
            base: BaseType::Struct(spec),
            ..
        } = &program.nodes[0]
        else {
            panic!("Expected struct declaration");
        };
        let names: Vec<_> = spec
            .fields
            .as_ref()
            .unwrap()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_function_with_params_and_prototype() {
        let mut parser =
            Parser::new("int add(int a, int *b);\nint add(int a, int *b) { return a + *b; }")
                .unwrap();
        let program = parser.parse_program().unwrap();

        assert!(matches!(&program.nodes[0], AstNode::FunctionDecl { name, .. } if name == "add"));
        match &program.nodes[1] {
            AstNode::FunctionDef { params, .. } => {
                assert_eq!(params.len(), 2);
                assert!(params[1].param_type.is_pointer());
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_void_parameter_list() {
        let mut parser = Parser::new("int f(void) { return 1; }").unwrap();
        let program = parser.parse_program().unwrap();
        assert!(matches!(&program.nodes[0], AstNode::FunctionDef { params, .. } if params.is_empty()));
    }

    #[test]
    fn test_pointer_return_type() {
        let mut parser = Parser::new("int *f() { return 0; }").unwrap();
        let program = parser.parse_program().unwrap();
        assert!(matches!(
            &program.nodes[0],
            AstNode::FunctionDef { return_type, .. } if return_type.is_pointer()
        ));
    }

    #[test]
    fn test_non_constant_array_size_rejected() {
        let mut parser = Parser::new("int x[n];").unwrap();
        let err = parser.parse_program().unwrap_err();
        assert!(err.message.contains("constant integer"));
    }
}
