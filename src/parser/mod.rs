//! C source code parser
//!
//! This module transforms C source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → lazy token stream)
//! - [`parse`]: Parser core (tokens → AST), extended by [`declarations`],
//!   [`statements`] and [`expressions`]
//! - [`ast`]: AST node definitions
//!
//! # Supported C Subset
//!
//! - Types: `int`, `char`, `void`, structs (tagged, anonymous, nested),
//!   pointers, arrays of any dimension
//! - Statements: declarations, `if`/`else`, `while`, `for`, `return`, blocks
//! - Expressions: arithmetic, comparison, short-circuit logic, assignment and
//!   compound assignment, increment/decrement, comma, calls, `sizeof`
//! - No preprocessor (directive lines such as `#include` are skipped)
//! - No typedefs, unions, enums, casts or function pointers
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
pub mod declarations;
pub mod expressions;
pub mod lexer;
pub mod parse;
pub mod statements;

pub use parse::{ParseError, Parser};
