//! # Introduction
//!
//! subc evaluates a small subset of C with byte-accurate memory layout: struct
//! padding, array decay, scaled pointer arithmetic and `char`/`int` storage
//! widths all behave as they would in compiled C on a 64-bit target.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Resolver → typed Program → Interpreter
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds an untyped AST.
//! 2. [`sema`]: resolves names and scopes, assigns a [`sema::types::CType`]
//!    to every expression and lays out structs, frames and globals.
//! 3. [`interpreter`]: walks the typed tree; lvalues evaluate to arena
//!    addresses, rvalues to [`memory::Value`]s.
//! 4. [`memory`]: the arena of byte blocks (globals, string literals, frames).
//! 5. [`console`]: captured `printf`/`assert` output.
//! 6. [`compile`]: the pipeline driver and its error types.
//! 7. [`ui`]: ratatui-based function explorer; not part of the stable
//!    library API.
//!
//! ## Supported C subset
//!
//! Types: `int`, `char`, `void`, structs, pointers, fixed-size arrays.
//! Control flow: `if/else`, `while`, `for`, `return`, blocks.
//! Built-ins: `printf`, `assert`, `ASSERT`, `sizeof`.

pub mod compile;
pub mod console;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod sema;
pub mod ui;

pub use compile::{compile, CompileError, RunError};
pub use interpreter::{Interpreter, RuntimeError};
