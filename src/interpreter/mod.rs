//! Evaluator for resolved programs
//!
//! This module provides the core execution logic:
//! - [`engine`]: the [`Interpreter`](engine::Interpreter), calls and frames
//! - `statements` / `expressions`: tree walking over the typed program
//! - [`ops`]: operators (arithmetic, pointer arithmetic, assignment, `++`/`--`)
//! - `memory_ops`: typed loads and stores on the arena
//! - `builtins`: `printf` and `assert`
//! - [`errors`]: runtime error types
//! - [`constants`]: sizes and limits
//!
//! # Execution Model
//!
//! Each call allocates a frame block sized by the resolver, stores the
//! arguments into their parameter slots and walks the body. Lvalues evaluate
//! to arena addresses and rvalues to [`Value`](crate::memory::Value)s.

pub mod builtins;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod expressions;
pub mod memory_ops;
pub mod ops;
pub mod statements;

pub use engine::Interpreter;
pub use errors::RuntimeError;
