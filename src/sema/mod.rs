//! Semantic analysis: types, layout and name resolution
//!
//! Turns the parser's untyped AST into the typed tree the interpreter runs:
//! - [`types`]: [`types::CType`], sizes, alignment and struct layout
//! - [`scope`]: the scope manager (block scoping, shadowing, globals)
//! - [`resolver`]: the two-pass resolver, extended by `expressions` and
//!   `statements`
//! - [`typed`]: the typed program tree
//! - [`errors`]: [`NameError`](errors::NameError) and
//!   [`TypeError`](errors::TypeError)

pub mod errors;
pub mod expressions;
pub mod resolver;
pub mod scope;
pub mod statements;
pub mod typed;
pub mod types;

pub use errors::{NameError, SemaError, TypeError};
pub use resolver::{resolve, Resolver};
