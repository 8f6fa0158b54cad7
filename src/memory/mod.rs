//! Memory model for the evaluator
//!
//! - [`arena`]: byte blocks for globals, string literals and call frames
//! - [`value`]: runtime values and the [`Address`](value::Address) type
//!
//! # Type Sizes
//!
//! Fixed, platform-independent sizes:
//! - `char`: 1 byte
//! - `int`: 4 bytes, little-endian
//! - `pointer`: 8 bytes
//! - `struct`: fields aligned to their natural alignment, size rounded up to
//!   the struct's alignment
//!
//! # Pointer Arithmetic
//!
//! A pointer is a (block, byte offset) pair. The typed tree already carries
//! the scale factor, so arithmetic here is plain byte offsets:
//! ```text
//! ptr + n  →  Address { block, offset + n * scale }
//! ```

pub mod arena;
pub mod value;

pub use arena::{Arena, BlockKind, MemoryError};
pub use value::{Address, BlockId, Value};
