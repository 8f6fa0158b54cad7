//! Runtime error types for the evaluator
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! during program execution (as opposed to lexical, parse or type errors).
//!
//! All runtime errors are fatal - they abort the current call and are reported
//! with the line that caused them.

use crate::memory::{Address, MemoryError};
use crate::parser::ast::SourceLocation;
use std::fmt;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Read of a local that was never assigned
    UninitializedRead {
        address: Address,
        location: SourceLocation,
    },

    /// Access through a pointer into a frame that has returned
    DanglingPointer {
        address: Address,
        location: SourceLocation,
    },

    /// Access outside the object a pointer points into
    OutOfBounds {
        address: Address,
        len: usize,
        size: usize,
        location: SourceLocation,
    },

    /// Null pointer dereference
    NullDereference { location: SourceLocation },

    /// Write into a string literal
    ReadOnlyWrite {
        address: Address,
        location: SourceLocation,
    },

    /// Integer overflow in arithmetic operation
    IntegerOverflow {
        operation: String,
        location: SourceLocation,
    },

    /// Division by zero or modulo by zero
    DivisionError {
        operation: String,
        location: SourceLocation,
    },

    /// Comparison or difference of pointers into different objects
    PointerMismatch {
        operation: String,
        location: SourceLocation,
    },

    /// Pointer value that cannot be formed or stored
    InvalidPointer {
        message: String,
        location: SourceLocation,
    },

    /// Too many nested calls
    CallDepthExceeded {
        limit: usize,
        location: SourceLocation,
    },

    /// Arena limit reached
    OutOfMemory { requested: usize, limit: usize },

    /// `assert` saw a value other than the expected one
    AssertionFailed {
        expected: i32,
        actual: i32,
        text: Option<String>,
        location: SourceLocation,
    },

    /// Invalid printf format string
    InvalidPrintfFormat {
        message: String,
        location: SourceLocation,
    },

    /// Function not defined in the program
    UndefinedFunction { name: String },

    /// Function argument count mismatch
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        got: usize,
    },

    /// Main function not found
    NoMainFunction,
}

impl RuntimeError {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            RuntimeError::UninitializedRead { location, .. } => Some(location),
            RuntimeError::DanglingPointer { location, .. } => Some(location),
            RuntimeError::OutOfBounds { location, .. } => Some(location),
            RuntimeError::NullDereference { location } => Some(location),
            RuntimeError::ReadOnlyWrite { location, .. } => Some(location),
            RuntimeError::IntegerOverflow { location, .. } => Some(location),
            RuntimeError::DivisionError { location, .. } => Some(location),
            RuntimeError::PointerMismatch { location, .. } => Some(location),
            RuntimeError::InvalidPointer { location, .. } => Some(location),
            RuntimeError::CallDepthExceeded { location, .. } => Some(location),
            RuntimeError::AssertionFailed { location, .. } => Some(location),
            RuntimeError::InvalidPrintfFormat { location, .. } => Some(location),
            RuntimeError::OutOfMemory { .. } => None,
            RuntimeError::UndefinedFunction { .. } => None,
            RuntimeError::ArgumentCountMismatch { .. } => None,
            RuntimeError::NoMainFunction => None,
        }
    }

    /// Attach a source location to an arena failure
    pub fn from_memory(err: MemoryError, location: SourceLocation) -> Self {
        match err {
            MemoryError::Uninitialized { address } => {
                RuntimeError::UninitializedRead { address, location }
            }
            MemoryError::Dangling { address } => {
                RuntimeError::DanglingPointer { address, location }
            }
            MemoryError::OutOfBounds { address, len, size } => RuntimeError::OutOfBounds {
                address,
                len,
                size,
                location,
            },
            MemoryError::ReadOnly { address } => RuntimeError::ReadOnlyWrite { address, location },
            MemoryError::InvalidBlock { address } => RuntimeError::InvalidPointer {
                message: format!("no object at {}", address),
                location,
            },
            MemoryError::OutOfMemory { requested, limit } => {
                RuntimeError::OutOfMemory { requested, limit }
            }
            MemoryError::HandlesExhausted => RuntimeError::InvalidPointer {
                message: "no block handles left for a new object".to_string(),
                location,
            },
        }
    }

    pub(crate) fn overflow(operation: &str, location: SourceLocation) -> Self {
        RuntimeError::IntegerOverflow {
            operation: operation.to_string(),
            location,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UninitializedRead { address, location } => {
                write!(
                    f,
                    "Read from uninitialized memory at {} at line {}",
                    address, location.line
                )
            }
            RuntimeError::DanglingPointer { address, location } => {
                write!(
                    f,
                    "Access through dangling pointer {} at line {}",
                    address, location.line
                )
            }
            RuntimeError::OutOfBounds {
                address,
                len,
                size,
                location,
            } => {
                write!(
                    f,
                    "Out-of-bounds access at line {}: {} byte{} at {} in an object of {} bytes",
                    location.line,
                    len,
                    if *len == 1 { "" } else { "s" },
                    address,
                    size
                )
            }
            RuntimeError::NullDereference { location } => {
                write!(f, "Null pointer dereference at line {}", location.line)
            }
            RuntimeError::ReadOnlyWrite { address, location } => {
                write!(
                    f,
                    "Write to string literal at {} at line {}",
                    address, location.line
                )
            }
            RuntimeError::IntegerOverflow {
                operation,
                location,
            } => {
                write!(
                    f,
                    "Integer overflow in {} at line {}",
                    operation, location.line
                )
            }
            RuntimeError::DivisionError {
                operation,
                location,
            } => {
                write!(f, "{} at line {}", operation, location.line)
            }
            RuntimeError::PointerMismatch {
                operation,
                location,
            } => {
                write!(
                    f,
                    "Pointers in {} point into different objects at line {}",
                    operation, location.line
                )
            }
            RuntimeError::InvalidPointer { message, location } => {
                write!(f, "Invalid pointer: {} at line {}", message, location.line)
            }
            RuntimeError::CallDepthExceeded { limit, location } => {
                write!(
                    f,
                    "Call depth limit of {} exceeded at line {}",
                    limit, location.line
                )
            }
            RuntimeError::OutOfMemory { requested, limit } => {
                write!(
                    f,
                    "Out of memory: requested {} bytes, limit is {}",
                    requested, limit
                )
            }
            RuntimeError::AssertionFailed {
                expected,
                actual,
                text,
                location,
            } => match text {
                Some(text) => write!(
                    f,
                    "Assertion failed: {} => {} expected but got {} at line {}",
                    text, expected, actual, location.line
                ),
                None => write!(
                    f,
                    "Assertion failed: {} expected but got {} at line {}",
                    expected, actual, location.line
                ),
            },
            RuntimeError::InvalidPrintfFormat { message, location } => {
                write!(
                    f,
                    "Invalid printf format: {} at line {}",
                    message, location.line
                )
            }
            RuntimeError::UndefinedFunction { name } => {
                write!(f, "Function '{}' is not defined", name)
            }
            RuntimeError::ArgumentCountMismatch {
                function,
                expected,
                got,
            } => {
                write!(
                    f,
                    "Function '{}' expects {} argument{}, got {}",
                    function,
                    expected,
                    if *expected == 1 { "" } else { "s" },
                    got
                )
            }
            RuntimeError::NoMainFunction => {
                write!(f, "No main() function found")
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
