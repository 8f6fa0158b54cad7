//! Resolver error types
//!
//! [`NameError`] covers identifiers that cannot be resolved or are declared
//! twice in one scope; [`TypeError`] covers operand and declaration type
//! violations. Both are fatal and carry the source location of the offending
//! construct.

use crate::parser::ast::SourceLocation;
use std::fmt;

/// An identifier that could not be resolved, or a conflicting declaration
#[derive(Debug, Clone, PartialEq)]
pub struct NameError {
    pub name: String,
    pub message: String,
    pub location: SourceLocation,
}

impl NameError {
    pub fn undefined(kind: &str, name: &str, location: SourceLocation) -> Self {
        NameError {
            name: name.to_string(),
            message: format!("Undefined {} '{}'", kind, name),
            location,
        }
    }

    pub fn redeclared(kind: &str, name: &str, location: SourceLocation) -> Self {
        NameError {
            name: name.to_string(),
            message: format!("Redeclaration of {} '{}' in the same scope", kind, name),
            location,
        }
    }
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for NameError {}

/// Operand or declaration type violation
#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub message: String,
    pub location: SourceLocation,
}

impl TypeError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        TypeError {
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for TypeError {}

/// Any error raised while resolving a program
#[derive(Debug, Clone, PartialEq)]
pub enum SemaError {
    Name(NameError),
    Type(TypeError),
}

impl SemaError {
    pub fn location(&self) -> &SourceLocation {
        match self {
            SemaError::Name(e) => &e.location,
            SemaError::Type(e) => &e.location,
        }
    }
}

impl fmt::Display for SemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemaError::Name(e) => e.fmt(f),
            SemaError::Type(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for SemaError {}

impl From<NameError> for SemaError {
    fn from(err: NameError) -> Self {
        SemaError::Name(err)
    }
}

impl From<TypeError> for SemaError {
    fn from(err: TypeError) -> Self {
        SemaError::Type(err)
    }
}
