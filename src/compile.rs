//! Pipeline driver
//!
//! ```text
//! source → Lexer → Parser → Resolver → typed Program → Interpreter
//! ```
//!
//! Each stage aborts on its first error; [`CompileError`] keeps the stages
//! distinct so callers can tell a lexical error from a type error.

use crate::interpreter::constants::DEFAULT_MEMORY_LIMIT;
use crate::interpreter::{Interpreter, RuntimeError};
use crate::parser::ast::SourceLocation;
use crate::parser::lexer::LexError;
use crate::parser::{ParseError, Parser};
use crate::sema::typed::Program;
use crate::sema::{resolve, NameError, SemaError, TypeError};
use std::fmt;

/// Errors raised before execution starts
#[derive(Debug, Clone)]
pub enum CompileError {
    Lex(LexError),
    Parse(ParseError),
    Name(NameError),
    Type(TypeError),
}

impl CompileError {
    pub fn location(&self) -> &SourceLocation {
        match self {
            CompileError::Lex(e) => &e.location,
            CompileError::Parse(e) => &e.location,
            CompileError::Name(e) => &e.location,
            CompileError::Type(e) => &e.location,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(e) => write!(f, "{}", e),
            CompileError::Parse(e) => write!(f, "{}", e),
            CompileError::Name(e) => write!(f, "{}", e),
            CompileError::Type(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<LexError> for CompileError {
    fn from(e: LexError) -> Self {
        CompileError::Lex(e)
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}

impl From<SemaError> for CompileError {
    fn from(e: SemaError) -> Self {
        match e {
            SemaError::Name(e) => CompileError::Name(e),
            SemaError::Type(e) => CompileError::Type(e),
        }
    }
}

/// Any failure of a compile-and-run
#[derive(Debug, Clone)]
pub enum RunError {
    Compile(CompileError),
    Runtime(RuntimeError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Compile(e) => write!(f, "{}", e),
            RunError::Runtime(e) => write!(f, "Runtime error: {}", e),
        }
    }
}

impl std::error::Error for RunError {}

impl From<CompileError> for RunError {
    fn from(e: CompileError) -> Self {
        RunError::Compile(e)
    }
}

impl From<RuntimeError> for RunError {
    fn from(e: RuntimeError) -> Self {
        RunError::Runtime(e)
    }
}

/// Lex, parse and resolve a translation unit
pub fn compile(source: &str) -> Result<Program, CompileError> {
    let mut parser = Parser::new(source)?;
    let ast = parser.parse_program()?;
    Ok(resolve(&ast)?)
}

/// Compile `source` and load it into an interpreter with the default
/// memory limit
pub fn load(source: &str) -> Result<Interpreter, RunError> {
    let program = compile(source)?;
    Ok(Interpreter::new(program, DEFAULT_MEMORY_LIMIT)?)
}

/// Compile `source`, run `main` and return its result with the captured output
pub fn run_source(source: &str) -> Result<(i32, String), RunError> {
    let mut interpreter = load(source)?;
    let status = interpreter.run()?;
    Ok((status, interpreter.console().text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_are_distinct() {
        assert!(matches!(
            compile("int main() { return 1 @ 2; }"),
            Err(CompileError::Lex(_))
        ));
        assert!(matches!(
            compile("int main() { return 1 }"),
            Err(CompileError::Parse(_))
        ));
        assert!(matches!(
            compile("int main() { return y; }"),
            Err(CompileError::Name(_))
        ));
        assert!(matches!(
            compile("int main() { int x; return x[0]; }"),
            Err(CompileError::Type(_))
        ));
    }

    #[test]
    fn test_error_locations() {
        let err = compile("int main() {\n  return y;\n}").unwrap_err();
        assert_eq!(err.location().line, 2);
    }

    #[test]
    fn test_run_source() {
        let (status, output) =
            run_source("int main() { printf(\"OK\\n\"); return 3; }").unwrap();
        assert_eq!(status, 3);
        assert_eq!(output, "OK\n");
    }

    #[test]
    fn test_runtime_errors_are_wrapped() {
        let err = run_source("int main() { int z = 0; return 1 / z; }").unwrap_err();
        assert!(matches!(
            err,
            RunError::Runtime(RuntimeError::DivisionError { .. })
        ));
    }
}
