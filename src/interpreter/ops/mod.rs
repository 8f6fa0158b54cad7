pub mod assign;
pub mod binary;
pub mod unary;

// Operators are implemented as further `impl Interpreter` blocks
