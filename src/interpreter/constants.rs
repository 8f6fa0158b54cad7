// Constants for the evaluator and layout rules

/// Size and alignment of a pointer (64-bit word)
pub const WORD_SIZE: usize = 8;

/// Size and alignment of `int`
pub const INT_SIZE: usize = 4;

/// Maximum nesting of active function calls
pub const MAX_CALL_DEPTH: usize = 128;

/// Default limit on live arena bytes (globals, literals and frames)
pub const DEFAULT_MEMORY_LIMIT: usize = 16 * 1024 * 1024;
