//! Type-annotated program tree
//!
//! The resolver lowers the parser's [`AstNode`](crate::parser::ast::AstNode)
//! tree into this form, which the interpreter executes directly:
//! - every expression carries its [`CType`]
//! - names are replaced by storage references ([`VarRef`])
//! - array decay is an explicit [`ExprKind::Decay`] node
//! - pointer arithmetic carries its scale factor
//! - `sizeof` is folded to a constant, `a[i]` to `*(a + i)`, `p->m` to `(*p).m`
//! - declarations with initializers become assignments

use super::types::CType;
use crate::parser::ast::{BinOp, SourceLocation};
use rustc_hash::FxHashMap;

/// Storage a variable reference resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarRef {
    /// Byte offset in the current call's frame
    Local { offset: usize },
    /// Byte offset in the globals block
    Global { offset: usize },
    /// A string literal's read-only block
    Literal(usize),
}

/// Callable targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callee {
    /// Index into [`Program::functions`]
    Function(usize),
    Builtin(Builtin),
}

/// Functions provided by the runtime rather than the program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `printf(format, ...)`
    Printf,
    /// `assert(expected, actual[, text])` and `ASSERT(expected, actual)`
    Assert,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "printf" => Some(Builtin::Printf),
            "assert" | "ASSERT" => Some(Builtin::Assert),
            _ => None,
        }
    }
}

/// A typed expression
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: CType,
    pub location: SourceLocation,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: CType, location: SourceLocation) -> Self {
        Expr { kind, ty, location }
    }

    /// Forms that designate storage
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Var(_) | ExprKind::Deref(_) | ExprKind::Member { .. }
        )
    }

    /// The literal `0`, which converts to a null pointer
    pub fn is_null_constant(&self) -> bool {
        matches!(self.kind, ExprKind::Num(0)) && self.ty.is_integer()
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Num(i32),
    /// Null pointer constant (the literal `0` in pointer context)
    Null,
    Var(VarRef),
    Deref(Box<Expr>),
    /// Field at `offset` inside the struct lvalue `base`
    Member { base: Box<Expr>, offset: usize },
    AddrOf(Box<Expr>),
    /// Array lvalue to pointer to its first element
    Decay(Box<Expr>),
    /// Unary `+`: the operand's value, never an lvalue
    Plus(Box<Expr>),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    /// Integer arithmetic, or a comparison of two integers or two pointers
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `ptr + index * scale` (or minus when `negate`)
    PtrOffset {
        ptr: Box<Expr>,
        index: Box<Expr>,
        scale: usize,
        negate: bool,
    },
    /// `(lhs - rhs) / scale` for two pointers into the same object
    PtrDiff {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        scale: usize,
    },
    LogicalAnd(Box<Expr>, Box<Expr>),
    LogicalOr(Box<Expr>, Box<Expr>),
    /// Scalar store or struct byte copy, depending on `target.ty`
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// `target op= value`; `scale` is set for pointer targets
    CompoundAssign {
        op: BinOp,
        target: Box<Expr>,
        value: Box<Expr>,
        scale: Option<usize>,
    },
    /// `++`/`--`; `delta` is +1 or -1 and is multiplied by `scale`
    IncDec {
        target: Box<Expr>,
        prefix: bool,
        delta: i32,
        scale: usize,
    },
    Comma(Box<Expr>, Box<Expr>),
    Call {
        callee: Callee,
        name: String,
        args: Vec<Expr>,
    },
}

/// A typed statement
#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    Return {
        value: Option<Expr>,
        location: SourceLocation,
    },
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    For {
        init: Vec<Stmt>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Vec<Stmt>,
    },
    Block(Vec<Stmt>),
}

/// A local slot in a function frame
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSlot {
    pub name: String,
    pub ty: CType,
    pub offset: usize,
    pub depth: usize,
}

/// A resolved function definition
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub return_type: CType,
    /// Parameter slots, in declaration order
    pub params: Vec<LocalSlot>,
    /// Every local slot including parameters, in declaration order
    pub locals: Vec<LocalSlot>,
    pub body: Vec<Stmt>,
    pub frame_size: usize,
    pub location: SourceLocation,
}

/// Constant initial value of a global
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalInit {
    Int(i32),
    /// Address of a string literal block
    Literal(usize),
}

/// A global variable placed in the globals block
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVar {
    pub name: String,
    pub ty: CType,
    pub offset: usize,
    pub init: Option<GlobalInit>,
}

/// A fully resolved program
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub functions: Vec<Function>,
    pub function_index: FxHashMap<String, usize>,
    pub globals: Vec<GlobalVar>,
    pub globals_size: usize,
    /// String literal bytes, NUL-terminated
    pub literals: Vec<Vec<u8>>,
}

impl Program {
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.function_index.get(name).map(|&i| &self.functions[i])
    }
}
