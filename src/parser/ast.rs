// AST (Abstract Syntax Tree) definitions for the C subset

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A struct specifier as written: `struct Tag`, `struct Tag { ... }` or `struct { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructSpec {
    pub tag: Option<String>,
    /// `None` for a reference to an existing tag, `Some` for a definition
    pub fields: Option<Vec<Field>>,
    pub location: SourceLocation,
}

/// Base types supported by the interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    Int,
    Char,
    Void,
    Struct(StructSpec),
}

/// One layer of a declarator, applied outward from the base type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derived {
    Pointer,
    Array(usize),
}

/// Type as written in the source: a base plus declarator layers.
///
/// `derived` is ordered innermost first, so the last entry is the outermost
/// type constructor. `int *x[3]` is `[Pointer, Array(3)]` (array of pointers),
/// while `int (*x)[3]` is `[Array(3), Pointer]` (pointer to array).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub base: BaseType,
    pub derived: Vec<Derived>,
}

impl Type {
    pub fn new(base: BaseType) -> Self {
        Type {
            base,
            derived: Vec::new(),
        }
    }

    pub fn with_pointer(mut self) -> Self {
        self.derived.push(Derived::Pointer);
        self
    }

    pub fn with_array(mut self, len: usize) -> Self {
        self.derived.push(Derived::Array(len));
        self
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.derived.last(), Some(Derived::Pointer))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.derived.last(), Some(Derived::Array(_)))
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Compound assignment
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl BinOp {
    /// The arithmetic operator behind a compound assignment
    pub fn arithmetic(self) -> BinOp {
        match self {
            BinOp::AddAssign => BinOp::Add,
            BinOp::SubAssign => BinOp::Sub,
            BinOp::MulAssign => BinOp::Mul,
            BinOp::DivAssign => BinOp::Div,
            BinOp::ModAssign => BinOp::Mod,
            other => other,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::AddAssign => "+=",
            BinOp::SubAssign => "-=",
            BinOp::MulAssign => "*=",
            BinOp::DivAssign => "/=",
            BinOp::ModAssign => "%=",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Plus,    // +x
    Neg,     // -x
    Not,     // !x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
    Deref,   // *x
    AddrOf,  // &x
}

/// Function parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub param_type: Type,
    pub location: SourceLocation,
}

/// Struct field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub field_type: Type,
}

/// One declarator of a declaration: `*p = 0` in `int x, *p = 0;`
#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: String,
    pub derived: Vec<Derived>,
    pub init: Option<Box<AstNode>>,
    pub location: SourceLocation,
}

/// AST nodes representing statements and expressions
#[derive(Debug, Clone)]
pub enum AstNode {
    // Top-level declarations
    FunctionDef {
        name: String,
        params: Vec<Param>,
        body: Vec<AstNode>,
        return_type: Type,
        location: SourceLocation,
    },
    FunctionDecl {
        name: String,
        params: Vec<Param>,
        return_type: Type,
        location: SourceLocation,
    },

    // Statements
    /// Variable declarations sharing one base type. A struct definition with
    /// no declarators (`struct P { int x; };`) has an empty `declarators` list.
    Declaration {
        base: BaseType,
        declarators: Vec<Declarator>,
        location: SourceLocation,
    },
    Return {
        expr: Option<Box<AstNode>>,
        location: SourceLocation,
    },
    If {
        condition: Box<AstNode>,
        then_branch: Vec<AstNode>,
        else_branch: Option<Vec<AstNode>>,
        location: SourceLocation,
    },
    While {
        condition: Box<AstNode>,
        body: Vec<AstNode>,
        location: SourceLocation,
    },
    For {
        init: Option<Box<AstNode>>,
        condition: Option<Box<AstNode>>,
        increment: Option<Box<AstNode>>,
        body: Vec<AstNode>,
        location: SourceLocation,
    },
    Block {
        statements: Vec<AstNode>,
        location: SourceLocation,
    },
    ExpressionStatement {
        expr: Box<AstNode>,
        location: SourceLocation,
    },

    // Expressions
    IntLiteral(i32, SourceLocation),
    CharLiteral(i8, SourceLocation),
    StringLiteral(Vec<u8>, SourceLocation),
    Variable(String, SourceLocation),
    BinaryOp {
        op: BinOp,
        left: Box<AstNode>,
        right: Box<AstNode>,
        location: SourceLocation,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<AstNode>,
        location: SourceLocation,
    },
    Assignment {
        lhs: Box<AstNode>,
        rhs: Box<AstNode>,
        location: SourceLocation,
    },
    CompoundAssignment {
        lhs: Box<AstNode>,
        op: BinOp,
        rhs: Box<AstNode>,
        location: SourceLocation,
    },
    Comma {
        left: Box<AstNode>,
        right: Box<AstNode>,
        location: SourceLocation,
    },
    FunctionCall {
        name: String,
        args: Vec<AstNode>,
        location: SourceLocation,
    },
    ArrayAccess {
        array: Box<AstNode>,
        index: Box<AstNode>,
        location: SourceLocation,
    },
    MemberAccess {
        object: Box<AstNode>,
        member: String,
        location: SourceLocation,
    },
    PointerMemberAccess {
        object: Box<AstNode>,
        member: String,
        location: SourceLocation,
    },
    SizeofType {
        target_type: Type,
        location: SourceLocation,
    },
    SizeofExpr {
        expr: Box<AstNode>,
        location: SourceLocation,
    },
}

impl AstNode {
    /// Get the source location of this node
    pub fn location(&self) -> &SourceLocation {
        match self {
            AstNode::FunctionDef { location, .. } => location,
            AstNode::FunctionDecl { location, .. } => location,
            AstNode::Declaration { location, .. } => location,
            AstNode::Return { location, .. } => location,
            AstNode::If { location, .. } => location,
            AstNode::While { location, .. } => location,
            AstNode::For { location, .. } => location,
            AstNode::Block { location, .. } => location,
            AstNode::ExpressionStatement { location, .. } => location,
            AstNode::IntLiteral(_, loc) => loc,
            AstNode::CharLiteral(_, loc) => loc,
            AstNode::StringLiteral(_, loc) => loc,
            AstNode::Variable(_, loc) => loc,
            AstNode::BinaryOp { location, .. } => location,
            AstNode::UnaryOp { location, .. } => location,
            AstNode::Assignment { location, .. } => location,
            AstNode::CompoundAssignment { location, .. } => location,
            AstNode::Comma { location, .. } => location,
            AstNode::FunctionCall { location, .. } => location,
            AstNode::ArrayAccess { location, .. } => location,
            AstNode::MemberAccess { location, .. } => location,
            AstNode::PointerMemberAccess { location, .. } => location,
            AstNode::SizeofType { location, .. } => location,
            AstNode::SizeofExpr { location, .. } => location,
        }
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub nodes: Vec<AstNode>, // FunctionDef, FunctionDecl and Declaration nodes
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
