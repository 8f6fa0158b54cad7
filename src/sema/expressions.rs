//! Expression resolution
//!
//! Assigns a [`CType`] to every expression and lowers it into the typed tree.
//! Two entry points are used throughout:
//!
//! - [`Resolver::expr`]: the expression as written; array-typed results stay
//!   arrays (needed by `&`, `sizeof` and assignment targets)
//! - [`Resolver::rvalue`]: the expression used for its value; arrays decay to
//!   a pointer to their first element through an explicit `Decay` node
//!
//! Pointer arithmetic is checked and annotated here with its scale factor, so
//! the interpreter never inspects types to decide how far a pointer moves.

use super::errors::{NameError, SemaError, TypeError};
use super::resolver::Resolver;
use super::scope::Storage;
use super::typed::{Builtin, Callee, Expr, ExprKind, VarRef};
use super::types::{common_type, CType};
use crate::parser::ast::{AstNode, BinOp, SourceLocation, UnOp};

impl Resolver {
    /// Resolve an expression used for its value (arrays decay)
    pub(crate) fn rvalue(&mut self, node: &AstNode) -> Result<Expr, SemaError> {
        let expr = self.expr(node)?;
        Ok(decay(expr))
    }

    /// Resolve an expression as written
    pub(crate) fn expr(&mut self, node: &AstNode) -> Result<Expr, SemaError> {
        match node {
            AstNode::IntLiteral(n, loc) => Ok(Expr::new(ExprKind::Num(*n), CType::Int, *loc)),

            // Character constants have type int
            AstNode::CharLiteral(c, loc) => {
                Ok(Expr::new(ExprKind::Num(*c as i32), CType::Int, *loc))
            }

            AstNode::StringLiteral(bytes, loc) => Ok(self.intern_literal(bytes, *loc)),

            AstNode::Variable(name, loc) => {
                let var = self.scopes.resolve(name, *loc)?;
                let var_ref = match var.storage {
                    Storage::Local { offset } => VarRef::Local { offset },
                    Storage::Global { offset } => VarRef::Global { offset },
                };
                Ok(Expr::new(ExprKind::Var(var_ref), var.ty.clone(), *loc))
            }

            AstNode::UnaryOp {
                op,
                operand,
                location,
            } => self.unary(*op, operand, *location),

            AstNode::BinaryOp {
                op: BinOp::And,
                left,
                right,
                location,
            } => {
                let (l, r) = (self.condition(left)?, self.condition(right)?);
                Ok(Expr::new(
                    ExprKind::LogicalAnd(Box::new(l), Box::new(r)),
                    CType::Int,
                    *location,
                ))
            }

            AstNode::BinaryOp {
                op: BinOp::Or,
                left,
                right,
                location,
            } => {
                let (l, r) = (self.condition(left)?, self.condition(right)?);
                Ok(Expr::new(
                    ExprKind::LogicalOr(Box::new(l), Box::new(r)),
                    CType::Int,
                    *location,
                ))
            }

            AstNode::BinaryOp {
                op,
                left,
                right,
                location,
            } => {
                let l = self.rvalue(left)?;
                let r = self.rvalue(right)?;
                self.binary(*op, l, r, *location)
            }

            AstNode::Assignment { lhs, rhs, location } => {
                let target = self.assignable(lhs, *location)?;
                let value = self.rvalue(rhs)?;
                let value = self.coerce(value, &target.ty, *location)?;
                let ty = target.ty.clone();
                Ok(Expr::new(
                    ExprKind::Assign {
                        target: Box::new(target),
                        value: Box::new(value),
                    },
                    ty,
                    *location,
                ))
            }

            AstNode::CompoundAssignment {
                lhs,
                op,
                rhs,
                location,
            } => self.compound_assignment(op.arithmetic(), lhs, rhs, *location),

            AstNode::Comma {
                left,
                right,
                location,
            } => {
                let l = self.rvalue(left)?;
                let r = self.rvalue(right)?;
                let ty = r.ty.clone();
                Ok(Expr::new(
                    ExprKind::Comma(Box::new(l), Box::new(r)),
                    ty,
                    *location,
                ))
            }

            AstNode::FunctionCall {
                name,
                args,
                location,
            } => self.call(name, args, *location),

            AstNode::ArrayAccess {
                array,
                index,
                location,
            } => {
                let a = self.rvalue(array)?;
                let i = self.rvalue(index)?;

                // a[i] and i[a] are both *(a + i)
                let (ptr, idx) = match (a.ty.is_pointer(), i.ty.is_pointer()) {
                    (true, false) if i.ty.is_integer() => (a, i),
                    (false, true) if a.ty.is_integer() => (i, a),
                    _ => {
                        return Err(TypeError::new(
                            format!(
                                "Subscripted value of type {} is not an array or pointer",
                                a.ty
                            ),
                            *location,
                        )
                        .into());
                    }
                };
                let sum = self.pointer_offset(ptr, idx, false, *location)?;
                self.deref(sum, *location)
            }

            AstNode::MemberAccess {
                object,
                member,
                location,
            } => {
                let base = self.expr(object)?;
                self.member(base, member, *location)
            }

            AstNode::PointerMemberAccess {
                object,
                member,
                location,
            } => {
                let ptr = self.rvalue(object)?;
                if !matches!(ptr.ty.pointee(), Some(CType::Struct(_))) {
                    return Err(TypeError::new(
                        format!("'->' applied to non-struct-pointer type {}", ptr.ty),
                        *location,
                    )
                    .into());
                }
                let base = self.deref(ptr, *location)?;
                self.member(base, member, *location)
            }

            AstNode::SizeofType {
                target_type,
                location,
            } => {
                let ty = self.resolve_type(target_type, *location)?;
                sizeof(&ty, *location)
            }

            // The operand is resolved for its type only and never evaluated
            AstNode::SizeofExpr { expr, location } => {
                let operand = self.expr(expr)?;
                sizeof(&operand.ty, *location)
            }

            other => Err(TypeError::new("Expected an expression", *other.location()).into()),
        }
    }

    /// Resolve a condition: any scalar value
    pub(crate) fn condition(&mut self, node: &AstNode) -> Result<Expr, SemaError> {
        let expr = self.rvalue(node)?;
        if !expr.ty.is_scalar() {
            return Err(TypeError::new(
                format!("Used type {} where a scalar is required", expr.ty),
                expr.location,
            )
            .into());
        }
        Ok(expr)
    }

    /// Resolve an assignment target: a modifiable, non-array lvalue
    fn assignable(&mut self, node: &AstNode, location: SourceLocation) -> Result<Expr, SemaError> {
        let target = self.expr(node)?;
        if !target.is_lvalue() || matches!(target.kind, ExprKind::Var(VarRef::Literal(_))) {
            return Err(TypeError::new("Expression is not assignable", location).into());
        }
        if target.ty.is_array() {
            return Err(TypeError::new(
                format!("Array of type {} is not assignable", target.ty),
                location,
            )
            .into());
        }
        Ok(target)
    }

    fn unary(
        &mut self,
        op: UnOp,
        operand: &AstNode,
        location: SourceLocation,
    ) -> Result<Expr, SemaError> {
        match op {
            UnOp::Plus | UnOp::Neg => {
                let e = Box::new(self.rvalue(operand)?);
                let symbol = if op == UnOp::Plus { '+' } else { '-' };
                if !e.ty.is_integer() {
                    return Err(TypeError::new(
                        format!("Invalid operand type {} for unary '{}'", e.ty, symbol),
                        location,
                    )
                    .into());
                }
                let kind = if op == UnOp::Plus { ExprKind::Plus(e) } else { ExprKind::Neg(e) };
                Ok(Expr::new(kind, CType::Int, location))
            }
            UnOp::Not => {
                let e = self.condition(operand)?;
                Ok(Expr::new(ExprKind::Not(Box::new(e)), CType::Int, location))
            }
            UnOp::Deref => {
                let e = self.rvalue(operand)?;
                self.deref(e, location)
            }
            UnOp::AddrOf => {
                let e = self.expr(operand)?;
                if !e.is_lvalue() {
                    return Err(
                        TypeError::new("Cannot take the address of an rvalue", location).into(),
                    );
                }
                let ty = CType::pointer_to(e.ty.clone());
                Ok(Expr::new(ExprKind::AddrOf(Box::new(e)), ty, location))
            }
            UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => {
                let target = self.assignable(operand, location)?;
                if !target.ty.is_scalar() {
                    return Err(TypeError::new(
                        format!("Cannot increment or decrement type {}", target.ty),
                        location,
                    )
                    .into());
                }
                let scale = if target.ty.is_pointer() { target.ty.scale() } else { 1 };
                let ty = target.ty.clone();
                Ok(Expr::new(
                    ExprKind::IncDec {
                        target: Box::new(target),
                        prefix: matches!(op, UnOp::PreInc | UnOp::PreDec),
                        delta: if matches!(op, UnOp::PreInc | UnOp::PostInc) { 1 } else { -1 },
                        scale,
                    },
                    ty,
                    location,
                ))
            }
        }
    }

    /// `*e` where `e` is a pointer rvalue
    fn deref(&mut self, e: Expr, location: SourceLocation) -> Result<Expr, SemaError> {
        let pointee = match &e.ty {
            CType::Pointer(inner) => (**inner).clone(),
            other => {
                return Err(TypeError::new(
                    format!("Cannot dereference non-pointer type {}", other),
                    location,
                )
                .into());
            }
        };
        if pointee == CType::Void {
            return Err(TypeError::new("Cannot dereference a void pointer", location).into());
        }
        Ok(Expr::new(ExprKind::Deref(Box::new(e)), pointee, location))
    }

    fn member(
        &mut self,
        base: Expr,
        member: &str,
        location: SourceLocation,
    ) -> Result<Expr, SemaError> {
        let CType::Struct(layout) = &base.ty else {
            return Err(TypeError::new(
                format!("Member access '.{}' on non-struct type {}", member, base.ty),
                location,
            )
            .into());
        };
        let field = layout.field(member).ok_or_else(|| {
            TypeError::new(
                format!("{} has no member named '{}'", base.ty, member),
                location,
            )
        })?;
        let (offset, ty) = (field.offset, field.ty.clone());
        Ok(Expr::new(
            ExprKind::Member {
                base: Box::new(base),
                offset,
            },
            ty,
            location,
        ))
    }

    fn binary(
        &mut self,
        op: BinOp,
        l: Expr,
        r: Expr,
        location: SourceLocation,
    ) -> Result<Expr, SemaError> {
        let mismatch = |l: &Expr, r: &Expr| -> SemaError {
            TypeError::new(
                format!(
                    "Invalid operands to binary '{}' ({} and {})",
                    op.symbol(),
                    l.ty,
                    r.ty
                ),
                location,
            )
            .into()
        };

        match op {
            BinOp::Add => match (l.ty.is_pointer(), r.ty.is_pointer()) {
                (false, false) if l.ty.is_integer() && r.ty.is_integer() => {
                    Ok(integer_binary(op, l, r, location))
                }
                (true, false) if r.ty.is_integer() => self.pointer_offset(l, r, false, location),
                (false, true) if l.ty.is_integer() => self.pointer_offset(r, l, false, location),
                _ => Err(mismatch(&l, &r)),
            },
            BinOp::Sub => match (l.ty.is_pointer(), r.ty.is_pointer()) {
                (false, false) if l.ty.is_integer() && r.ty.is_integer() => {
                    Ok(integer_binary(op, l, r, location))
                }
                (true, false) if r.ty.is_integer() => self.pointer_offset(l, r, true, location),
                (true, true) => {
                    if l.ty.pointee() != r.ty.pointee() {
                        return Err(mismatch(&l, &r));
                    }
                    let scale = l.ty.scale();
                    Ok(Expr::new(
                        ExprKind::PtrDiff {
                            lhs: Box::new(l),
                            rhs: Box::new(r),
                            scale,
                        },
                        CType::Int,
                        location,
                    ))
                }
                _ => Err(mismatch(&l, &r)),
            },
            BinOp::Mul | BinOp::Div | BinOp::Mod => {
                if l.ty.is_integer() && r.ty.is_integer() {
                    Ok(integer_binary(op, l, r, location))
                } else {
                    Err(mismatch(&l, &r))
                }
            }
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let (l, r) = match (l.ty.is_pointer(), r.ty.is_pointer()) {
                    (false, false) if l.ty.is_integer() && r.ty.is_integer() => (l, r),
                    (true, true) => (l, r),
                    (true, false) if r.is_null_constant() => {
                        let null = null_pointer(&l.ty, r.location);
                        (l, null)
                    }
                    (false, true) if l.is_null_constant() => {
                        let null = null_pointer(&r.ty, l.location);
                        (null, r)
                    }
                    _ => return Err(mismatch(&l, &r)),
                };
                Ok(Expr::new(
                    ExprKind::Binary {
                        op,
                        lhs: Box::new(l),
                        rhs: Box::new(r),
                    },
                    CType::Int,
                    location,
                ))
            }
            _ => Err(mismatch(&l, &r)),
        }
    }

    /// `ptr ± index`, scaled by the pointee size
    pub(crate) fn pointer_offset(
        &mut self,
        ptr: Expr,
        index: Expr,
        negate: bool,
        location: SourceLocation,
    ) -> Result<Expr, SemaError> {
        let scale = ptr.ty.scale();
        let ty = ptr.ty.clone();
        Ok(Expr::new(
            ExprKind::PtrOffset {
                ptr: Box::new(ptr),
                index: Box::new(index),
                scale,
                negate,
            },
            ty,
            location,
        ))
    }

    fn compound_assignment(
        &mut self,
        op: BinOp,
        lhs: &AstNode,
        rhs: &AstNode,
        location: SourceLocation,
    ) -> Result<Expr, SemaError> {
        let target = self.assignable(lhs, location)?;
        let value = self.rvalue(rhs)?;

        let scale = match (&target.ty, op) {
            (t, _) if t.is_integer() && value.ty.is_integer() => None,
            (t, BinOp::Add | BinOp::Sub) if t.is_pointer() && value.ty.is_integer() => {
                Some(t.scale())
            }
            _ => {
                return Err(TypeError::new(
                    format!(
                        "Invalid operands to '{}=' ({} and {})",
                        op.symbol(),
                        target.ty,
                        value.ty
                    ),
                    location,
                )
                .into());
            }
        };

        let ty = target.ty.clone();
        Ok(Expr::new(
            ExprKind::CompoundAssign {
                op,
                target: Box::new(target),
                value: Box::new(value),
                scale,
            },
            ty,
            location,
        ))
    }

    fn call(
        &mut self,
        name: &str,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Expr, SemaError> {
        // A variable in scope hides a function of the same name
        if let Ok(var) = self.scopes.resolve(name, location) {
            return Err(TypeError::new(
                format!("Called object '{}' of type {} is not a function", name, var.ty),
                location,
            )
            .into());
        }

        let mut resolved = Vec::with_capacity(args.len());
        for arg in args {
            resolved.push(self.rvalue(arg)?);
        }

        if let Some(&index) = self.defined.get(name) {
            let signature = self
                .signatures
                .get(name)
                .cloned()
                .ok_or_else(|| NameError::undefined("function", name, location))?;

            if signature.params.len() != resolved.len() {
                return Err(TypeError::new(
                    format!(
                        "Function '{}' expects {} argument{}, got {}",
                        name,
                        signature.params.len(),
                        if signature.params.len() == 1 { "" } else { "s" },
                        resolved.len()
                    ),
                    location,
                )
                .into());
            }

            let args = resolved
                .into_iter()
                .zip(&signature.params)
                .map(|(arg, ty)| {
                    let loc = arg.location;
                    self.coerce(arg, ty, loc)
                })
                .collect::<Result<Vec<_>, _>>()?;

            return Ok(Expr::new(
                ExprKind::Call {
                    callee: Callee::Function(index),
                    name: name.to_string(),
                    args,
                },
                signature.return_type,
                location,
            ));
        }

        let Some(builtin) = self.builtin(name) else {
            return Err(NameError::undefined("function", name, location).into());
        };
        self.check_builtin_args(builtin, name, &resolved, location)?;

        Ok(Expr::new(
            ExprKind::Call {
                callee: Callee::Builtin(builtin),
                name: name.to_string(),
                args: resolved,
            },
            CType::Int,
            location,
        ))
    }

    fn check_builtin_args(
        &self,
        builtin: Builtin,
        name: &str,
        args: &[Expr],
        location: SourceLocation,
    ) -> Result<(), TypeError> {
        let is_char_ptr = |e: &Expr| e.ty == CType::pointer_to(CType::Char);

        match builtin {
            Builtin::Printf => {
                if args.first().map(is_char_ptr) != Some(true) {
                    return Err(TypeError::new(
                        "printf expects a format string as its first argument",
                        location,
                    ));
                }
                if let Some(bad) = args.iter().find(|a| !a.ty.is_scalar()) {
                    return Err(TypeError::new(
                        format!("Cannot pass {} to printf", bad.ty),
                        bad.location,
                    ));
                }
            }
            Builtin::Assert => {
                let max = if name == "ASSERT" { 2 } else { 3 };
                if args.len() < 2 || args.len() > max {
                    return Err(TypeError::new(
                        format!(
                            "{} expects 2{} arguments, got {}",
                            name,
                            if max == 3 { " or 3" } else { "" },
                            args.len()
                        ),
                        location,
                    ));
                }
                if !args[0].ty.is_integer() || !args[1].ty.is_integer() {
                    return Err(TypeError::new(
                        format!("{} compares two integers", name),
                        location,
                    ));
                }
                if args.len() == 3 && !is_char_ptr(&args[2]) {
                    return Err(TypeError::new(
                        format!("{} expects a string as its third argument", name),
                        args[2].location,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Convert `value` for storage into an object of type `target`
    pub(crate) fn coerce(
        &self,
        value: Expr,
        target: &CType,
        location: SourceLocation,
    ) -> Result<Expr, SemaError> {
        let compatible = match target {
            CType::Int | CType::Char => value.ty.is_integer(),
            CType::Pointer(_) if value.ty.is_pointer() => true,
            CType::Pointer(_) if value.is_null_constant() => {
                return Ok(null_pointer(target, value.location));
            }
            CType::Struct(_) => value.ty == *target,
            _ => false,
        };

        if !compatible {
            return Err(TypeError::new(
                format!("Cannot convert {} to {}", value.ty, target),
                location,
            )
            .into());
        }
        Ok(value)
    }
}

/// Insert an explicit decay for array-typed expressions
pub(crate) fn decay(expr: Expr) -> Expr {
    if expr.ty.is_array() {
        let ty = expr.ty.decay();
        let location = expr.location;
        Expr::new(ExprKind::Decay(Box::new(expr)), ty, location)
    } else {
        expr
    }
}

fn null_pointer(ty: &CType, location: SourceLocation) -> Expr {
    Expr::new(ExprKind::Null, ty.clone(), location)
}

/// Arithmetic on two integer operands (callers check the operand types)
fn integer_binary(op: BinOp, l: Expr, r: Expr, location: SourceLocation) -> Expr {
    let ty = common_type(&l.ty, &r.ty).unwrap_or(CType::Int);
    Expr::new(
        ExprKind::Binary {
            op,
            lhs: Box::new(l),
            rhs: Box::new(r),
        },
        ty,
        location,
    )
}

fn sizeof(ty: &CType, location: SourceLocation) -> Result<Expr, SemaError> {
    if *ty == CType::Void {
        return Err(TypeError::new("sizeof applied to void", location).into());
    }
    let size = i32::try_from(ty.size())
        .map_err(|_| TypeError::new(format!("Type {} is too large", ty), location))?;
    Ok(Expr::new(ExprKind::Num(size), CType::Int, location))
}

#[cfg(test)]
mod tests {
    use crate::parser::parse::Parser;
    use crate::sema::errors::SemaError;
    use crate::sema::resolver::resolve;
    use crate::sema::typed::{Expr, ExprKind, Stmt};
    use crate::sema::types::CType;

    /// Resolve `int f() { <body> }` and return the typed `return` expression
    fn returned(body: &str) -> Result<Expr, SemaError> {
        returned_from("int", body)
    }

    fn returned_from(return_type: &str, body: &str) -> Result<Expr, SemaError> {
        let source = format!("{} f() {{ {} }}", return_type, body);
        let mut parser = Parser::new(&source).unwrap();
        let program = parser.parse_program().unwrap();
        let program = resolve(&program)?;
        let f = program.function("f").unwrap();
        match f.body.last() {
            Some(Stmt::Return { value: Some(e), .. }) => Ok(e.clone()),
            other => panic!("Expected return, got {:?}", other),
        }
    }

    fn type_error(body: &str) -> String {
        match returned(body) {
            Err(SemaError::Type(e)) => e.message,
            other => panic!("Expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_sizeof_is_folded() {
        let e = returned("int x[3][4]; return sizeof(*x);").unwrap();
        assert!(matches!(e.kind, ExprKind::Num(16)));

        let e = returned("int x = 1; return sizeof(x = 2);").unwrap();
        assert!(matches!(e.kind, ExprKind::Num(4)));

        let e = returned("return sizeof(struct { char a; int b; char c; });").unwrap();
        assert!(matches!(e.kind, ExprKind::Num(12)));
    }

    #[test]
    fn test_pointer_arithmetic_is_scaled() {
        let e = returned_from("int *", "int x; return &x + 2;").unwrap();
        assert!(matches!(e.kind, ExprKind::PtrOffset { scale: 4, negate: false, .. }));

        let e = returned_from("void *", "int x[2][3]; return x + 1;").unwrap();
        assert!(matches!(e.kind, ExprKind::PtrOffset { scale: 12, .. }));
        assert_eq!(e.ty, CType::pointer_to(CType::array_of(CType::Int, 3)));
    }

    #[test]
    fn test_pointer_difference() {
        let e = returned("int x; return (&x + 2) - &x;").unwrap();
        assert!(matches!(e.kind, ExprKind::PtrDiff { scale: 4, .. }));
        assert_eq!(e.ty, CType::Int);
    }

    #[test]
    fn test_subscript_is_symmetric() {
        let a = returned("int x[3]; return x[2];").unwrap();
        let b = returned("int x[3]; return 2[x];").unwrap();
        for e in [a, b] {
            match e.kind {
                ExprKind::Deref(inner) => match inner.kind {
                    ExprKind::PtrOffset { ptr, .. } => {
                        assert!(matches!(ptr.kind, ExprKind::Decay(_)))
                    }
                    other => panic!("Expected pointer offset, got {:?}", other),
                },
                other => panic!("Expected deref, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_member_offsets() {
        let e = returned("struct { char a; int b; } x; x.b = 1; return x.b;").unwrap();
        assert!(matches!(e.kind, ExprKind::Member { offset: 4, .. }));
    }

    #[test]
    fn test_arrow_lowers_to_member_of_deref() {
        let e = returned("struct P { int x; int y; } p; struct P *q = &p; return q->y;").unwrap();
        match e.kind {
            ExprKind::Member { base, offset } => {
                assert_eq!(offset, 4);
                assert!(matches!(base.kind, ExprKind::Deref(_)));
            }
            other => panic!("Expected member, got {:?}", other),
        }
    }

    #[test]
    fn test_type_errors() {
        assert!(type_error("int x; return *x;").contains("dereference"));
        assert!(type_error("int x; return x[0];").contains("not an array or pointer"));
        assert!(type_error("int x; int *p; int *q; return p + q;").contains("Invalid operands"));
        assert!(type_error("return 1 = 2;").contains("not assignable"));
        assert!(type_error("int a[2]; int b[2]; return (a = b, 0);").contains("not assignable"));
        assert!(type_error("int x; int *p = x; return 0;").contains("Cannot convert"));
        assert!(type_error("struct { int a; } s; return s.b;").contains("no member"));
        assert!(type_error("int *p; char *q; return p - q;").contains("Invalid operands"));
    }

    #[test]
    fn test_unary_plus_is_an_rvalue() {
        let e = returned("char c = 3; return +c;").unwrap();
        assert!(matches!(e.kind, ExprKind::Plus(_)));
        assert_eq!(e.ty, CType::Int);

        assert!(type_error("int x; return (+x = 7);").contains("not assignable"));
        assert!(type_error("int x; int *p = &+x; return 0;").contains("address of an rvalue"));
        assert!(type_error("int *p; return +p;").contains("unary '+'"));
    }

    #[test]
    fn test_variable_hides_function_in_calls() {
        let source = "int g() { return 9; } int f() { int g = 1; return g(); }";
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();
        match resolve(&program) {
            Err(SemaError::Type(e)) => assert!(e.message.contains("not a function"), "{}", e),
            other => panic!("Expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_null_pointer_constant() {
        let e = returned("int *p = 0; return p == 0;").unwrap();
        match e.kind {
            ExprKind::Binary { rhs, .. } => assert!(matches!(rhs.kind, ExprKind::Null)),
            other => panic!("Expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_undefined_names() {
        assert!(matches!(returned("return y;"), Err(SemaError::Name(_))));
        assert!(matches!(returned("return g(1);"), Err(SemaError::Name(_))));
    }

    #[test]
    fn test_block_scoped_name_is_gone_after_block() {
        assert!(matches!(
            returned("{ int inner = 1; } return inner;"),
            Err(SemaError::Name(_))
        ));
    }
}
