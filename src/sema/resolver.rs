//! Type & layout resolver
//!
//! [`Resolver`] walks the parsed [`ast::Program`] and produces a typed
//! [`Program`]. Resolution runs in two passes:
//!
//! 1. File scope, in source order: struct definitions, global variables and
//!    function signatures (definitions and prototypes).
//! 2. Function bodies, in source order. Every function signature and global
//!    is visible to every body, so calls may precede definitions.
//!
//! Frame layout: every local of a function, parameters first, receives its
//! own slot in declaration order, aligned to the local's alignment. Slots of
//! sibling blocks are never reused.
//!
//! Expression and statement resolution live in `expressions.rs` and
//! `statements.rs` as further `impl Resolver` blocks.

use super::errors::{NameError, SemaError, TypeError};
use super::scope::{ScopeManager, Storage};
use super::typed::{
    Builtin, Expr, ExprKind, Function, GlobalInit, GlobalVar, LocalSlot, Program, Stmt, VarRef,
};
use super::types::{align_to, CType, StructLayout};
use crate::interpreter::constants::WORD_SIZE;
use crate::parser::ast::{self, AstNode, BaseType, Derived, SourceLocation};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// A function's type as seen by callers
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Signature {
    pub return_type: CType,
    pub params: Vec<CType>,
    pub location: SourceLocation,
}

/// Frame being laid out for the function currently resolved
#[derive(Debug)]
pub(crate) struct FrameLayout {
    pub size: usize,
    pub locals: Vec<LocalSlot>,
    pub return_type: CType,
}

/// Resolves a parsed program into a typed one
pub struct Resolver {
    pub(crate) scopes: ScopeManager,
    pub(crate) signatures: FxHashMap<String, Signature>,
    /// Names of functions that have a body, with their index in `functions`
    pub(crate) defined: FxHashMap<String, usize>,
    pub(crate) frame: Option<FrameLayout>,
    pub(crate) globals: Vec<GlobalVar>,
    pub(crate) globals_size: usize,
    pub(crate) literals: Vec<Vec<u8>>,
    next_struct_id: usize,
}

/// Resolve a parsed program
pub fn resolve(program: &ast::Program) -> Result<Program, SemaError> {
    Resolver::new().resolve_program(program)
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Resolver {
            scopes: ScopeManager::new(),
            signatures: FxHashMap::default(),
            defined: FxHashMap::default(),
            frame: None,
            globals: Vec::new(),
            globals_size: 0,
            literals: Vec::new(),
            next_struct_id: 0,
        }
    }

    pub fn resolve_program(mut self, program: &ast::Program) -> Result<Program, SemaError> {
        // Pass 1: file scope
        for node in &program.nodes {
            match node {
                AstNode::Declaration {
                    base, declarators, ..
                } => self.resolve_global_declaration(base, declarators)?,
                AstNode::FunctionDef {
                    name,
                    params,
                    return_type,
                    location,
                    ..
                } => {
                    self.declare_function(name, params, return_type, *location)?;
                    if self.defined.contains_key(name) {
                        return Err(NameError::redeclared("function", name, *location).into());
                    }
                    let index = self.defined.len();
                    self.defined.insert(name.clone(), index);
                }
                AstNode::FunctionDecl {
                    name,
                    params,
                    return_type,
                    location,
                } => self.declare_function(name, params, return_type, *location)?,
                other => {
                    return Err(TypeError::new(
                        "Expected a declaration or function definition at file scope",
                        *other.location(),
                    )
                    .into());
                }
            }
        }

        // Pass 2: function bodies
        let mut functions = Vec::with_capacity(self.defined.len());
        for node in &program.nodes {
            if let AstNode::FunctionDef {
                name,
                params,
                body,
                location,
                ..
            } = node
            {
                functions.push(self.resolve_function(name, params, body, *location)?);
            }
        }

        Ok(Program {
            functions,
            function_index: self.defined,
            globals: self.globals,
            globals_size: align_to(self.globals_size, WORD_SIZE),
            literals: self.literals,
        })
    }

    // ===== Types =====

    /// Resolve a base type; struct definitions register their tag in the
    /// innermost scope
    pub(crate) fn resolve_base(&mut self, base: &BaseType) -> Result<CType, SemaError> {
        match base {
            BaseType::Int => Ok(CType::Int),
            BaseType::Char => Ok(CType::Char),
            BaseType::Void => Ok(CType::Void),
            BaseType::Struct(spec) => self.resolve_struct(spec),
        }
    }

    fn resolve_struct(&mut self, spec: &ast::StructSpec) -> Result<CType, SemaError> {
        let Some(fields) = &spec.fields else {
            // Reference to an existing tag
            let tag = spec.tag.as_deref().unwrap_or_default();
            return Ok(CType::Struct(self.scopes.resolve_tag(tag, spec.location)?));
        };

        let mut resolved: Vec<(String, CType)> = Vec::with_capacity(fields.len());
        for field in fields {
            if resolved.iter().any(|(name, _)| name == &field.name) {
                return Err(TypeError::new(
                    format!("Duplicate member '{}' in struct", field.name),
                    spec.location,
                )
                .into());
            }
            let ty = self.resolve_type(&field.field_type, spec.location)?;
            self.require_object_type(&ty, &field.name, spec.location)?;
            resolved.push((field.name.clone(), ty));
        }

        let id = self.next_struct_id;
        self.next_struct_id += 1;
        let layout = Rc::new(StructLayout::compute(id, spec.tag.clone(), resolved));

        if let Some(tag) = &spec.tag {
            self.scopes.declare_tag(tag, layout.clone(), spec.location)?;
        }

        Ok(CType::Struct(layout))
    }

    /// Resolve a full written type
    pub(crate) fn resolve_type(
        &mut self,
        ty: &ast::Type,
        location: SourceLocation,
    ) -> Result<CType, SemaError> {
        let base = self.resolve_base(&ty.base)?;
        apply_derived(base, &ty.derived, location)
    }

    /// Objects (variables, fields) cannot have type `void`
    pub(crate) fn require_object_type(
        &self,
        ty: &CType,
        name: &str,
        location: SourceLocation,
    ) -> Result<(), TypeError> {
        if *ty == CType::Void {
            return Err(TypeError::new(
                format!("'{}' declared with type void", name),
                location,
            ));
        }
        Ok(())
    }

    // ===== File scope =====

    fn resolve_global_declaration(
        &mut self,
        base: &BaseType,
        declarators: &[ast::Declarator],
    ) -> Result<(), SemaError> {
        let base = self.resolve_base(base)?;

        for decl in declarators {
            let ty = apply_derived(base.clone(), &decl.derived, decl.location)?;
            self.require_object_type(&ty, &decl.name, decl.location)?;

            if self.signatures.contains_key(&decl.name) {
                return Err(NameError::redeclared("symbol", &decl.name, decl.location).into());
            }

            let offset = align_to(self.globals_size, ty.align());
            self.globals_size = offset + ty.size();
            self.scopes
                .declare(&decl.name, ty.clone(), Storage::Global { offset }, decl.location)?;

            let init = match &decl.init {
                Some(init) => Some(self.global_initializer(init, &ty)?),
                None => None,
            };

            self.globals.push(GlobalVar {
                name: decl.name.clone(),
                ty,
                offset,
                init,
            });
        }

        Ok(())
    }

    /// Global initializers are integer constant expressions, the null pointer
    /// constant, or a string literal for a `char *`
    fn global_initializer(&mut self, init: &AstNode, ty: &CType) -> Result<GlobalInit, SemaError> {
        let value = self.rvalue(init)?;
        let location = value.location;
        let value = self.coerce(value, ty, location)?;

        match (&value.kind, ty) {
            (ExprKind::Null, _) => Ok(GlobalInit::Int(0)),
            (ExprKind::Decay(inner), CType::Pointer(_)) => match inner.kind {
                ExprKind::Var(VarRef::Literal(id)) => Ok(GlobalInit::Literal(id)),
                _ => Err(not_constant(location)),
            },
            (_, CType::Int | CType::Char) => {
                const_eval(&value).map(GlobalInit::Int).ok_or_else(|| not_constant(location))
            }
            _ => Err(not_constant(location)),
        }
    }

    fn declare_function(
        &mut self,
        name: &str,
        params: &[ast::Param],
        return_type: &ast::Type,
        location: SourceLocation,
    ) -> Result<(), SemaError> {
        if self.scopes.declared_here(name) {
            return Err(NameError::redeclared("symbol", name, location).into());
        }

        let return_type = self.resolve_type(return_type, location)?;
        if return_type.is_struct() || return_type.is_array() {
            return Err(TypeError::new(
                format!("Function '{}' cannot return {} by value", name, return_type),
                location,
            )
            .into());
        }

        let mut param_types = Vec::with_capacity(params.len());
        for param in params {
            param_types.push(self.resolve_param_type(param)?);
        }

        let signature = Signature {
            return_type,
            params: param_types,
            location,
        };

        if let Some(existing) = self.signatures.get(name) {
            if existing.return_type != signature.return_type || existing.params != signature.params
            {
                return Err(TypeError::new(
                    format!("Conflicting types for function '{}'", name),
                    location,
                )
                .into());
            }
            return Ok(());
        }

        self.signatures.insert(name.to_string(), signature);
        Ok(())
    }

    /// Parameter types: arrays adjust to pointers, structs are rejected
    pub(crate) fn resolve_param_type(&mut self, param: &ast::Param) -> Result<CType, SemaError> {
        let ty = self.resolve_type(&param.param_type, param.location)?;
        self.require_object_type(&ty, &param.name, param.location)?;
        if ty.is_struct() {
            return Err(TypeError::new(
                format!("Parameter '{}' cannot pass a struct by value", param.name),
                param.location,
            )
            .into());
        }
        Ok(ty.decay())
    }

    // ===== Function bodies =====

    fn resolve_function(
        &mut self,
        name: &str,
        params: &[ast::Param],
        body: &[AstNode],
        location: SourceLocation,
    ) -> Result<Function, SemaError> {
        let return_type = self
            .signatures
            .get(name)
            .map(|sig| sig.return_type.clone())
            .ok_or_else(|| NameError::undefined("function", name, location))?;

        self.frame = Some(FrameLayout {
            size: 0,
            locals: Vec::new(),
            return_type: return_type.clone(),
        });
        self.scopes.enter_scope();
        let result = self.resolve_params_and_body(params, body);
        self.scopes.exit_scope();

        let frame = self.frame.take();
        let (param_slots, body) = result?;
        let frame = frame.ok_or_else(|| TypeError::new("Missing frame layout", location))?;

        Ok(Function {
            name: name.to_string(),
            return_type,
            params: param_slots,
            locals: frame.locals,
            body,
            frame_size: align_to(frame.size, WORD_SIZE),
            location,
        })
    }

    /// Parameters share the outermost scope with the body's own declarations
    fn resolve_params_and_body(
        &mut self,
        params: &[ast::Param],
        body: &[AstNode],
    ) -> Result<(Vec<LocalSlot>, Vec<Stmt>), SemaError> {
        let mut param_slots = Vec::with_capacity(params.len());
        for param in params {
            let ty = self.resolve_param_type(param)?;
            param_slots.push(self.declare_local(&param.name, ty, param.location)?);
        }
        let body = self.resolve_statements(body)?;
        Ok((param_slots, body))
    }

    /// Give a local the next aligned frame slot and declare it
    pub(crate) fn declare_local(
        &mut self,
        name: &str,
        ty: CType,
        location: SourceLocation,
    ) -> Result<LocalSlot, SemaError> {
        if self.scopes.declared_here(name) {
            return Err(NameError::redeclared("variable", name, location).into());
        }

        let frame = self
            .frame
            .as_mut()
            .ok_or_else(|| TypeError::new("Local declaration outside a function", location))?;

        let offset = align_to(frame.size, ty.align());
        frame.size = offset + ty.size();

        let var = self
            .scopes
            .declare(name, ty.clone(), Storage::Local { offset }, location)?;
        let slot = LocalSlot {
            name: name.to_string(),
            ty,
            offset,
            depth: var.depth,
        };

        if let Some(frame) = self.frame.as_mut() {
            frame.locals.push(slot.clone());
        }
        Ok(slot)
    }

    /// Store a string literal and return an lvalue naming it
    pub(crate) fn intern_literal(&mut self, bytes: &[u8], location: SourceLocation) -> Expr {
        let mut data = bytes.to_vec();
        data.push(0);
        let ty = CType::array_of(CType::Char, data.len());
        let id = self.literals.len();
        self.literals.push(data);
        Expr::new(ExprKind::Var(VarRef::Literal(id)), ty, location)
    }

    pub(crate) fn builtin(&self, name: &str) -> Option<Builtin> {
        if self.defined.contains_key(name) {
            None
        } else {
            Builtin::lookup(name)
        }
    }
}

/// Wrap `base` in declarator layers, innermost first
pub(crate) fn apply_derived(
    base: CType,
    derived: &[Derived],
    location: SourceLocation,
) -> Result<CType, SemaError> {
    let mut ty = base;
    for layer in derived {
        ty = match layer {
            Derived::Pointer => CType::pointer_to(ty),
            Derived::Array(len) => {
                if ty == CType::Void {
                    return Err(TypeError::new("Array of void is not allowed", location).into());
                }
                CType::array_of(ty, *len)
            }
        };
    }
    Ok(ty)
}

fn not_constant(location: SourceLocation) -> SemaError {
    TypeError::new("Global initializer must be a constant expression", location).into()
}

/// Evaluate an integer constant expression, if it is one
pub(crate) fn const_eval(expr: &Expr) -> Option<i32> {
    use crate::parser::ast::BinOp;

    match &expr.kind {
        ExprKind::Num(n) => Some(*n),
        ExprKind::Plus(e) => const_eval(e),
        ExprKind::Neg(e) => const_eval(e)?.checked_neg(),
        ExprKind::Not(e) => Some((const_eval(e)? == 0) as i32),
        ExprKind::LogicalAnd(l, r) => Some((const_eval(l)? != 0 && const_eval(r)? != 0) as i32),
        ExprKind::LogicalOr(l, r) => Some((const_eval(l)? != 0 || const_eval(r)? != 0) as i32),
        ExprKind::Binary { op, lhs, rhs } => {
            let (l, r) = (const_eval(lhs)?, const_eval(rhs)?);
            match op {
                BinOp::Add => l.checked_add(r),
                BinOp::Sub => l.checked_sub(r),
                BinOp::Mul => l.checked_mul(r),
                BinOp::Div => l.checked_div(r),
                BinOp::Mod => l.checked_rem(r),
                BinOp::Eq => Some((l == r) as i32),
                BinOp::Ne => Some((l != r) as i32),
                BinOp::Lt => Some((l < r) as i32),
                BinOp::Le => Some((l <= r) as i32),
                BinOp::Gt => Some((l > r) as i32),
                BinOp::Ge => Some((l >= r) as i32),
                _ => None,
            }
        }
        _ => None,
    }
}
