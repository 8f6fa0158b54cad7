//! Statement resolution
//!
//! Lowers statements into [`Stmt`]s. Each block, loop body and branch opens a
//! scope; `for` opens one extra scope around its init clause so a declared
//! loop variable is visible to the condition, increment and body only.
//! Declarations are lowered to an assignment per initialized declarator.

use super::errors::{SemaError, TypeError};
use super::resolver::{apply_derived, Resolver};
use super::typed::{Expr, ExprKind, Stmt, VarRef};
use super::types::CType;
use crate::parser::ast::{self, AstNode, BaseType};

impl Resolver {
    /// Resolve a statement list in the current scope
    pub(crate) fn resolve_statements(&mut self, nodes: &[AstNode]) -> Result<Vec<Stmt>, SemaError> {
        let mut stmts = Vec::with_capacity(nodes.len());
        for node in nodes {
            self.resolve_statement(node, &mut stmts)?;
        }
        Ok(stmts)
    }

    /// Resolve a statement list inside a fresh scope
    pub(crate) fn resolve_scoped(&mut self, nodes: &[AstNode]) -> Result<Vec<Stmt>, SemaError> {
        self.scopes.enter_scope();
        let result = self.resolve_statements(nodes);
        self.scopes.exit_scope();
        result
    }

    /// Resolve one statement, appending its lowering to `out`
    fn resolve_statement(&mut self, node: &AstNode, out: &mut Vec<Stmt>) -> Result<(), SemaError> {
        match node {
            AstNode::Declaration {
                base, declarators, ..
            } => self.resolve_local_declaration(base, declarators, out),

            AstNode::ExpressionStatement { expr, .. } => {
                out.push(Stmt::Expr(self.rvalue(expr)?));
                Ok(())
            }

            AstNode::Return { expr, location } => {
                let return_type = self
                    .frame
                    .as_ref()
                    .map(|f| f.return_type.clone())
                    .unwrap_or(CType::Int);

                let value = match expr {
                    Some(expr) => {
                        let value = self.rvalue(expr)?;
                        if return_type == CType::Void {
                            if value.ty != CType::Void {
                                return Err(TypeError::new(
                                    "Void function should not return a value",
                                    *location,
                                )
                                .into());
                            }
                            Some(value)
                        } else {
                            Some(self.coerce(value, &return_type, *location)?)
                        }
                    }
                    None => None,
                };

                out.push(Stmt::Return {
                    value,
                    location: *location,
                });
                Ok(())
            }

            AstNode::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let condition = self.condition(condition)?;
                let then_branch = self.resolve_scoped(then_branch)?;
                let else_branch = match else_branch {
                    Some(branch) => self.resolve_scoped(branch)?,
                    None => Vec::new(),
                };
                out.push(Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                });
                Ok(())
            }

            AstNode::While {
                condition, body, ..
            } => {
                let condition = self.condition(condition)?;
                let body = self.resolve_scoped(body)?;
                out.push(Stmt::While { condition, body });
                Ok(())
            }

            AstNode::For {
                init,
                condition,
                increment,
                body,
                ..
            } => {
                self.scopes.enter_scope();
                let result = self.resolve_for(
                    init.as_deref(),
                    condition.as_deref(),
                    increment.as_deref(),
                    body,
                );
                self.scopes.exit_scope();
                out.push(result?);
                Ok(())
            }

            AstNode::Block { statements, .. } => {
                out.push(Stmt::Block(self.resolve_scoped(statements)?));
                Ok(())
            }

            other => Err(TypeError::new(
                "Function definitions are only allowed at file scope",
                *other.location(),
            )
            .into()),
        }
    }

    fn resolve_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        increment: Option<&AstNode>,
        body: &[AstNode],
    ) -> Result<Stmt, SemaError> {
        let mut init_stmts = Vec::new();
        if let Some(init) = init {
            self.resolve_statement(init, &mut init_stmts)?;
        }

        let condition = match condition {
            Some(c) => Some(self.condition(c)?),
            None => None,
        };
        let increment = match increment {
            Some(i) => Some(self.rvalue(i)?),
            None => None,
        };
        let body = self.resolve_scoped(body)?;

        Ok(Stmt::For {
            init: init_stmts,
            condition,
            increment,
            body,
        })
    }

    /// Declare each local, then lower initializers to assignments.
    ///
    /// A declarator is in scope from the end of its own declarator, so
    /// `int x = 3, y = x;` sees the new `x`.
    fn resolve_local_declaration(
        &mut self,
        base: &BaseType,
        declarators: &[ast::Declarator],
        out: &mut Vec<Stmt>,
    ) -> Result<(), SemaError> {
        let base = self.resolve_base(base)?;

        for decl in declarators {
            let ty = apply_derived(base.clone(), &decl.derived, decl.location)?;
            self.require_object_type(&ty, &decl.name, decl.location)?;
            let slot = self.declare_local(&decl.name, ty.clone(), decl.location)?;

            let Some(init) = &decl.init else {
                continue;
            };

            if ty.is_array() {
                return Err(TypeError::new(
                    format!("Array '{}' cannot be initialized from an expression", decl.name),
                    decl.location,
                )
                .into());
            }

            let value = self.rvalue(init)?;
            let location = value.location;
            let value = self.coerce(value, &ty, location)?;
            let target = Expr::new(
                ExprKind::Var(VarRef::Local {
                    offset: slot.offset,
                }),
                ty.clone(),
                decl.location,
            );
            out.push(Stmt::Expr(Expr::new(
                ExprKind::Assign {
                    target: Box::new(target),
                    value: Box::new(value),
                },
                ty,
                decl.location,
            )));
        }

        Ok(())
    }
}
