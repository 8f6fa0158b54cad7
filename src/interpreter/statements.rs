//! Statement execution implementation
//!
//! This module handles the execution of all statement types, including:
//!
//! - Expression statements (declarations arrive here as assignments)
//! - Control flow (if/else, while, for)
//! - Returns and blocks
//!
//! # Control Flow
//!
//! Every statement yields a [`ControlFlow`]; `Return` unwinds through
//! enclosing blocks and loops to the call in `engine.rs`. Scoping was
//! settled during resolution, so blocks need no runtime bookkeeping.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::Value;
use crate::sema::typed::Stmt;

impl Interpreter {
    pub(crate) fn execute_statements(
        &mut self,
        stmts: &[Stmt],
    ) -> Result<ControlFlow, RuntimeError> {
        for stmt in stmts {
            if let ControlFlow::Return(value) = self.execute_statement(stmt)? {
                return Ok(ControlFlow::Return(value));
            }
        }
        Ok(ControlFlow::Normal)
    }

    pub(crate) fn execute_statement(&mut self, stmt: &Stmt) -> Result<ControlFlow, RuntimeError> {
        match stmt {
            Stmt::Expr(expr) => {
                self.current_location = expr.location;
                let value = self.evaluate(expr)?;
                if let Some(frame) = self.frames.last_mut() {
                    frame.last_value = value;
                }
                Ok(ControlFlow::Normal)
            }

            Stmt::Return { value, location } => {
                self.current_location = *location;
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Int(0),
                };
                Ok(ControlFlow::Return(value))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.current_location = condition.location;
                if self.evaluate(condition)?.is_truthy() {
                    self.execute_statements(then_branch)
                } else {
                    self.execute_statements(else_branch)
                }
            }

            Stmt::While { condition, body } => {
                loop {
                    self.current_location = condition.location;
                    if !self.evaluate(condition)?.is_truthy() {
                        break;
                    }
                    if let ControlFlow::Return(value) = self.execute_statements(body)? {
                        return Ok(ControlFlow::Return(value));
                    }
                }
                Ok(ControlFlow::Normal)
            }

            Stmt::For {
                init,
                condition,
                increment,
                body,
            } => {
                if let ControlFlow::Return(value) = self.execute_statements(init)? {
                    return Ok(ControlFlow::Return(value));
                }
                loop {
                    if let Some(condition) = condition {
                        self.current_location = condition.location;
                        if !self.evaluate(condition)?.is_truthy() {
                            break;
                        }
                    }
                    if let ControlFlow::Return(value) = self.execute_statements(body)? {
                        return Ok(ControlFlow::Return(value));
                    }
                    if let Some(increment) = increment {
                        self.current_location = increment.location;
                        self.evaluate(increment)?;
                    }
                }
                Ok(ControlFlow::Normal)
            }

            Stmt::Block(stmts) => self.execute_statements(stmts),
        }
    }
}
