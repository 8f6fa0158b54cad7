//! Expression evaluation implementation
//!
//! Two entry points walk the typed tree:
//!
//! - [`Interpreter::evaluate`] computes an rvalue
//! - [`Interpreter::address_of`] computes the address an lvalue designates
//!
//! Variables, dereferences and member accesses are the lvalue forms. Their
//! rvalue is a load from their address; struct-typed lvalues load as
//! [`Value::Aggregate`] so assignment can copy them.
//!
//! Operands are evaluated left to right. Operator details live in `ops/`.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{Address, Value};
use crate::parser::ast::SourceLocation;
use crate::sema::typed::{Callee, Expr, ExprKind, VarRef};

impl Interpreter {
    /// Evaluate an expression and return its value
    pub(crate) fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        let location = expr.location;

        match &expr.kind {
            ExprKind::Num(n) => Ok(Value::Int(*n)),

            ExprKind::Null => Ok(Value::Null),

            ExprKind::Var(_) | ExprKind::Deref(_) | ExprKind::Member { .. } => {
                let address = self.address_of(expr)?;
                self.load(address, &expr.ty, location)
            }

            // `&*e` is the value of `e`; nothing is dereferenced
            ExprKind::AddrOf(inner) => match &inner.kind {
                ExprKind::Deref(pointer) => self.evaluate(pointer),
                _ => Ok(Value::Pointer(self.address_of(inner)?)),
            },

            ExprKind::Decay(inner) => Ok(Value::Pointer(self.address_of(inner)?)),

            ExprKind::Plus(operand) => self.evaluate_int(operand).map(Value::Int),

            ExprKind::Neg(operand) => {
                let n = self.evaluate_int(operand)?;
                n.checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| RuntimeError::overflow("negation", location))
            }

            ExprKind::Not(operand) => {
                let value = self.evaluate(operand)?;
                Ok(Value::Int(!value.is_truthy() as i32))
            }

            ExprKind::Binary { op, lhs, rhs } => {
                let l = self.evaluate(lhs)?;
                let r = self.evaluate(rhs)?;
                self.binary_op(*op, l, r, location)
            }

            ExprKind::PtrOffset {
                ptr,
                index,
                scale,
                negate,
            } => {
                let base = self.evaluate(ptr)?;
                let index = self.evaluate_int(index)?;
                let index = if *negate {
                    -(index as i64)
                } else {
                    index as i64
                };
                self.offset_pointer(base, index, *scale, location)
            }

            ExprKind::PtrDiff { lhs, rhs, scale } => {
                let l = self.evaluate(lhs)?;
                let r = self.evaluate(rhs)?;
                self.pointer_difference(l, r, *scale, location)
            }

            // Short-circuit: the right operand runs only when needed
            ExprKind::LogicalAnd(lhs, rhs) => {
                if !self.evaluate(lhs)?.is_truthy() {
                    return Ok(Value::Int(0));
                }
                Ok(Value::Int(self.evaluate(rhs)?.is_truthy() as i32))
            }

            ExprKind::LogicalOr(lhs, rhs) => {
                if self.evaluate(lhs)?.is_truthy() {
                    return Ok(Value::Int(1));
                }
                Ok(Value::Int(self.evaluate(rhs)?.is_truthy() as i32))
            }

            ExprKind::Assign { target, value } => self.assign(target, value),

            ExprKind::CompoundAssign {
                op,
                target,
                value,
                scale,
            } => self.compound_assign(*op, target, value, *scale, location),

            ExprKind::IncDec {
                target,
                prefix,
                delta,
                scale,
            } => self.increment(target, *prefix, *delta, *scale, location),

            ExprKind::Comma(lhs, rhs) => {
                self.evaluate(lhs)?;
                self.evaluate(rhs)
            }

            ExprKind::Call { callee, args, .. } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate(arg)?);
                }
                match callee {
                    Callee::Function(index) => self.invoke(*index, values, location),
                    Callee::Builtin(builtin) => self.call_builtin(*builtin, &values, location),
                }
            }
        }
    }

    /// Evaluate an expression resolved as an integer
    pub(crate) fn evaluate_int(&mut self, expr: &Expr) -> Result<i32, RuntimeError> {
        let value = self.evaluate(expr)?;
        value.as_int().ok_or_else(|| RuntimeError::InvalidPointer {
            message: format!("expected an integer, got {}", value),
            location: expr.location,
        })
    }

    /// Compute the address an lvalue designates
    pub(crate) fn address_of(&mut self, expr: &Expr) -> Result<Address, RuntimeError> {
        let location = expr.location;

        match &expr.kind {
            ExprKind::Var(VarRef::Local { offset }) => self.local_address(*offset),
            ExprKind::Var(VarRef::Global { offset }) => Ok(self.global_address(*offset)),
            ExprKind::Var(VarRef::Literal(id)) => Ok(self.literal_address(*id)),

            ExprKind::Deref(pointer) => {
                let value = self.evaluate(pointer)?;
                self.pointer_target(value, location)
            }

            // The base may be any struct-valued expression, e.g. `(a = b).x`
            ExprKind::Member { base, offset } => match self.evaluate(base)? {
                Value::Aggregate(address) => {
                    address.add(*offset as i64).ok_or_else(|| RuntimeError::InvalidPointer {
                        message: "member offset out of range".to_string(),
                        location,
                    })
                }
                other => Err(RuntimeError::InvalidPointer {
                    message: format!("member access on {}", other),
                    location,
                }),
            },

            _ => Err(RuntimeError::InvalidPointer {
                message: "expression does not designate an object".to_string(),
                location,
            }),
        }
    }

    /// The address a pointer value points to
    pub(crate) fn pointer_target(
        &self,
        value: Value,
        location: SourceLocation,
    ) -> Result<Address, RuntimeError> {
        match value {
            Value::Pointer(address) => Ok(address),
            Value::Null => Err(RuntimeError::NullDereference { location }),
            other => Err(RuntimeError::InvalidPointer {
                message: format!("dereference of {}", other),
                location,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::constants::DEFAULT_MEMORY_LIMIT;
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::memory::Value;
    use crate::parser::Parser;
    use crate::sema::resolve;

    fn eval_body(body: &str) -> Result<Value, RuntimeError> {
        let source = format!("int f() {{ {} }}", body);
        let mut parser = Parser::new(&source).unwrap();
        let ast = parser.parse_program().unwrap();
        let program = resolve(&ast).unwrap();
        let mut interp = Interpreter::new(program, DEFAULT_MEMORY_LIMIT).unwrap();
        interp.call("f", &[])
    }

    fn eval_int(body: &str) -> i32 {
        eval_body(body).unwrap().as_int().unwrap()
    }

    #[test]
    fn test_address_of_deref_does_not_dereference() {
        assert_eq!(eval_int("int *p = 0; return &*p == p;"), 1);
        assert_eq!(eval_int("int a[3]; int *p = a + 2; return &*p - a;"), 2);
        assert_eq!(eval_int("int a[2]; return &*a == &a[0];"), 1);
    }

    #[test]
    fn test_short_circuit_skips_side_effects() {
        assert_eq!(eval_int("int x = 0; 0 && (x = 1); return x;"), 0);
        assert_eq!(eval_int("int x = 0; 1 || (x = 1); return x;"), 0);
        assert_eq!(eval_int("return 2 && 3;"), 1);
        assert_eq!(eval_int("return 0 || -5;"), 1);
    }

    #[test]
    fn test_comma_yields_right_operand() {
        assert_eq!(eval_int("return 1, 2, 3;"), 3);
    }

    #[test]
    fn test_sizeof_does_not_evaluate() {
        assert_eq!(eval_int("int x = 1; sizeof(x = 2); return x;"), 1);
    }

    #[test]
    fn test_member_of_assignment_result() {
        assert_eq!(
            eval_int("struct { int a; int b; } x, y; y.a = 1; y.b = 2; return (x = y).b;"),
            2
        );
    }

    #[test]
    fn test_null_dereference() {
        assert!(matches!(
            eval_body("int *p = 0; return *p;"),
            Err(RuntimeError::NullDereference { .. })
        ));
    }

    #[test]
    fn test_uninitialized_local_read() {
        assert!(matches!(
            eval_body("int x; return x;"),
            Err(RuntimeError::UninitializedRead { .. })
        ));
    }

    #[test]
    fn test_negation_overflow() {
        assert!(matches!(
            eval_body("int x = -2147483647; x = x - 1; return -x;"),
            Err(RuntimeError::IntegerOverflow { .. })
        ));
    }
}
