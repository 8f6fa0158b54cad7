//! Binary operator evaluation
//!
//! Integer arithmetic is 32-bit and checked: overflow, division by zero and
//! modulo by zero are runtime errors. Division truncates toward zero and `%`
//! takes the sign of the dividend, as in C.
//!
//! Pointer arithmetic arrives pre-scaled from resolution, so these helpers
//! only move byte offsets within a block.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::Value;
use crate::parser::ast::{BinOp, SourceLocation};

impl Interpreter {
    /// Arithmetic on integers, or a comparison of integers or pointers
    pub(crate) fn binary_op(
        &self,
        op: BinOp,
        left: Value,
        right: Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match (left, right) {
            (Value::Int(a), Value::Int(b)) => integer_op(op, a, b, location).map(Value::Int),
            (l, r) if l.is_pointer() && r.is_pointer() => {
                self.compare_pointers(op, l, r, location).map(|b| Value::Int(b as i32))
            }
            (l, r) => Err(RuntimeError::InvalidPointer {
                message: format!("invalid operands {} {} {}", l, op.symbol(), r),
                location,
            }),
        }
    }

    /// Pointer comparison. Equality works across objects and with null;
    /// ordering needs both pointers in the same object.
    fn compare_pointers(
        &self,
        op: BinOp,
        left: Value,
        right: Value,
        location: SourceLocation,
    ) -> Result<bool, RuntimeError> {
        let (l, r) = (left.as_pointer().flatten(), right.as_pointer().flatten());

        match op {
            BinOp::Eq => return Ok(l == r),
            BinOp::Ne => return Ok(l != r),
            _ => {}
        }

        let (a, b) = match (l, r) {
            (Some(a), Some(b)) if a.block == b.block => (a.offset, b.offset),
            (None, None) => (0, 0),
            _ => {
                return Err(RuntimeError::PointerMismatch {
                    operation: format!("'{}'", op.symbol()),
                    location,
                });
            }
        };

        match op {
            BinOp::Lt => Ok(a < b),
            BinOp::Le => Ok(a <= b),
            BinOp::Gt => Ok(a > b),
            BinOp::Ge => Ok(a >= b),
            _ => Err(RuntimeError::InvalidPointer {
                message: format!("operator '{}' applied to pointers", op.symbol()),
                location,
            }),
        }
    }

    /// `pointer + index * scale`
    pub(crate) fn offset_pointer(
        &self,
        pointer: Value,
        index: i64,
        scale: usize,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let bytes = index
            .checked_mul(scale as i64)
            .ok_or_else(|| RuntimeError::overflow("pointer arithmetic", location))?;

        match pointer {
            Value::Pointer(address) => address
                .add(bytes)
                .map(Value::Pointer)
                .ok_or_else(|| RuntimeError::overflow("pointer arithmetic", location)),
            Value::Null if bytes == 0 => Ok(Value::Null),
            Value::Null => Err(RuntimeError::NullDereference { location }),
            other => Err(RuntimeError::InvalidPointer {
                message: format!("arithmetic on {}", other),
                location,
            }),
        }
    }

    /// Element distance between two pointers into the same object
    pub(crate) fn pointer_difference(
        &self,
        left: Value,
        right: Value,
        scale: usize,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let bytes = match (left.as_pointer().flatten(), right.as_pointer().flatten()) {
            (Some(a), Some(b)) if a.block == b.block => a.offset - b.offset,
            (None, None) => 0,
            _ => {
                return Err(RuntimeError::PointerMismatch {
                    operation: "subtraction".to_string(),
                    location,
                });
            }
        };
        let elements = bytes / scale.max(1) as i64;
        i32::try_from(elements)
            .map(Value::Int)
            .map_err(|_| RuntimeError::overflow("pointer subtraction", location))
    }
}

/// Checked 32-bit integer arithmetic and comparison
pub(crate) fn integer_op(
    op: BinOp,
    a: i32,
    b: i32,
    location: SourceLocation,
) -> Result<i32, RuntimeError> {
    let overflow = || RuntimeError::IntegerOverflow {
        operation: format!("{} {} {}", a, op.symbol(), b),
        location,
    };

    match op {
        BinOp::Add | BinOp::AddAssign => a.checked_add(b).ok_or_else(overflow),
        BinOp::Sub | BinOp::SubAssign => a.checked_sub(b).ok_or_else(overflow),
        BinOp::Mul | BinOp::MulAssign => a.checked_mul(b).ok_or_else(overflow),
        BinOp::Div | BinOp::DivAssign => {
            if b == 0 {
                return Err(RuntimeError::DivisionError {
                    operation: "Division by zero".to_string(),
                    location,
                });
            }
            a.checked_div(b).ok_or_else(overflow)
        }
        BinOp::Mod | BinOp::ModAssign => {
            if b == 0 {
                return Err(RuntimeError::DivisionError {
                    operation: "Modulo by zero".to_string(),
                    location,
                });
            }
            a.checked_rem(b).ok_or_else(overflow)
        }
        BinOp::Eq => Ok((a == b) as i32),
        BinOp::Ne => Ok((a != b) as i32),
        BinOp::Lt => Ok((a < b) as i32),
        BinOp::Le => Ok((a <= b) as i32),
        BinOp::Gt => Ok((a > b) as i32),
        BinOp::Ge => Ok((a >= b) as i32),
        // Short-circuit operators are lowered to their own nodes
        BinOp::And => Ok((a != 0 && b != 0) as i32),
        BinOp::Or => Ok((a != 0 || b != 0) as i32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    #[test]
    fn test_c_division_semantics() {
        assert_eq!(integer_op(BinOp::Div, -7, 2, loc()).unwrap(), -3);
        assert_eq!(integer_op(BinOp::Mod, -7, 2, loc()).unwrap(), -1);
        assert_eq!(integer_op(BinOp::Mod, 7, -2, loc()).unwrap(), 1);
    }

    #[test]
    fn test_division_errors() {
        assert!(matches!(
            integer_op(BinOp::Div, 1, 0, loc()),
            Err(RuntimeError::DivisionError { .. })
        ));
        assert!(matches!(
            integer_op(BinOp::Mod, 1, 0, loc()),
            Err(RuntimeError::DivisionError { .. })
        ));
        assert!(matches!(
            integer_op(BinOp::Div, i32::MIN, -1, loc()),
            Err(RuntimeError::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn test_overflow_message() {
        let err = integer_op(BinOp::Add, i32::MAX, 1, loc()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Integer overflow in 2147483647 + 1 at line 1"
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(integer_op(BinOp::Le, 1, 1, loc()).unwrap(), 1);
        assert_eq!(integer_op(BinOp::Gt, 1, 2, loc()).unwrap(), 0);
        assert_eq!(integer_op(BinOp::Ne, 0, 1, loc()).unwrap(), 1);
    }
}
