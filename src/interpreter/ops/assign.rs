//! Assignment and compound assignment
//!
//! The target's address is computed once, before the right-hand side.
//! Scalar assignment stores the value converted to the target type and yields
//! it; struct assignment copies the bytes (with their initialization state).

use crate::interpreter::engine::{convert, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::binary::integer_op;
use crate::memory::Value;
use crate::parser::ast::{BinOp, SourceLocation};
use crate::sema::typed::Expr;

impl Interpreter {
    pub(crate) fn assign(&mut self, target: &Expr, value: &Expr) -> Result<Value, RuntimeError> {
        let address = self.address_of(target)?;
        let value = self.evaluate(value)?;

        if target.ty.is_struct() {
            self.store(address, &target.ty, value, target.location)?;
            return Ok(Value::Aggregate(address));
        }

        let value = convert(&target.ty, value);
        self.store(address, &target.ty, value, target.location)?;
        Ok(value)
    }

    /// `target op= value`; pointer targets carry `scale` and only use `+=`/`-=`
    pub(crate) fn compound_assign(
        &mut self,
        op: BinOp,
        target: &Expr,
        value: &Expr,
        scale: Option<usize>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let address = self.address_of(target)?;
        let old = self.load(address, &target.ty, location)?;
        let rhs = self.evaluate_int(value)?;
        let op = op.arithmetic();

        let new = match scale {
            Some(scale) => {
                let index = match op {
                    BinOp::Sub => -(rhs as i64),
                    _ => rhs as i64,
                };
                self.offset_pointer(old, index, scale, location)?
            }
            None => {
                let lhs = old.as_int().ok_or_else(|| RuntimeError::InvalidPointer {
                    message: format!("compound assignment to {}", old),
                    location,
                })?;
                convert(&target.ty, Value::Int(integer_op(op, lhs, rhs, location)?))
            }
        };

        self.store(address, &target.ty, new, location)?;
        Ok(new)
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
    fn test_compound_assignment_yields_new_value() {
        assert_eq!(eval_int("int i = 2; return i += 5;"), 7);
        assert_eq!(eval_int("int i = 5; return i -= 2;"), 3);
        assert_eq!(eval_int("int i = 3; return i *= 2;"), 6);
        assert_eq!(eval_int("int i = 6; return i /= 2;"), 3);
        assert_eq!(eval_int("int i = 7; return i %= 4;"), 3);
    }

    #[test]
    fn test_pointer_compound_assignment() {
        assert_eq!(
            eval_int("int a[4]; a[3] = 9; int *p = a; p += 3; return *p;"),
            9
        );
        assert_eq!(
            eval_int("int a[4]; a[1] = 4; int *p = a + 3; p -= 2; return *p;"),
            4
        );
    }

    #[test]
    fn test_chained_assignment() {
        assert_eq!(eval_int("int a; int b; a = b = 3; return a + b;"), 6);
    }

    #[test]
    fn test_char_assignment_truncates() {
        assert_eq!(eval_int("char c; return c = 300;"), 44);
    }

    #[test]
    fn test_struct_copy() {
        assert_eq!(
            eval_int(
                "struct { int a; char b; } x, y; x.a = 3; x.b = 4; y = x; x.a = 0; return y.a + y.b;"
            ),
            7
        );
    }

    #[test]
    fn test_division_by_zero_in_compound_assignment() {
        assert!(matches!(
            eval_body("int i = 1; int z = 0; i /= z; return i;"),
            Err(RuntimeError::DivisionError { .. })
        ));
    }

    #[test]
    fn test_write_to_string_literal() {
        assert!(matches!(
            eval_body("char *s = \"abc\"; *s = 'x'; return 0;"),
            Err(RuntimeError::ReadOnlyWrite { .. })
        ));
    }
}
