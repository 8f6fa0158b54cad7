//! Increment and decrement
//!
//! `++`/`--` evaluate the target's address once, then read-modify-write.
//! Prefix forms yield the new value, postfix forms the old one. Pointer
//! targets move by `delta * scale` bytes.
//!
//! In `(*p++)--` the inner postfix runs first while computing the outer
//! target's address: `*p` is addressed through the old `p`, `p` advances, and
//! the cell found through the old `p` is then decremented.

use crate::interpreter::engine::{convert, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::Value;
use crate::parser::ast::SourceLocation;
use crate::sema::typed::Expr;

impl Interpreter {
    pub(crate) fn increment(
        &mut self,
        target: &Expr,
        prefix: bool,
        delta: i32,
        scale: usize,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let address = self.address_of(target)?;
        let old = self.load(address, &target.ty, location)?;

        let new = if target.ty.is_pointer() {
            self.offset_pointer(old, delta as i64, scale, location)?
        } else {
            let n = old.as_int().ok_or_else(|| RuntimeError::InvalidPointer {
                message: format!("increment of {}", old),
                location,
            })?;
            let operation = if delta > 0 { "increment" } else { "decrement" };
            let sum = n
                .checked_add(delta)
                .ok_or_else(|| RuntimeError::overflow(operation, location))?;
            convert(&target.ty, Value::Int(sum))
        };

        self.store(address, &target.ty, new, location)?;
        Ok(if prefix { new } else { old })
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::constants::DEFAULT_MEMORY_LIMIT;
    use crate::interpreter::engine::Interpreter;
    use crate::parser::Parser;
    use crate::sema::resolve;

    fn eval_int(body: &str) -> i32 {
        let source = format!("int f() {{ {} }}", body);
        let mut parser = Parser::new(&source).unwrap();
        let ast = parser.parse_program().unwrap();
        let program = resolve(&ast).unwrap();
        let mut interp = Interpreter::new(program, DEFAULT_MEMORY_LIMIT).unwrap();
        interp.call("f", &[]).unwrap().as_int().unwrap()
    }

    const ARRAY: &str = "int a[3]; a[0] = 0; a[1] = 1; a[2] = 2; int *p = a + 1;";

    #[test]
    fn test_prefix_and_postfix_values() {
        assert_eq!(eval_int("int i = 2; return i++;"), 2);
        assert_eq!(eval_int("int i = 2; i++; return i;"), 3);
        assert_eq!(eval_int("int i = 2; return ++i;"), 3);
        assert_eq!(eval_int("int i = 2; return --i;"), 1);
        assert_eq!(eval_int("int i = 2; return i--;"), 2);
    }

    #[test]
    fn test_pointer_increment_is_scaled() {
        assert_eq!(eval_int(&format!("{} return *p++;", ARRAY)), 1);
        assert_eq!(eval_int(&format!("{} return *p--;", ARRAY)), 1);
        assert_eq!(eval_int(&format!("{} *p++; return *p;", ARRAY)), 2);
        assert_eq!(eval_int(&format!("{} return *++p;", ARRAY)), 2);
        assert_eq!(eval_int(&format!("{} return *--p;", ARRAY)), 0);
    }

    #[test]
    fn test_postfix_on_dereferenced_postfix() {
        assert_eq!(eval_int(&format!("{} (*p++)--; return a[1];", ARRAY)), 0);
        assert_eq!(eval_int(&format!("{} (*p++)--; return *p;", ARRAY)), 2);
        assert_eq!(eval_int(&format!("{} (*(p--))--; return a[1];", ARRAY)), 0);
        assert_eq!(eval_int(&format!("{} (*(p--))--; return *p;", ARRAY)), 0);
        assert_eq!(eval_int(&format!("{} (*p)--; return a[1];", ARRAY)), 0);
        assert_eq!(eval_int(&format!("{} *p++ = 5; return a[1] + *p;", ARRAY)), 7);
    }

    #[test]
    fn test_char_increment_wraps_to_storage() {
        assert_eq!(eval_int("char c = 127; c++; return c;"), -128);
    }
}
