//! Built-in function implementations
//!
//! Functions handled by the interpreter rather than defined in user code.
//! Argument types were checked during resolution.
//!
//! # Supported Built-ins
//!
//! - `printf(format, ...)`: formatted output to the [`Console`](crate::console::Console);
//!   supports `%d`, `%c`, `%s` and `%%`, returns the number of bytes written
//! - `assert(expected, actual[, text])` / `ASSERT(expected, actual)`: aborts
//!   the run with [`RuntimeError::AssertionFailed`] on mismatch; with `text`,
//!   success prints `text => actual`

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::Value;
use crate::parser::ast::SourceLocation;
use crate::sema::typed::Builtin;

impl Interpreter {
    pub(crate) fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: &[Value],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match builtin {
            Builtin::Printf => self.builtin_printf(args, location),
            Builtin::Assert => self.builtin_assert(args, location),
        }
    }

    fn builtin_printf(
        &mut self,
        args: &[Value],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let Some((format, rest)) = args.split_first() else {
            return Err(RuntimeError::InvalidPrintfFormat {
                message: "printf requires at least one argument".to_string(),
                location,
            });
        };

        let format = self.string_argument(*format, location)?;
        let output = self.format_printf(&format, rest, location)?;
        let written = output.len();

        self.console.print(&output, self.current_location);

        Ok(Value::Int(i32::try_from(written).unwrap_or(i32::MAX)))
    }

    fn format_printf(
        &self,
        format: &[u8],
        args: &[Value],
        location: SourceLocation,
    ) -> Result<Vec<u8>, RuntimeError> {
        let mut output = Vec::with_capacity(format.len());
        let mut bytes = format.iter().copied();
        let mut args = args.iter();

        let mut next_arg = |spec: char| {
            args.next().copied().ok_or_else(|| RuntimeError::InvalidPrintfFormat {
                message: format!("Not enough arguments for %{}", spec),
                location,
            })
        };

        while let Some(byte) = bytes.next() {
            if byte != b'%' {
                output.push(byte);
                continue;
            }

            match bytes.next() {
                Some(b'%') => output.push(b'%'),
                Some(b'd') => match next_arg('d')? {
                    Value::Int(n) => output.extend_from_slice(n.to_string().as_bytes()),
                    other => {
                        return Err(RuntimeError::InvalidPrintfFormat {
                            message: format!("%d expects int, got {}", other),
                            location,
                        });
                    }
                },
                Some(b'c') => match next_arg('c')? {
                    Value::Int(n) => output.push(n as u8),
                    other => {
                        return Err(RuntimeError::InvalidPrintfFormat {
                            message: format!("%c expects int, got {}", other),
                            location,
                        });
                    }
                },
                Some(b's') => {
                    let arg = next_arg('s')?;
                    output.extend_from_slice(&self.string_argument(arg, location)?);
                }
                Some(other) => {
                    return Err(RuntimeError::InvalidPrintfFormat {
                        message: format!("Unsupported format specifier %{}", other as char),
                        location,
                    });
                }
                None => {
                    return Err(RuntimeError::InvalidPrintfFormat {
                        message: "Format string ends with '%'".to_string(),
                        location,
                    });
                }
            }
        }

        Ok(output)
    }

    fn builtin_assert(
        &mut self,
        args: &[Value],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let (expected, actual) = match args {
            [Value::Int(e), Value::Int(a), ..] => (*e, *a),
            _ => {
                return Err(RuntimeError::InvalidPointer {
                    message: "assert expects two integers".to_string(),
                    location,
                });
            }
        };

        let text = match args.get(2) {
            Some(arg) => {
                let bytes = self.string_argument(*arg, location)?;
                Some(String::from_utf8_lossy(&bytes).into_owned())
            }
            None => None,
        };

        if expected != actual {
            return Err(RuntimeError::AssertionFailed {
                expected,
                actual,
                text,
                location,
            });
        }

        if let Some(text) = text {
            let line = format!("{} => {}\n", text, actual);
            self.console.print(line.as_bytes(), self.current_location);
        }
        Ok(Value::Int(0))
    }

    /// Bytes of the NUL-terminated string a `char *` argument points to
    fn string_argument(
        &self,
        value: Value,
        location: SourceLocation,
    ) -> Result<Vec<u8>, RuntimeError> {
        let address = self.pointer_target(value, location)?;
        self.read_c_string(address, location)
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::constants::DEFAULT_MEMORY_LIMIT;
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::parser::Parser;
    use crate::sema::resolve;

    fn interpreter(source: &str) -> Interpreter {
        let mut parser = Parser::new(source).unwrap();
        let ast = parser.parse_program().unwrap();
        let program = resolve(&ast).unwrap();
        Interpreter::new(program, DEFAULT_MEMORY_LIMIT).unwrap()
    }

    #[test]
    fn test_printf_formats() {
        let mut interp = interpreter(
            r#"int main() { char *s = "hi"; return printf("%d %c %s 100%%\n", -4, 'x', s); }"#,
        );
        assert_eq!(interp.run().unwrap(), 13);
        assert_eq!(interp.console().text(), "-4 x hi 100%\n");
    }

    #[test]
    fn test_printf_keeps_raw_bytes() {
        let mut interp = interpreter(r#"int main() { return printf("%c\xfe", 200); }"#);
        assert_eq!(interp.run().unwrap(), 2);
        assert_eq!(interp.console().bytes(), vec![200, 0xfe]);
    }

    #[test]
    fn test_printf_missing_argument() {
        let mut interp = interpreter(r#"int main() { printf("%d\n"); return 0; }"#);
        assert!(matches!(
            interp.run(),
            Err(RuntimeError::InvalidPrintfFormat { .. })
        ));
    }

    #[test]
    fn test_printf_unsupported_specifier() {
        let mut interp = interpreter(r#"int main() { printf("%f", 1); return 0; }"#);
        assert!(matches!(
            interp.run(),
            Err(RuntimeError::InvalidPrintfFormat { .. })
        ));
    }

    #[test]
    fn test_assert_success_and_failure() {
        let mut interp = interpreter(
            r#"int main() { assert(3, 1 + 2, "1 + 2"); ASSERT(4, 4); ASSERT(1, 2); return 0; }"#,
        );
        let err = interp.run().unwrap_err();
        assert_eq!(
            err,
            RuntimeError::AssertionFailed {
                expected: 1,
                actual: 2,
                text: None,
                location: err.location().copied().unwrap(),
            }
        );
        assert_eq!(interp.console().get_output(), vec!["1 + 2 => 3"]);
    }
}
