// Execution engine for the evaluator

use crate::console::Console;
use crate::interpreter::constants::MAX_CALL_DEPTH;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{Address, Arena, BlockId, BlockKind, Value};
use crate::parser::ast::SourceLocation;
use crate::sema::typed::{Function, GlobalInit, GlobalVar, Program};
use crate::sema::types::CType;
use std::rc::Rc;

/// An active call
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub block: BlockId,
    /// Value of the most recent expression statement, returned when the
    /// body ends without `return`
    pub last_value: Value,
}

/// Result of executing a statement
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ControlFlow {
    Normal,
    Return(Value),
}

/// The interpreter that executes a resolved program
pub struct Interpreter {
    /// Resolved program; shared so function bodies can be walked while the
    /// interpreter mutates its own state
    pub(crate) program: Rc<Program>,

    /// All storage: globals, string literals and frames
    pub(crate) arena: Arena,

    /// Handle of the globals block
    pub(crate) globals: BlockId,

    /// Handle of each string literal's block, by literal index
    pub(crate) literals: Vec<BlockId>,

    /// Call stack
    pub(crate) frames: Vec<Frame>,

    /// Captured printf and assert output
    pub(crate) console: Console,

    /// Location of the statement being executed
    pub(crate) current_location: SourceLocation,
}

impl Interpreter {
    /// Create an interpreter with the globals block and string literals
    /// loaded. `memory_limit` bounds the live arena bytes.
    pub fn new(program: Program, memory_limit: usize) -> Result<Self, RuntimeError> {
        let mut arena = Arena::new(memory_limit);
        let location = SourceLocation::new(1, 1);

        let globals = arena
            .allocate(BlockKind::Globals, program.globals_size)
            .map_err(|e| RuntimeError::from_memory(e, location))?;

        let mut literals = Vec::with_capacity(program.literals.len());
        for bytes in &program.literals {
            let id = arena
                .allocate_literal(bytes)
                .map_err(|e| RuntimeError::from_memory(e, location))?;
            literals.push(id);
        }

        let mut interpreter = Interpreter {
            program: Rc::new(program),
            arena,
            globals,
            literals,
            frames: Vec::new(),
            console: Console::new(),
            current_location: location,
        };
        interpreter.reset_globals()?;
        Ok(interpreter)
    }

    /// Run `main()` and return its result (0 for `void main`)
    pub fn run(&mut self) -> Result<i32, RuntimeError> {
        let index = *self
            .program
            .function_index
            .get("main")
            .ok_or(RuntimeError::NoMainFunction)?;
        let location = self.program.functions[index].location;

        let value = self.invoke(index, Vec::new(), location)?;
        Ok(value.as_int().unwrap_or(0))
    }

    /// Call any defined function with integer arguments. Pointer
    /// parameters accept only 0 (null).
    pub fn call(&mut self, name: &str, args: &[i32]) -> Result<Value, RuntimeError> {
        let index = *self
            .program
            .function_index
            .get(name)
            .ok_or_else(|| RuntimeError::UndefinedFunction {
                name: name.to_string(),
            })?;
        let function = &self.program.functions[index];
        let location = function.location;

        if function.params.len() != args.len() {
            return Err(RuntimeError::ArgumentCountMismatch {
                function: name.to_string(),
                expected: function.params.len(),
                got: args.len(),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for (param, &arg) in function.params.iter().zip(args) {
            let value = match (&param.ty, arg) {
                (CType::Pointer(_), 0) => Value::Null,
                (CType::Pointer(_), _) => {
                    return Err(RuntimeError::InvalidPointer {
                        message: format!("integer {} passed for pointer '{}'", arg, param.name),
                        location,
                    });
                }
                (ty, _) => convert(ty, Value::Int(arg)),
            };
            values.push(value);
        }

        self.invoke(index, values, location)
    }

    /// Zero the globals block and apply constant initializers
    pub fn reset_globals(&mut self) -> Result<(), RuntimeError> {
        self.arena.clear(self.globals);

        let program = Rc::clone(&self.program);
        for global in &program.globals {
            let Some(init) = &global.init else {
                continue;
            };
            let value = match init {
                GlobalInit::Int(0) if global.ty.is_pointer() => Value::Null,
                GlobalInit::Int(n) => Value::Int(*n),
                GlobalInit::Literal(id) => Value::Pointer(self.literal_address(*id)),
            };
            let address = Address::new(self.globals, global.offset as i64);
            self.store(address, &global.ty, convert(&global.ty, value), self.current_location)?;
        }
        Ok(())
    }

    /// Execute a call to the function at `index` with evaluated arguments
    pub(crate) fn invoke(
        &mut self,
        index: usize,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if self.frames.len() >= MAX_CALL_DEPTH {
            return Err(RuntimeError::CallDepthExceeded {
                limit: MAX_CALL_DEPTH,
                location,
            });
        }

        let program = Rc::clone(&self.program);
        let function = &program.functions[index];

        let block = self
            .arena
            .allocate(BlockKind::Frame(index), function.frame_size)
            .map_err(|e| RuntimeError::from_memory(e, location))?;
        self.frames.push(Frame {
            block,
            last_value: Value::Int(0),
        });

        let caller_location = self.current_location;
        let result = self.run_frame(function, args);
        self.current_location = caller_location;

        let frame = self.frames.pop();
        self.arena.release(block);

        let value = match result? {
            ControlFlow::Return(value) => value,
            ControlFlow::Normal => frame.map(|f| f.last_value).unwrap_or(Value::Int(0)),
        };
        Ok(convert(&function.return_type, value))
    }

    fn run_frame(
        &mut self,
        function: &Function,
        args: Vec<Value>,
    ) -> Result<ControlFlow, RuntimeError> {
        for (param, value) in function.params.iter().zip(args) {
            let address = self.local_address(param.offset)?;
            self.store(address, &param.ty, value, function.location)?;
        }
        self.execute_statements(&function.body)
    }

    // ===== Addresses =====

    pub(crate) fn current_frame(&self) -> Result<&Frame, RuntimeError> {
        self.frames.last().ok_or_else(|| RuntimeError::InvalidPointer {
            message: "local variable accessed outside a call".to_string(),
            location: self.current_location,
        })
    }

    pub(crate) fn local_address(&self, offset: usize) -> Result<Address, RuntimeError> {
        Ok(Address::new(self.current_frame()?.block, offset as i64))
    }

    pub(crate) fn global_address(&self, offset: usize) -> Address {
        Address::new(self.globals, offset as i64)
    }

    pub(crate) fn literal_address(&self, id: usize) -> Address {
        // Literal handles are allocated for every index in `new`
        Address::new(self.literals.get(id).copied().unwrap_or(usize::MAX), 0)
    }

    // ===== Inspection =====

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Raw bytes of a global
    pub fn global_bytes(&self, global: &GlobalVar) -> Option<&[u8]> {
        let block = self.arena.block(self.globals)?;
        block.data.get(global.offset..global.offset + global.ty.size())
    }

    /// Current value of a scalar global
    pub fn global_value(&self, global: &GlobalVar) -> Result<Value, RuntimeError> {
        self.load(
            self.global_address(global.offset),
            &global.ty,
            self.current_location,
        )
    }
}

/// Convert a value for storage in (or return as) an object of type `ty`
pub(crate) fn convert(ty: &CType, value: Value) -> Value {
    match (ty, value) {
        (CType::Void, _) => Value::Void,
        (CType::Char, Value::Int(n)) => Value::Int(n as i8 as i32),
        (CType::Char | CType::Int, Value::Int(n)) => Value::Int(n),
        (CType::Char | CType::Int, _) => Value::Int(0),
        (CType::Pointer(_), v) if v.is_pointer() => v,
        (CType::Pointer(_), _) => Value::Null,
        (_, v) => v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::constants::DEFAULT_MEMORY_LIMIT;
    use crate::parser::Parser;
    use crate::sema::resolve;

    fn interpreter(source: &str) -> Interpreter {
        let mut parser = Parser::new(source).unwrap();
        let ast = parser.parse_program().unwrap();
        let program = resolve(&ast).unwrap();
        Interpreter::new(program, DEFAULT_MEMORY_LIMIT).unwrap()
    }

    #[test]
    fn test_run_main() {
        let mut interp = interpreter("int main() { return 42; }");
        assert_eq!(interp.run().unwrap(), 42);
    }

    #[test]
    fn test_no_main() {
        let mut interp = interpreter("int f() { return 1; }");
        assert_eq!(interp.run(), Err(RuntimeError::NoMainFunction));
    }

    #[test]
    fn test_call_with_arguments() {
        let mut interp = interpreter("int add(int a, int b) { return a + b; }");
        assert_eq!(interp.call("add", &[2, 5]).unwrap(), Value::Int(7));
        assert!(matches!(
            interp.call("add", &[1]),
            Err(RuntimeError::ArgumentCountMismatch { expected: 2, got: 1, .. })
        ));
        assert!(matches!(
            interp.call("missing", &[]),
            Err(RuntimeError::UndefinedFunction { .. })
        ));
    }

    #[test]
    fn test_frames_are_released_after_calls() {
        let mut interp = interpreter("int f() { int a[10]; a[0] = 1; return a[0]; }");
        let before = interp.arena().live_bytes();
        let blocks = interp.arena().block_count();
        for _ in 0..1000 {
            interp.call("f", &[]).unwrap();
        }
        assert_eq!(interp.arena().live_bytes(), before);
        assert_eq!(interp.arena().block_count(), blocks);
        assert!(interp.frames.is_empty());
    }

    #[test]
    fn test_char_return_truncates() {
        let mut interp = interpreter("char f() { return 300; }");
        assert_eq!(interp.call("f", &[]).unwrap(), Value::Int(44));
    }

    #[test]
    fn test_globals_persist_and_reset() {
        let mut interp = interpreter("int g = 5; int bump() { g += 1; return g; }");
        assert_eq!(interp.call("bump", &[]).unwrap(), Value::Int(6));
        assert_eq!(interp.call("bump", &[]).unwrap(), Value::Int(7));
        interp.reset_globals().unwrap();
        assert_eq!(interp.call("bump", &[]).unwrap(), Value::Int(6));
        let g = interp.program().globals[0].clone();
        assert_eq!(interp.global_value(&g).unwrap(), Value::Int(6));
        assert_eq!(interp.global_bytes(&g).unwrap(), &[6, 0, 0, 0]);
    }

    #[test]
    fn test_call_depth_limit() {
        let mut interp = interpreter("int f(int n) { return f(n + 1); }");
        assert!(matches!(
            interp.call("f", &[0]),
            Err(RuntimeError::CallDepthExceeded { .. })
        ));
        assert!(interp.frames.is_empty());
    }
}
