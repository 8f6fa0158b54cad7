//! Typed loads and stores on the arena
//!
//! Scalars are stored little-endian at their natural width:
//! - `char`: 1 byte, sign-extended on load, truncated on store
//! - `int`: 4 bytes
//! - pointers: 8 bytes in the encoded form of [`Address`]
//!
//! Struct values move as byte copies; loading a struct yields
//! [`Value::Aggregate`] without reading its bytes.

use crate::interpreter::constants::{INT_SIZE, WORD_SIZE};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{Address, Value};
use crate::parser::ast::SourceLocation;
use crate::sema::types::CType;

/// Longest string `printf` and `assert` will read
const MAX_STRING_LEN: usize = 64 * 1024;

impl Interpreter {
    /// Read the object of type `ty` at `address`
    pub(crate) fn load(
        &self,
        address: Address,
        ty: &CType,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let mem = |e| RuntimeError::from_memory(e, location);

        match ty {
            CType::Char => {
                let bytes = self.arena.read(address, 1).map_err(mem)?;
                Ok(Value::Int(bytes[0] as i8 as i32))
            }
            CType::Int => {
                let bytes = self.arena.read(address, INT_SIZE).map_err(mem)?;
                let mut raw = [0u8; INT_SIZE];
                raw.copy_from_slice(bytes);
                Ok(Value::Int(i32::from_le_bytes(raw)))
            }
            CType::Pointer(_) => {
                let bytes = self.arena.read(address, WORD_SIZE).map_err(mem)?;
                let mut raw = [0u8; WORD_SIZE];
                raw.copy_from_slice(bytes);
                Ok(Address::decode(u64::from_le_bytes(raw)).into())
            }
            CType::Struct(_) => Ok(Value::Aggregate(address)),
            // Arrays only reach here undecayed through `&`; treat as their address
            CType::Array { .. } => Ok(Value::Pointer(address)),
            CType::Void => Ok(Value::Void),
        }
    }

    /// Write `value` as an object of type `ty` at `address`
    pub(crate) fn store(
        &mut self,
        address: Address,
        ty: &CType,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let mem = |e| RuntimeError::from_memory(e, location);

        match (ty, value) {
            (CType::Char, Value::Int(n)) => self.arena.write(address, &[n as u8]).map_err(mem),
            (CType::Int, Value::Int(n)) => self.arena.write(address, &n.to_le_bytes()).map_err(mem),
            (CType::Pointer(_), Value::Null) => {
                self.arena.write(address, &0u64.to_le_bytes()).map_err(mem)
            }
            (CType::Pointer(_), Value::Pointer(target)) => {
                let raw = target.encode().ok_or_else(|| RuntimeError::InvalidPointer {
                    message: format!("pointer {} is too far outside its object to store", target),
                    location,
                })?;
                self.arena.write(address, &raw.to_le_bytes()).map_err(mem)
            }
            (CType::Struct(layout), Value::Aggregate(source)) => {
                self.arena.copy(address, source, layout.size).map_err(mem)
            }
            (ty, value) => Err(RuntimeError::InvalidPointer {
                message: format!("cannot store {} as {}", value, ty),
                location,
            }),
        }
    }

    /// Read a NUL-terminated string starting at `address`
    pub(crate) fn read_c_string(
        &self,
        address: Address,
        location: SourceLocation,
    ) -> Result<Vec<u8>, RuntimeError> {
        let mut bytes = Vec::new();
        let mut cursor = address;
        loop {
            let byte = self
                .arena
                .read(cursor, 1)
                .map_err(|e| RuntimeError::from_memory(e, location))?[0];
            if byte == 0 {
                return Ok(bytes);
            }
            bytes.push(byte);
            if bytes.len() > MAX_STRING_LEN {
                return Err(RuntimeError::InvalidPointer {
                    message: "string is not terminated".to_string(),
                    location,
                });
            }
            cursor = cursor.add(1).ok_or_else(|| RuntimeError::InvalidPointer {
                message: "string runs past the end of memory".to_string(),
                location,
            })?;
        }
    }
}
