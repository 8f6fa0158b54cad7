//! Runtime value representation
//!
//! [`Value`] is what an rvalue evaluates to. Scalars are plain numbers or
//! arena addresses; struct rvalues are carried by the address of their bytes
//! so assignment can copy them.
//!
//! # Address encoding
//!
//! A pointer stored in memory occupies 8 bytes:
//!
//! ```text
//! bits 63..32  block handle + 1   (0 means null)
//! bits 31..0   byte offset, two's complement
//! ```
//!
//! Offsets may leave a block's bounds while pointer arithmetic is in
//! progress; only reads and writes are checked.

use std::fmt;

/// Handle of a block in the [`Arena`](super::arena::Arena)
pub type BlockId = usize;

/// Largest handle the stored pointer form can carry
pub const MAX_BLOCK_ID: BlockId = u32::MAX as BlockId - 1;

/// A location in the arena: block handle plus byte offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub block: BlockId,
    pub offset: i64,
}

impl Address {
    pub fn new(block: BlockId, offset: i64) -> Self {
        Address { block, offset }
    }

    /// Address `bytes` further along the same block
    pub fn add(self, bytes: i64) -> Option<Address> {
        Some(Address {
            block: self.block,
            offset: self.offset.checked_add(bytes)?,
        })
    }

    /// Pack into the 8-byte stored form. Fails if the offset does not fit.
    pub fn encode(self) -> Option<u64> {
        let offset = i32::try_from(self.offset).ok()?;
        let block = u32::try_from(self.block.checked_add(1)?).ok()?;
        Some(((block as u64) << 32) | (offset as u32 as u64))
    }

    /// Unpack the stored form; 0 is the null pointer
    pub fn decode(raw: u64) -> Option<Address> {
        let block = (raw >> 32) as usize;
        if block == 0 {
            return None;
        }
        Some(Address {
            block: block - 1,
            offset: raw as u32 as i32 as i64,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {}+{}", self.block, self.offset)
    }
}

/// Runtime values in the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Value {
    Int(i32),
    Pointer(Address),
    Null,
    /// A struct rvalue, by the address of its bytes
    Aggregate(Address),
    /// Result of a `void` call
    #[default]
    Void,
}

impl Value {
    /// Get the integer value, returns None if not an Int
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the pointer value; `Some(None)` is the null pointer
    pub fn as_pointer(&self) -> Option<Option<Address>> {
        match self {
            Value::Pointer(addr) => Some(Some(*addr)),
            Value::Null => Some(None),
            _ => None,
        }
    }

    /// Whether the value counts as true in a condition
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Pointer(_) => true,
            Value::Null | Value::Void | Value::Aggregate(_) => false,
        }
    }

    /// Check if this value is a pointer (including null)
    pub fn is_pointer(&self) -> bool {
        matches!(self, Value::Pointer(_) | Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Pointer(addr) => write!(f, "&[{}]", addr),
            Value::Null => write!(f, "NULL"),
            Value::Aggregate(addr) => write!(f, "{{struct at {}}}", addr),
            Value::Void => write!(f, "void"),
        }
    }
}

impl From<Option<Address>> for Value {
    fn from(addr: Option<Address>) -> Self {
        match addr {
            Some(addr) => Value::Pointer(addr),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_encoding() {
        let addr = Address::new(3, 20);
        let raw = addr.encode().unwrap();
        assert_eq!(raw, (4 << 32) | 20);
        assert_eq!(Address::decode(raw), Some(addr));
        assert_eq!(Address::decode(0), None);
    }

    #[test]
    fn test_negative_offsets_survive_encoding() {
        let addr = Address::new(0, -8);
        assert_eq!(Address::decode(addr.encode().unwrap()), Some(addr));
    }

    #[test]
    fn test_offset_out_of_encodable_range() {
        assert_eq!(Address::new(0, i64::from(i32::MAX) + 1).encode(), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Int(-1).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(Value::Pointer(Address::new(0, 0)).is_truthy());
    }
}
