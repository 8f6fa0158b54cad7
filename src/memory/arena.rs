//! Arena of byte blocks
//!
//! All program storage lives in one [`Arena`]:
//! - one `Globals` block, zero-filled, alive for the whole interpreter
//! - one read-only `Literal` block per string literal
//! - one `Frame` block per active call, released on return
//!
//! Blocks carry a per-byte initialization map so reads of never-written
//! locals are detected. Handles are handed out in increasing order and never
//! reused: a released block is dropped from the map, and any handle below
//! the next one to be issued that is missing from it names a released block.
//! A pointer into a finished frame is therefore reported as dangling instead
//! of silently aliasing a newer frame, while storage stays proportional to
//! the live blocks.

use super::value::{Address, BlockId, MAX_BLOCK_ID};
use rustc_hash::FxHashMap;
use std::fmt;

/// What a block holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Globals,
    Literal,
    /// Frame of a call to the function at this index
    Frame(usize),
}

/// A block of arena memory
#[derive(Debug, Clone)]
pub struct Block {
    pub kind: BlockKind,
    pub data: Vec<u8>,
    pub init_map: Vec<bool>, // Per-byte initialization tracking
}

impl Block {
    fn new(kind: BlockKind, size: usize, initialized: bool) -> Self {
        Block {
            kind,
            data: vec![0; size],
            init_map: vec![initialized; size],
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_read_only(&self) -> bool {
        self.kind == BlockKind::Literal
    }

    /// Check if a byte range is initialized
    pub fn is_initialized(&self, offset: usize, size: usize) -> bool {
        self.init_map
            .get(offset..offset + size)
            .is_some_and(|flags| flags.iter().all(|&b| b))
    }
}

/// Failed arena accesses; the interpreter attaches a source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// Read of bytes that were never written
    Uninitialized { address: Address },
    /// Access through a pointer into a released frame
    Dangling { address: Address },
    /// Access outside the block's bounds
    OutOfBounds {
        address: Address,
        len: usize,
        size: usize,
    },
    /// Write into a string literal
    ReadOnly { address: Address },
    /// Handle that names no block
    InvalidBlock { address: Address },
    /// Allocation would exceed the arena limit
    OutOfMemory { requested: usize, limit: usize },
    /// Every block handle a stored pointer can name has been issued
    HandlesExhausted,
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::Uninitialized { address } => {
                write!(f, "read of uninitialized memory at {}", address)
            }
            MemoryError::Dangling { address } => {
                write!(f, "access through dangling pointer {}", address)
            }
            MemoryError::OutOfBounds { address, len, size } => write!(
                f,
                "access of {} byte{} at {} is outside a block of {} bytes",
                len,
                if *len == 1 { "" } else { "s" },
                address,
                size
            ),
            MemoryError::ReadOnly { address } => {
                write!(f, "write to read-only string literal at {}", address)
            }
            MemoryError::InvalidBlock { address } => write!(f, "invalid address {}", address),
            MemoryError::OutOfMemory { requested, limit } => write!(
                f,
                "out of memory: requested {} bytes, limit is {}",
                requested, limit
            ),
            MemoryError::HandlesExhausted => write!(f, "out of memory: no block handles left"),
        }
    }
}

impl std::error::Error for MemoryError {}

/// The arena
#[derive(Debug, Clone)]
pub struct Arena {
    blocks: FxHashMap<BlockId, Block>,
    next_id: BlockId,
    live_bytes: usize,
    limit: usize,
}

impl Arena {
    /// Create an empty arena with a limit on live bytes
    pub fn new(limit: usize) -> Self {
        Arena {
            blocks: FxHashMap::default(),
            next_id: 0,
            live_bytes: 0,
            limit,
        }
    }

    /// Allocate a block. Globals and literals start initialized; frames
    /// start uninitialized.
    pub fn allocate(&mut self, kind: BlockKind, size: usize) -> Result<BlockId, MemoryError> {
        if self.live_bytes + size > self.limit {
            return Err(MemoryError::OutOfMemory {
                requested: size,
                limit: self.limit,
            });
        }
        if self.next_id > MAX_BLOCK_ID {
            return Err(MemoryError::HandlesExhausted);
        }
        let id = self.next_id;
        let initialized = !matches!(kind, BlockKind::Frame(_));
        self.blocks.insert(id, Block::new(kind, size, initialized));
        self.next_id += 1;
        self.live_bytes += size;
        Ok(id)
    }

    /// Allocate a read-only block holding `bytes`
    pub fn allocate_literal(&mut self, bytes: &[u8]) -> Result<BlockId, MemoryError> {
        let id = self.allocate(BlockKind::Literal, bytes.len())?;
        if let Some(block) = self.blocks.get_mut(&id) {
            block.data.copy_from_slice(bytes);
        }
        Ok(id)
    }

    /// Release a block and drop its storage; the handle is never reissued
    pub fn release(&mut self, id: BlockId) {
        if let Some(block) = self.blocks.remove(&id) {
            self.live_bytes -= block.size();
        }
    }

    /// Zero a block and mark it initialized
    pub fn clear(&mut self, id: BlockId) {
        if let Some(block) = self.blocks.get_mut(&id) {
            block.data.fill(0);
            block.init_map.fill(true);
        }
    }

    /// A live block
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// Number of live blocks
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Bytes held by live blocks
    pub fn live_bytes(&self) -> usize {
        self.live_bytes
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Read `len` initialized bytes
    pub fn read(&self, address: Address, len: usize) -> Result<&[u8], MemoryError> {
        let (block, start) = self.locate(address, len)?;
        if !block.is_initialized(start, len) {
            return Err(MemoryError::Uninitialized { address });
        }
        Ok(&block.data[start..start + len])
    }

    /// Write bytes and mark them initialized
    pub fn write(&mut self, address: Address, bytes: &[u8]) -> Result<(), MemoryError> {
        let (block, start) = self.locate(address, bytes.len())?;
        if block.is_read_only() {
            return Err(MemoryError::ReadOnly { address });
        }
        let end = start + bytes.len();
        let block = self.live_mut(address)?;
        block.data[start..end].copy_from_slice(bytes);
        block.init_map[start..end].fill(true);
        Ok(())
    }

    /// Copy `len` bytes together with their initialization flags
    pub fn copy(&mut self, dst: Address, src: Address, len: usize) -> Result<(), MemoryError> {
        let (src_block, src_start) = self.locate(src, len)?;
        let data = src_block.data[src_start..src_start + len].to_vec();
        let init = src_block.init_map[src_start..src_start + len].to_vec();

        let (dst_block, dst_start) = self.locate(dst, len)?;
        if dst_block.is_read_only() {
            return Err(MemoryError::ReadOnly { address: dst });
        }
        let block = self.live_mut(dst)?;
        block.data[dst_start..dst_start + len].copy_from_slice(&data);
        block.init_map[dst_start..dst_start + len].copy_from_slice(&init);
        Ok(())
    }

    /// Check that `len` bytes at `address` are inside a live block
    fn locate(&self, address: Address, len: usize) -> Result<(&Block, usize), MemoryError> {
        let block = self.blocks.get(&address.block).ok_or_else(|| self.missing(address))?;

        let start = usize::try_from(address.offset).ok();
        match start {
            Some(start) if start.checked_add(len).is_some_and(|end| end <= block.size()) => {
                Ok((block, start))
            }
            _ => Err(MemoryError::OutOfBounds {
                address,
                len,
                size: block.size(),
            }),
        }
    }

    fn live_mut(&mut self, address: Address) -> Result<&mut Block, MemoryError> {
        let missing = self.missing(address);
        self.blocks.get_mut(&address.block).ok_or(missing)
    }

    /// Error for a handle with no live block behind it
    fn missing(&self, address: Address) -> MemoryError {
        if address.block < self.next_id {
            MemoryError::Dangling { address }
        } else {
            MemoryError::InvalidBlock { address }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_globals_are_zeroed_and_initialized() {
        let mut arena = Arena::new(1024);
        let g = arena.allocate(BlockKind::Globals, 8).unwrap();
        assert_eq!(arena.read(Address::new(g, 4), 4).unwrap(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_frame_reads_require_writes() {
        let mut arena = Arena::new(1024);
        let f = arena.allocate(BlockKind::Frame(0), 8).unwrap();
        let addr = Address::new(f, 0);
        assert_eq!(
            arena.read(addr, 4),
            Err(MemoryError::Uninitialized { address: addr })
        );
        arena.write(addr, &7i32.to_le_bytes()).unwrap();
        assert_eq!(arena.read(addr, 4).unwrap(), &7i32.to_le_bytes());
        // Partially written range is still uninitialized
        assert!(arena.read(addr, 8).is_err());
    }

    #[test]
    fn test_bounds_are_checked() {
        let mut arena = Arena::new(1024);
        let g = arena.allocate(BlockKind::Globals, 4).unwrap();
        assert!(matches!(
            arena.read(Address::new(g, 1), 4),
            Err(MemoryError::OutOfBounds { .. })
        ));
        assert!(matches!(
            arena.write(Address::new(g, -1), &[1]),
            Err(MemoryError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_released_frames_are_dangling() {
        let mut arena = Arena::new(1024);
        let f = arena.allocate(BlockKind::Frame(0), 4).unwrap();
        arena.release(f);
        assert_eq!(arena.live_bytes(), 0);
        let next = arena.allocate(BlockKind::Frame(0), 4).unwrap();
        assert_ne!(f, next);
        assert!(matches!(
            arena.read(Address::new(f, 0), 4),
            Err(MemoryError::Dangling { .. })
        ));
    }

    #[test]
    fn test_released_blocks_free_their_slots() {
        let mut arena = Arena::new(1024);
        let g = arena.allocate(BlockKind::Globals, 8).unwrap();
        let first = arena.allocate(BlockKind::Frame(0), 16).unwrap();
        arena.release(first);
        for _ in 0..10_000 {
            let f = arena.allocate(BlockKind::Frame(0), 16).unwrap();
            arena.release(f);
        }
        assert_eq!(arena.block_count(), 1);
        assert_eq!(arena.live_bytes(), 8);
        assert!(arena.block(g).is_some());
        assert!(matches!(
            arena.write(Address::new(first, 0), &[1]),
            Err(MemoryError::Dangling { .. })
        ));
        assert!(matches!(
            arena.read(Address::new(first + 20_000, 0), 1),
            Err(MemoryError::InvalidBlock { .. })
        ));
    }

    #[test]
    fn test_handle_exhaustion() {
        let mut arena = Arena::new(1024);
        arena.next_id = MAX_BLOCK_ID;
        let last = arena.allocate(BlockKind::Frame(0), 4).unwrap();
        assert!(Address::new(last, 0).encode().is_some());
        assert_eq!(
            arena.allocate(BlockKind::Frame(0), 4),
            Err(MemoryError::HandlesExhausted)
        );
    }

    #[test]
    fn test_literals_are_read_only() {
        let mut arena = Arena::new(1024);
        let lit = arena.allocate_literal(b"hi\0").unwrap();
        assert_eq!(arena.read(Address::new(lit, 0), 3).unwrap(), b"hi\0");
        assert!(matches!(
            arena.write(Address::new(lit, 0), b"H"),
            Err(MemoryError::ReadOnly { .. })
        ));
    }

    #[test]
    fn test_copy_carries_init_flags() {
        let mut arena = Arena::new(1024);
        let a = arena.allocate(BlockKind::Frame(0), 8).unwrap();
        let b = arena.allocate(BlockKind::Frame(0), 8).unwrap();
        arena.write(Address::new(a, 0), &[1, 2, 3, 4]).unwrap();
        arena.copy(Address::new(b, 0), Address::new(a, 0), 8).unwrap();
        assert_eq!(arena.read(Address::new(b, 0), 4).unwrap(), &[1, 2, 3, 4]);
        assert!(arena.read(Address::new(b, 4), 4).is_err());
    }

    #[test]
    fn test_memory_limit() {
        let mut arena = Arena::new(16);
        arena.allocate(BlockKind::Globals, 12).unwrap();
        assert_eq!(
            arena.allocate(BlockKind::Frame(0), 8),
            Err(MemoryError::OutOfMemory {
                requested: 8,
                limit: 16
            })
        );
    }
}
