//! Typed bump arena.

use std::fmt;
use std::ops::{Index, IndexMut};

use super::{ArenaError, BLOCK_BYTES};

/// Stable handle to a record in an [`Arena`].
///
/// Ids are handed out in allocation order, so comparing two ids compares
/// creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaId(u32);

impl ArenaId {
    /// Handle for the record at `index`.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw index of the record.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Block allocator handing out fixed-size records.
///
/// Records live in blocks of `block_len` slots. A block is only ever
/// appended to, so an id stays valid until the arena is reclaimed.
#[derive(Debug)]
pub struct Arena<T> {
    blocks: Vec<Vec<T>>,
    block_len: usize,
    live: usize,
    next: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Create an arena whose blocks hold about [`BLOCK_BYTES`] worth of records.
    #[must_use]
    pub fn new() -> Self {
        let record = std::mem::size_of::<T>().max(1);
        Self::with_block_len((BLOCK_BYTES / record).max(1))
    }

    /// Create an arena with an explicit number of records per block.
    #[must_use]
    pub fn with_block_len(block_len: usize) -> Self {
        Self {
            blocks: Vec::new(),
            block_len: block_len.max(1),
            live: 0,
            next: 0,
        }
    }

    /// Store `value` and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Exhausted`] if a new block cannot be reserved.
    pub fn alloc(&mut self, value: T) -> Result<ArenaId, ArenaError> {
        let id = u32::try_from(self.next).map_err(|_| self.exhausted())?;
        let needs_block = self
            .blocks
            .last()
            .map_or(true, |block| block.len() == self.block_len);
        if needs_block {
            let mut block = Vec::new();
            block
                .try_reserve_exact(self.block_len)
                .map_err(|_| self.exhausted())?;
            self.blocks.push(block);
        }
        if let Some(block) = self.blocks.last_mut() {
            block.push(value);
        }
        self.next += 1;
        self.live += 1;
        Ok(ArenaId::new(id))
    }

    /// Release one record.
    ///
    /// The slot is not reused. When the last live record is released the
    /// whole arena is reclaimed and every previously issued id is dangling.
    pub fn free(&mut self, _id: ArenaId) {
        self.live = self.live.saturating_sub(1);
        if self.live == 0 {
            self.clear();
        }
    }

    /// Drop every block at once.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.live = 0;
        self.next = 0;
    }

    /// Number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether no record is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of blocks currently held.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Bytes reserved by all blocks.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.blocks.len() * self.block_len * std::mem::size_of::<T>()
    }

    /// Get a record if the id is still valid.
    #[must_use]
    pub fn get(&self, id: ArenaId) -> Option<&T> {
        let (block, slot) = self.locate(id);
        self.blocks.get(block).and_then(|b| b.get(slot))
    }

    /// Get a mutable record if the id is still valid.
    pub fn get_mut(&mut self, id: ArenaId) -> Option<&mut T> {
        let (block, slot) = self.locate(id);
        self.blocks.get_mut(block).and_then(|b| b.get_mut(slot))
    }

    /// Iterate over every id handed out since the last reclaim.
    pub fn ids(&self) -> impl Iterator<Item = ArenaId> {
        // next never exceeds u32::MAX + 1 because alloc refuses beyond that
        (0..self.next).map(|i| ArenaId::new(i as u32))
    }

    fn locate(&self, id: ArenaId) -> (usize, usize) {
        let i = id.index();
        (i / self.block_len, i % self.block_len)
    }

    fn exhausted(&self) -> ArenaError {
        ArenaError::Exhausted {
            allocated: self.allocated_bytes(),
        }
    }
}

impl<T> Index<ArenaId> for Arena<T> {
    type Output = T;

    fn index(&self, id: ArenaId) -> &T {
        let (block, slot) = self.locate(id);
        &self.blocks[block][slot]
    }
}

impl<T> IndexMut<ArenaId> for Arena<T> {
    fn index_mut(&mut self, id: ArenaId) -> &mut T {
        let (block, slot) = self.locate(id);
        &mut self.blocks[block][slot]
    }
}
