//! Packed storage for node names.

use super::{ArenaError, BLOCK_BYTES};

/// Handle to a name stored in a [`StringPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameRef {
    block: u32,
    start: u32,
    len: u32,
}

impl NameRef {
    /// Length of the name in bytes.
    #[must_use]
    pub fn len(self) -> usize {
        self.len as usize
    }

    /// Whether the name is empty.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// Bump allocator for strings.
///
/// Names are appended to the current block; a name that does not fit opens a
/// new block, and a name longer than a whole block gets a block of its own.
#[derive(Debug)]
pub struct StringPool {
    blocks: Vec<String>,
    block_bytes: usize,
    reserved: usize,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    /// Create a pool with [`BLOCK_BYTES`] blocks.
    #[must_use]
    pub fn new() -> Self {
        Self::with_block_bytes(BLOCK_BYTES)
    }

    /// Create a pool with a custom block size.
    #[must_use]
    pub fn with_block_bytes(block_bytes: usize) -> Self {
        Self {
            blocks: Vec::new(),
            block_bytes: block_bytes.max(1),
            reserved: 0,
        }
    }

    /// Copy `name` into the pool.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Exhausted`] if a block cannot be reserved or the
    /// pool outgrows its 32-bit addressing.
    pub fn intern(&mut self, name: &str) -> Result<NameRef, ArenaError> {
        let fits = self
            .blocks
            .last()
            .is_some_and(|b| b.capacity() - b.len() >= name.len());
        if !fits {
            let size = name.len().max(self.block_bytes);
            let mut block = String::new();
            block
                .try_reserve_exact(size)
                .map_err(|_| self.exhausted())?;
            self.reserved += size;
            self.blocks.push(block);
        }

        let block_index = self.blocks.len() - 1;
        let exhausted = self.exhausted();
        let block = &mut self.blocks[block_index];
        let start = block.len();
        block.push_str(name);

        Ok(NameRef {
            block: u32::try_from(block_index).map_err(|_| exhausted.clone())?,
            start: u32::try_from(start).map_err(|_| exhausted.clone())?,
            len: u32::try_from(name.len()).map_err(|_| exhausted)?,
        })
    }

    /// Resolve a handle back to its text.
    #[must_use]
    pub fn get(&self, name: NameRef) -> &str {
        let start = name.start as usize;
        &self.blocks[name.block as usize][start..start + name.len()]
    }

    /// Bytes reserved by all blocks.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.reserved
    }

    /// Drop every block.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.reserved = 0;
    }

    fn exhausted(&self) -> ArenaError {
        ArenaError::Exhausted {
            allocated: self.reserved,
        }
    }
}
