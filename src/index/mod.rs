//! Content index: groups file nodes with identical fingerprints.
//!
//! The first node seen for a fingerprint becomes the representative stored in
//! the index. Every later node with the same fingerprint is spliced into the
//! representative's group ring, so after ingestion each ring holds exactly the
//! files that share one fingerprint.

pub mod fingerprint;
pub mod skiplist;

pub use fingerprint::{Fingerprint, InvalidFingerprint, EMPTY_HASH};
pub use skiplist::SkipList;

use crate::arena::ArenaError;
use crate::tree::{NodeId, TreeBuilder};

/// Fingerprint to representative-node index.
#[derive(Debug, Default)]
pub struct HashIndex {
    entries: SkipList<Fingerprint, NodeId>,
}

impl HashIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `node` under `fingerprint`.
    ///
    /// A first sighting makes `node` its own one-member ring. A repeat sighting
    /// splices `node` into the representative's ring. Returns `true` if the
    /// fingerprint was new.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError`] if the index entry cannot be allocated.
    pub fn add(
        &mut self,
        builder: &mut TreeBuilder,
        node: NodeId,
        fingerprint: Fingerprint,
    ) -> Result<bool, ArenaError> {
        let tree = builder.tree_mut();
        tree.node_mut(node).group = Some(node);
        let (&rep, is_new) = self.entries.get_or_insert(fingerprint, node)?;
        if !is_new {
            tree.splice_groups(rep, node);
        }
        Ok(is_new)
    }

    /// Representative node for `fingerprint`.
    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<NodeId> {
        self.entries.get(fingerprint).copied()
    }

    /// Number of distinct fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes reserved for index entries.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.entries.allocated_bytes()
    }

    /// Drop every entry and return its memory.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
