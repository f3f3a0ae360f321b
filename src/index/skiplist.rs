//! Arena-backed skip list.

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::arena::{Arena, ArenaError, ArenaId};

/// Maximum tower height.
pub const MAX_LEVEL: usize = 32;

const DEFAULT_SEED: u64 = 0x6669_6e64_6475_70;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    next: Vec<Option<ArenaId>>,
}

/// Ordered map with probabilistic O(log n) insertion.
///
/// Only insertion and lookup are supported; entries stay until
/// [`clear`](Self::clear), which hands every record back to the arena.
#[derive(Debug)]
pub struct SkipList<K, V> {
    entries: Arena<Entry<K, V>>,
    head: [Option<ArenaId>; MAX_LEVEL],
    level: usize,
    len: usize,
    rng: StdRng,
}

impl<K: Ord, V> Default for SkipList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> SkipList<K, V> {
    /// Create an empty list with a fixed level seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Create an empty list whose tower heights come from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            entries: Arena::new(),
            head: [None; MAX_LEVEL],
            level: 0,
            len: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes reserved for entries.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.entries.allocated_bytes()
    }

    /// Look up `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let mut cur = None;
        for level in (0..self.level).rev() {
            while let Some(n) = self.next_at(cur, level) {
                match self.entries[n].key.cmp(key) {
                    Ordering::Less => cur = Some(n),
                    Ordering::Equal => return Some(&self.entries[n].value),
                    Ordering::Greater => break,
                }
            }
        }
        None
    }

    /// Insert `value` under `key` unless the key is already present.
    ///
    /// Returns the stored value and whether it was newly inserted. An
    /// existing entry is left untouched and `value` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError`] if the entry cannot be allocated.
    pub fn get_or_insert(&mut self, key: K, value: V) -> Result<(&V, bool), ArenaError> {
        let mut update: [Option<ArenaId>; MAX_LEVEL] = [None; MAX_LEVEL];
        let mut cur = None;
        let mut found = None;

        'levels: for level in (0..self.level).rev() {
            while let Some(n) = self.next_at(cur, level) {
                match self.entries[n].key.cmp(&key) {
                    Ordering::Less => cur = Some(n),
                    Ordering::Equal => {
                        found = Some(n);
                        break 'levels;
                    }
                    Ordering::Greater => break,
                }
            }
            update[level] = cur;
        }

        if let Some(n) = found {
            return Ok((&self.entries[n].value, false));
        }

        let height = self.random_level();
        let id = self.entries.alloc(Entry {
            key,
            value,
            next: vec![None; height],
        })?;
        for (level, prev) in update.iter().enumerate().take(height) {
            let after = self.next_at(*prev, level);
            self.entries[id].next[level] = after;
            match prev {
                Some(p) => self.entries[*p].next[level] = Some(id),
                None => self.head[level] = Some(id),
            }
        }
        self.level = self.level.max(height);
        self.len += 1;

        Ok((&self.entries[id].value, true))
    }

    /// Iterate in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        let mut cur = self.head[0];
        std::iter::from_fn(move || {
            let id = cur?;
            let entry = &self.entries[id];
            cur = entry.next[0];
            Some((&entry.key, &entry.value))
        })
    }

    /// Release every entry. The backing arena is reclaimed with the last one.
    pub fn clear(&mut self) {
        let mut cur = self.head[0];
        while let Some(id) = cur {
            cur = self.entries[id].next[0];
            self.entries.free(id);
        }
        self.head = [None; MAX_LEVEL];
        self.level = 0;
        self.len = 0;
    }

    fn next_at(&self, at: Option<ArenaId>, level: usize) -> Option<ArenaId> {
        match at {
            Some(id) => self.entries[id].next[level],
            None => self.head[level],
        }
    }

    fn random_level(&mut self) -> usize {
        let mut height = 1;
        while height < MAX_LEVEL && height <= self.level && self.rng.gen_bool(0.5) {
            height += 1;
        }
        height
    }
}
