//! Block arenas for tree nodes, index entries and name bytes.
//!
//! # Overview
//!
//! A multi-million entry listing produces as many tree nodes, so records are
//! never allocated one by one. Instead they are bump-allocated out of large
//! fixed-size blocks:
//!
//! * [`Arena`]: typed records addressed by a stable [`ArenaId`]. Records are
//!   never moved or reused; freeing only decrements a live count, and the
//!   whole arena is released when the last live record goes away.
//! * [`StringPool`]: node names packed back to back into byte blocks and
//!   addressed by a [`NameRef`].
//!
//! Allocation failure is reported as [`ArenaError::Exhausted`]; callers treat
//! it as fatal.
//!
//! # Example
//!
//! ```
//! use finddup::arena::{Arena, StringPool};
//!
//! let mut arena: Arena<u64> = Arena::new();
//! let a = arena.alloc(7).unwrap();
//! let b = arena.alloc(9).unwrap();
//! assert_eq!(arena[a] + arena[b], 16);
//!
//! let mut names = StringPool::new();
//! let r = names.intern("photos").unwrap();
//! assert_eq!(names.get(r), "photos");
//! ```

pub mod pool;
pub mod strings;

pub use pool::{Arena, ArenaId};
pub use strings::{NameRef, StringPool};

/// Size of one arena block in bytes.
pub const BLOCK_BYTES: usize = 1024 * 1024;

/// Errors raised by the arenas.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// A new block could not be reserved, or the id space is used up.
    #[error("arena exhausted after {allocated} bytes")]
    Exhausted {
        /// Bytes already reserved by this arena when the request failed
        allocated: usize,
    },
}
