//! Listing ingestion.
//!
//! This module turns hash listings into the merged path tree:
//! - [`record`]: the line format (`5` hash, `s` size, `-` ignored) and parser
//! - [`ingest`]: sequential reading of listings into a [`TreeBuilder`] with
//!   fingerprint grouping through the [`HashIndex`]
//! - [`path_utils`]: optional NFC normalization of paths
//!
//! The listings themselves come from an external hashing tool, for example:
//!
//! ```text
//! find . -type f -exec md5sum {} + | awk '{ ... print hash, size, path }'
//! ```
//!
//! [`TreeBuilder`]: crate::tree::TreeBuilder
//! [`HashIndex`]: crate::index::HashIndex

pub mod ingest;
pub mod path_utils;
pub mod record;

pub use ingest::{IngestError, IngestStats, Ingestor, ParseError, STDIN_NAME};
pub use record::{Field, FormatError, Record, RecordError, RecordFormat};
