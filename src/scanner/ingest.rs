//! Listing ingestion into the path tree and the content index.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use super::path_utils::normalize_path_str;
use super::record::{RecordError, RecordFormat};
use crate::arena::ArenaError;
use crate::index::{Fingerprint, HashIndex, EMPTY_HASH};
use crate::progress::ProgressCallback;
use crate::tree::{Tree, TreeBuilder};

/// Name used for standard input in messages.
pub const STDIN_NAME: &str = "stdin";

/// Lines between progress updates.
pub const PROGRESS_INTERVAL: u64 = 4096;

/// Level unparsable lines are logged at. Stays visible under `-q`.
pub const PARSE_ERROR_LEVEL: log::Level = log::Level::Error;

/// A listing line that could not be parsed.
///
/// Displays as `<source>:<line>: parse error`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{origin}:{line}: parse error")]
pub struct ParseError {
    /// Name of the listing the line came from
    pub origin: String,
    /// 1-based line number
    pub line: u64,
    /// What was wrong with the line
    pub reason: RecordError,
}

/// Fatal ingestion failures.
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("failed to read {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Arena(#[from] ArenaError),
}

/// Counters collected while ingesting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    /// Listings consumed
    pub sources: usize,
    /// Lines read, including bad ones
    pub lines: u64,
    /// Records inserted into the tree
    pub records: u64,
    /// Empty-file records dropped
    pub skipped_empty: u64,
    /// Records entered into the content index
    pub indexed: u64,
    /// Hash fields that were not a valid fingerprint
    pub invalid_hashes: u64,
    /// Distinct fingerprints seen
    pub fingerprints: usize,
    /// Bytes the index held before it was released
    pub index_bytes: usize,
    /// Lines that failed to parse
    #[serde(skip)]
    pub parse_errors: Vec<ParseError>,
}

/// Reads listings into a [`TreeBuilder`], grouping files by fingerprint.
///
/// Listings are consumed one after the other. A bad line is logged and
/// skipped; only read errors and arena exhaustion stop ingestion.
///
/// # Example
///
/// ```
/// use finddup::scanner::{Ingestor, RecordFormat};
///
/// let listing = "\
/// 0123456789abcdef0123456789abcdef 100 a/x
/// 0123456789abcdef0123456789abcdef 100 b/x
/// ";
/// let mut ingestor = Ingestor::new(RecordFormat::default()).unwrap();
/// ingestor.ingest_reader(listing.as_bytes(), "listing").unwrap();
/// let (tree, stats) = ingestor.finish();
///
/// assert_eq!(stats.records, 2);
/// let ax = tree.find("a/x").unwrap();
/// assert_eq!(tree.ring(ax).count(), 2);
/// ```
pub struct Ingestor {
    builder: TreeBuilder,
    index: HashIndex,
    format: RecordFormat,
    include_zero: bool,
    normalize_unicode: bool,
    stats: IngestStats,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("format", &self.format)
            .field("include_zero", &self.include_zero)
            .field("normalize_unicode", &self.normalize_unicode)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Ingestor {
    /// Create an ingestor for listings in `format`.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError`] if the tree cannot be set up.
    pub fn new(format: RecordFormat) -> Result<Self, ArenaError> {
        Ok(Self {
            builder: TreeBuilder::new()?,
            index: HashIndex::new(),
            format,
            include_zero: false,
            normalize_unicode: false,
            stats: IngestStats::default(),
            progress: None,
        })
    }

    /// Keep empty-file records instead of dropping them.
    #[must_use]
    pub fn include_zero(mut self, include: bool) -> Self {
        self.include_zero = include;
        self
    }

    /// Normalize paths to NFC before insertion.
    #[must_use]
    pub fn normalize_unicode(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// The tree under construction.
    #[must_use]
    pub fn builder(&self) -> &TreeBuilder {
        &self.builder
    }

    /// Ingest the listing file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the file cannot be opened or read, or the
    /// arena is exhausted.
    pub fn ingest_path(&mut self, path: &Path) -> Result<u64, IngestError> {
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|source| IngestError::Io {
            origin: origin.clone(),
            source,
        })?;
        self.ingest_reader(BufReader::new(file), &origin)
    }

    /// Ingest every line of `reader`, naming it `origin` in messages.
    ///
    /// Lines are split on `\n`; a trailing `\r` is dropped and invalid UTF-8
    /// is replaced. Returns the number of lines read.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] on a read error or arena exhaustion.
    pub fn ingest_reader<R: BufRead>(
        &mut self,
        mut reader: R,
        origin: &str,
    ) -> Result<u64, IngestError> {
        log::debug!("Reading listing {origin}");
        self.stats.sources += 1;
        let mut buf = Vec::with_capacity(256);
        let mut line_no = 0u64;

        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| IngestError::Io {
                    origin: origin.to_string(),
                    source,
                })?;
            if n == 0 {
                break;
            }
            line_no += 1;

            let mut bytes = buf.as_slice();
            if let Some(rest) = bytes.strip_suffix(b"\n") {
                bytes = rest;
            }
            if let Some(rest) = bytes.strip_suffix(b"\r") {
                bytes = rest;
            }
            let line = String::from_utf8_lossy(bytes);
            self.ingest_line(&line, origin, line_no)?;

            if line_no % PROGRESS_INTERVAL == 0 {
                if let Some(progress) = &self.progress {
                    progress.on_progress(
                        usize::try_from(self.stats.lines).unwrap_or(usize::MAX),
                        origin,
                    );
                }
            }
        }

        log::debug!("{origin}: {line_no} lines");
        Ok(line_no)
    }

    /// Ingest a single line.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError`] if the node or index entry cannot be allocated.
    /// Parse failures are not errors; they are logged and counted.
    pub fn ingest_line(&mut self, line: &str, origin: &str, line_no: u64) -> Result<(), ArenaError> {
        self.stats.lines += 1;

        let record = match self.format.parse_line(line) {
            Ok(record) => record,
            Err(reason) => {
                let err = ParseError {
                    origin: origin.to_string(),
                    line: line_no,
                    reason,
                };
                log::log!(PARSE_ERROR_LEVEL, "{err}");
                self.stats.parse_errors.push(err);
                return Ok(());
            }
        };

        if !self.include_zero && record.size == 0 && record.hash == Some(EMPTY_HASH) {
            self.stats.skipped_empty += 1;
            return Ok(());
        }

        let path = if self.normalize_unicode {
            normalize_path_str(record.path)
        } else {
            Cow::Borrowed(record.path)
        };
        let node = self.builder.insert(&path, record.size)?;
        self.stats.records += 1;

        // A path listed twice keeps the fingerprint it was first listed with.
        if self.builder.node(node).group().is_some() {
            return Ok(());
        }

        match record.hash.map(Fingerprint::parse) {
            Some(Some(fingerprint)) => {
                self.index.add(&mut self.builder, node, fingerprint)?;
                self.stats.indexed += 1;
            }
            Some(None) => {
                log::trace!("{origin}:{line_no}: hash is not a fingerprint, not indexed");
                self.stats.invalid_hashes += 1;
            }
            None => {}
        }
        Ok(())
    }

    /// Release the index and seal the tree.
    #[must_use]
    pub fn finish(mut self) -> (Tree, IngestStats) {
        self.stats.fingerprints = self.index.len();
        self.stats.index_bytes = self.index.allocated_bytes();
        self.index.clear();
        log::debug!(
            "Ingested {} records from {} lines ({} distinct fingerprints, index {} bytes)",
            self.stats.records,
            self.stats.lines,
            self.stats.fingerprints,
            self.stats.index_bytes
        );
        (self.builder.finish(), self.stats)
    }
}
