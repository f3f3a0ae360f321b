//! Duplicate finder pipeline.
//!
//! # Overview
//!
//! [`DuplicateFinder`] runs the whole analysis for one invocation:
//! 1. **Ingest**: read every listing into the path tree, grouping files by
//!    fingerprint (see [`crate::scanner`])
//! 2. **Seal**: break the ingestion-time sibling cycles and release the index
//! 3. **Group**: lift file equivalence to directories (see
//!    [`crate::duplicates::grouping`])
//! 4. **Report**: collect the duplicate groups (see
//!    [`crate::duplicates::groups`])
//!
//! Keeper selection for deletion is a separate step on the returned
//! [`Analysis`].
//!
//! # Example
//!
//! ```
//! use finddup::duplicates::{DuplicateFinder, FinderConfig};
//!
//! let listing = "\
//! 11111111111111111111111111111111 100 photos/a.jpg
//! 11111111111111111111111111111111 100 backup/a.jpg
//! ";
//! let finder = DuplicateFinder::new(FinderConfig::default());
//! let analysis = finder.analyze_reader(listing.as_bytes(), "listing").unwrap();
//!
//! assert_eq!(analysis.groups.len(), 1);
//! assert_eq!(analysis.summary.reclaimable_space, 100);
//! ```

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use serde::Serialize;

use super::grouping::{group_tree, GroupingStats};
use super::groups::{build_group_list, DuplicateGroup};
use super::keepers::{plan_deletions, DeletionPlan};
use crate::arena::ArenaError;
use crate::progress::ProgressCallback;
use crate::scanner::{FormatError, IngestError, IngestStats, Ingestor, ParseError, RecordFormat, STDIN_NAME};
use crate::tree::Tree;

/// Configuration for the duplicate finder.
///
/// Every option of a run lives here and is passed down explicitly.
#[derive(Clone)]
pub struct FinderConfig {
    /// Field layout of the listing lines.
    pub format: RecordFormat,
    /// Keep empty-file records instead of dropping them.
    pub include_zero: bool,
    /// Only group directories whose contents match exactly.
    pub equal_only: bool,
    /// Also report groups implied by a reported parent group.
    pub child_groups: bool,
    /// Normalize paths to NFC before insertion.
    pub normalize_unicode: bool,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("format", &self.format)
            .field("include_zero", &self.include_zero)
            .field("equal_only", &self.equal_only)
            .field("child_groups", &self.child_groups)
            .field("normalize_unicode", &self.normalize_unicode)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            format: RecordFormat::default(),
            include_zero: false,
            equal_only: false,
            child_groups: false,
            normalize_unicode: false,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the listing format.
    #[must_use]
    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }

    /// Parse and set the listing format.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] for characters other than `5`, `s` and `-`.
    pub fn with_format_str(self, format: &str) -> Result<Self, FormatError> {
        Ok(self.with_format(format.parse()?))
    }

    #[must_use]
    pub fn with_include_zero(mut self, include: bool) -> Self {
        self.include_zero = include;
        self
    }

    #[must_use]
    pub fn with_equal_only(mut self, equal_only: bool) -> Self {
        self.equal_only = equal_only;
        self
    }

    #[must_use]
    pub fn with_child_groups(mut self, child_groups: bool) -> Self {
        self.child_groups = child_groups;
        self
    }

    #[must_use]
    pub fn with_normalize_unicode(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from one analysis.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    /// Listings read
    pub sources: usize,
    /// Lines read
    pub lines: u64,
    /// Records inserted into the tree
    pub records: u64,
    /// Empty-file records dropped
    pub skipped_empty: u64,
    /// Lines that failed to parse
    pub parse_errors: usize,
    /// Nodes in the tree, root included
    pub nodes: usize,
    /// Distinct fingerprints
    pub fingerprints: usize,
    /// Size of everything listed, in bytes
    pub total_size: u64,
    /// Number of reported groups
    pub duplicate_groups: usize,
    /// Members across all reported groups
    pub duplicate_members: usize,
    /// Sum of the groups' reclaimable sizes
    pub reclaimable_space: u64,
    /// Bytes reserved for nodes and names
    pub arena_bytes: usize,
    /// Bytes the fingerprint index held before it was released
    pub index_bytes: usize,
    /// Fixpoint iteration counts
    pub grouping: GroupingStats,
    /// Wall time of the analysis
    #[serde(skip)]
    pub scan_duration: Duration,
}

impl ScanSummary {
    fn from_ingest(stats: &IngestStats) -> Self {
        Self {
            sources: stats.sources,
            lines: stats.lines,
            records: stats.records,
            skipped_empty: stats.skipped_empty,
            parse_errors: stats.parse_errors.len(),
            fingerprints: stats.fingerprints,
            index_bytes: stats.index_bytes,
            ..Self::default()
        }
    }

    /// Percentage of the listed size that could be reclaimed.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that can occur during an analysis.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// An I/O error occurred while reading standard input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An I/O error occurred while reading a listing file.
    #[error("I/O error for {path}: {source}")]
    IoWithPath {
        /// Listing being read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The tree or index could not grow any further.
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// The listing format string is invalid.
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl From<IngestError> for FinderError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Io { origin, source } if origin == STDIN_NAME => Self::Io(source),
            IngestError::Io { origin, source } => Self::IoWithPath {
                path: PathBuf::from(origin),
                source,
            },
            IngestError::Arena(e) => Self::Arena(e),
        }
    }
}

/// Result of an analysis.
#[derive(Debug)]
pub struct Analysis {
    /// The grouped tree
    pub tree: Tree,
    /// Reported groups, largest reclaimable size first
    pub groups: Vec<DuplicateGroup>,
    pub summary: ScanSummary,
    /// Lines that could not be parsed, in input order
    pub parse_errors: Vec<ParseError>,
}

impl Analysis {
    /// Select keepers and list what can be deleted.
    #[must_use]
    pub fn plan_deletions(&mut self) -> DeletionPlan {
        log::info!("Selecting keepers");
        plan_deletions(&mut self.tree)
    }

    /// Whether any group was found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// Runs listings through ingestion, grouping and reporting.
///
/// # Example
///
/// ```no_run
/// use finddup::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::PathBuf;
///
/// let finder = DuplicateFinder::new(FinderConfig::default().with_equal_only(true));
/// let analysis = finder
///     .analyze_paths(&[PathBuf::from("disk1.md5"), PathBuf::from("disk2.md5")])
///     .unwrap();
/// println!("Reclaimable: {}", analysis.summary.reclaimable_display());
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Analyze the listings at `inputs`, in order.
    ///
    /// An empty slice, or an input named `-`, reads standard input.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if a listing cannot be read or memory runs out.
    /// Unparseable lines are not errors; they are returned in
    /// [`Analysis::parse_errors`].
    pub fn analyze_paths(&self, inputs: &[PathBuf]) -> Result<Analysis, FinderError> {
        let start = Instant::now();
        let mut ingestor = self.ingestor()?;
        self.phase_start("ingest");

        if inputs.is_empty() {
            ingest_stdin(&mut ingestor)?;
        }
        for input in inputs {
            if input.as_os_str() == "-" {
                ingest_stdin(&mut ingestor)?;
            } else {
                log::info!("Building tree from {}", input.display());
                ingest_file(&mut ingestor, input)?;
            }
        }

        self.phase_end("ingest");
        Ok(self.analyze(ingestor, start))
    }

    /// Analyze a single listing read from `reader`, named `origin` in
    /// messages.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if reading fails or memory runs out.
    pub fn analyze_reader<R: BufRead>(
        &self,
        reader: R,
        origin: &str,
    ) -> Result<Analysis, FinderError> {
        let start = Instant::now();
        let mut ingestor = self.ingestor()?;
        self.phase_start("ingest");
        log::info!("Building tree from {origin}");
        ingestor.ingest_reader(reader, origin)?;
        self.phase_end("ingest");
        Ok(self.analyze(ingestor, start))
    }

    fn ingestor(&self) -> Result<Ingestor, FinderError> {
        let mut ingestor = Ingestor::new(self.config.format.clone())?
            .include_zero(self.config.include_zero)
            .normalize_unicode(self.config.normalize_unicode);
        if let Some(cb) = &self.config.progress_callback {
            ingestor = ingestor.with_progress(Arc::clone(cb));
        }
        Ok(ingestor)
    }

    fn analyze(&self, ingestor: Ingestor, start: Instant) -> Analysis {
        log::info!("Breaking cycles");
        let (mut tree, stats) = ingestor.finish();
        let mut summary = ScanSummary::from_ingest(&stats);
        let parse_errors = stats.parse_errors;

        self.phase_start("grouping");
        summary.grouping = group_tree(
            &mut tree,
            self.config.equal_only,
            self.config.progress_callback.as_deref(),
        );
        self.phase_end("grouping");
        log::debug!(
            "Grouping took {} equal and {} master/slave passes",
            summary.grouping.equal_passes,
            summary.grouping.master_slave_passes
        );

        log::info!("Building groups");
        let groups = build_group_list(&mut tree, self.config.child_groups);

        summary.nodes = tree.len();
        summary.total_size = tree.node(tree.root()).size();
        summary.arena_bytes = tree.allocated_bytes();
        summary.duplicate_groups = groups.len();
        summary.duplicate_members = groups.iter().map(DuplicateGroup::len).sum();
        summary.reclaimable_space = groups.iter().map(|g| g.reclaimable).sum();
        summary.scan_duration = start.elapsed();
        log::debug!(
            "Arena: {} nodes, {} bytes; index peaked at {} bytes",
            summary.nodes,
            summary.arena_bytes,
            summary.index_bytes
        );

        Analysis {
            tree,
            groups,
            summary,
            parse_errors,
        }
    }

    fn phase_start(&self, phase: &str) {
        if let Some(cb) = &self.config.progress_callback {
            cb.on_phase_start(phase, 0);
        }
    }

    fn phase_end(&self, phase: &str) {
        if let Some(cb) = &self.config.progress_callback {
            cb.on_phase_end(phase);
        }
    }
}

fn ingest_stdin(ingestor: &mut Ingestor) -> Result<(), FinderError> {
    log::info!("Building tree from {STDIN_NAME}");
    let stdin = io::stdin();
    ingestor.ingest_reader(stdin.lock(), STDIN_NAME)?;
    Ok(())
}

fn ingest_file(ingestor: &mut Ingestor, path: &Path) -> Result<(), FinderError> {
    ingestor.ingest_path(path)?;
    Ok(())
}
