//! JSON output formatter for analysis results.
//!
//! Both listings carry a `summary` object with the run's counters and exit
//! code so scripts need not parse the text output.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "reclaimable": 1024,
//!       "members": [
//!         { "path": "photos/2019", "size": 1024, "role": "master", "is_directory": true, "is_virtual": false },
//!         { "path": "backup/2019", "size": 1024, "role": "slave", "is_directory": true, "is_virtual": false }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "records": 100,
//!     "total_size": 1048576,
//!     "duplicate_groups": 5,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 12,
//!     "exit_code": 0,
//!     "exit_code_name": "FD000"
//!   }
//! }
//! ```
//!
//! The `prune` listing uses [`JsonDeletionOutput`], which carries
//! `candidates` in place of `groups`.

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DeletionCandidate, DeletionPlan, DuplicateGroup, ScanSummary};
use crate::error::ExitCode;

/// Counters of one run, as serialized.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Listings read
    pub sources: usize,
    /// Records inserted into the tree
    pub records: u64,
    /// Empty-file records dropped
    pub skipped_empty: u64,
    /// Lines that failed to parse
    pub parse_errors: usize,
    /// Nodes in the tree
    pub nodes: usize,
    /// Size of everything listed in bytes
    pub total_size: u64,
    /// Number of reported groups
    pub duplicate_groups: usize,
    /// Members across all reported groups
    pub duplicate_members: usize,
    /// Space that can be reclaimed by keeping one copy per group (bytes)
    pub reclaimable_space: u64,
    /// Equal-content grouping passes
    pub equal_passes: u32,
    /// Master/slave grouping passes
    pub master_slave_passes: u32,
    /// Duration of the analysis in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "FD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            sources: summary.sources,
            records: summary.records,
            skipped_empty: summary.skipped_empty,
            parse_errors: summary.parse_errors,
            nodes: summary.nodes,
            total_size: summary.total_size,
            duplicate_groups: summary.duplicate_groups,
            duplicate_members: summary.duplicate_members,
            reclaimable_space: summary.reclaimable_space,
            equal_passes: summary.grouping.equal_passes,
            master_slave_passes: summary.grouping.master_slave_passes,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Group listing in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// Reported groups, largest reclaimable first
    pub groups: &'a [DuplicateGroup],
    pub summary: JsonSummary,
}

impl<'a> JsonOutput<'a> {
    /// Create a new JSON output from groups, summary and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use finddup::duplicates::ScanSummary;
    /// use finddup::output::json::JsonOutput;
    /// use finddup::error::ExitCode;
    ///
    /// let output = JsonOutput::new(&[], &ScanSummary::default(), ExitCode::NoDuplicates);
    /// let json = output.to_json().unwrap();
    /// assert!(json.contains("\"exit_code\":2"));
    /// ```
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            groups,
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Compact JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Write the listing followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        write_json(self, writer, pretty)
    }
}

/// Deletion listing in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDeletionOutput<'a> {
    /// Candidates, largest first
    pub candidates: &'a [DeletionCandidate],
    /// Number of keepers selected
    pub keepers: usize,
    /// Total size of all candidates
    pub total_bytes: u64,
    pub summary: JsonSummary,
}

impl<'a> JsonDeletionOutput<'a> {
    #[must_use]
    pub fn new(plan: &'a DeletionPlan, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            candidates: &plan.candidates,
            keepers: plan.keepers,
            total_bytes: plan.total_bytes(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Write the listing followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        write_json(self, writer, pretty)
    }
}

fn write_json<T: Serialize, W: Write>(
    value: &T,
    writer: &mut W,
    pretty: bool,
) -> Result<(), JsonOutputError> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, value)?;
    } else {
        serde_json::to_writer(&mut *writer, value)?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Failure to produce a JSON listing.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    #[error("failed to serialize JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write JSON: {0}")]
    Io(#[from] std::io::Error),
}
