//! CSV output formatter for analysis results.
//!
//! Provides machine-readable CSV output for spreadsheets and data analysis.
//! The group listing has one row per member:
//!
//! - `group_id`: 1-based position of the group in the listing
//! - `reclaimable`: reclaimable size of the group in bytes
//! - `role`: `master` or `slave`
//! - `size`: member size in bytes
//! - `path`: full path of the member
//!
//! The deletion listing has one row per candidate (`path`, `size`,
//! `is_directory`, `is_slave`, `kept`).

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::{DeletionPlan, DuplicateGroup, Role};

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct GroupRow<'a> {
    group_id: usize,
    reclaimable: u64,
    role: Role,
    size: u64,
    path: &'a str,
}

#[derive(Debug, Serialize)]
struct DeletionRow<'a> {
    path: &'a str,
    size: u64,
    is_directory: bool,
    is_slave: bool,
    kept: &'a str,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write the group rows to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for (idx, group) in self.groups.iter().enumerate() {
            for member in &group.members {
                csv_writer.serialize(GroupRow {
                    group_id: idx + 1,
                    reclaimable: group.reclaimable,
                    role: member.role,
                    size: member.size,
                    path: &member.path,
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

/// Write the deletion candidates of `plan` as CSV.
///
/// # Errors
///
/// Returns `CsvOutputError` if writing or serialization fails.
pub fn write_deletions<W: io::Write>(plan: &DeletionPlan, writer: W) -> Result<(), CsvOutputError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for candidate in &plan.candidates {
        csv_writer.serialize(DeletionRow {
            path: &candidate.path,
            size: candidate.size,
            is_directory: candidate.is_directory,
            is_slave: candidate.is_slave,
            kept: &candidate.kept,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
