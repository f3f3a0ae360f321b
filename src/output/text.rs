//! Plain text listings.
//!
//! The group listing prints, for each group, a header with the reclaimable
//! size followed by one line per member:
//!
//! ```text
//! group size : 1536 (1.5k)
//!  M 1536 photos/2019
//!  S 1024 backup/2019
//!
//! ```
//!
//! The deletion listing groups candidates by size, largest first, and ends
//! with the total.

use std::io::{self, Write};

use yansi::Paint;

use super::to_human_str;
use crate::duplicates::{DeletionPlan, DuplicateGroup, Role};

/// Text formatter for groups and deletion plans.
pub struct TextOutput {
    color: bool,
}

impl TextOutput {
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn marker(&self, role: Role) -> String {
        let marker = role.marker();
        match (self.color, role) {
            (false, _) => marker.to_string(),
            (true, Role::Master) => marker.green().bold().to_string(),
            (true, Role::Slave) => marker.yellow().to_string(),
        }
    }

    fn header(&self, label: &str, bytes: u64) -> String {
        let line = format!("{label} : {bytes} ({})", to_human_str(bytes));
        if self.color {
            line.bold().to_string()
        } else {
            line
        }
    }

    /// Write every group, in the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_groups<W: Write>(&self, writer: &mut W, groups: &[DuplicateGroup]) -> io::Result<()> {
        for group in groups {
            writeln!(writer, "{}", self.header("group size", group.reclaimable))?;
            for member in &group.members {
                writeln!(
                    writer,
                    " {} {} {}",
                    self.marker(member.role),
                    member.size,
                    member.path
                )?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Write the deletion candidates of `plan`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_deletions<W: Write>(&self, writer: &mut W, plan: &DeletionPlan) -> io::Result<()> {
        let mut current: Option<u64> = None;
        for candidate in &plan.candidates {
            if current != Some(candidate.size) {
                if current.is_some() {
                    writeln!(writer)?;
                }
                writeln!(writer, "{}", self.header("delete size", candidate.size))?;
                current = Some(candidate.size);
            }
            writeln!(writer, " {}", candidate.path)?;
            writeln!(writer, "   = {}", candidate.kept)?;
        }
        if current.is_some() {
            writeln!(writer)?;
        }
        writeln!(writer, "{}", self.header("total", plan.total_bytes()))?;
        Ok(())
    }
}
