//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Lifting file equivalence to directories ([`grouping`])
//! - Collecting reportable groups ([`groups`])
//! - Choosing keepers and listing deletions ([`keepers`])
//! - Running the whole pipeline ([`finder`])

pub mod finder;
pub mod grouping;
pub mod groups;
pub mod keepers;

pub use finder::{Analysis, DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use grouping::{group_tree, GroupingStats};
pub use groups::{build_group_list, DuplicateGroup, GroupMember, Role};
pub use keepers::{count_list_delete, find_keepers, plan_deletions, DeletionCandidate, DeletionPlan};
