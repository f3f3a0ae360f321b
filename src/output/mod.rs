//! Output formatters for analysis results.
//!
//! This module provides different output formats:
//! - [`text`]: the plain group listing and deletion listing
//! - [`tree`]: a dump of the grouped tree for debugging
//! - [`json`] for automation and scripting
//! - [`csv`] for spreadsheet import
//! - [`script`]: shell scripts that delete the planned candidates
//!
//! # Example
//!
//! ```no_run
//! use finddup::duplicates::DuplicateFinder;
//! use finddup::output::json::JsonOutput;
//! use finddup::error::ExitCode;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let analysis = finder.analyze_paths(&[PathBuf::from("listing.md5")]).unwrap();
//!
//! let output = JsonOutput::new(&analysis.groups, &analysis.summary, ExitCode::Success);
//! output.write_to(&mut std::io::stdout(), true).unwrap();
//! ```

pub mod csv;
pub mod json;
pub mod script;
pub mod text;
pub mod tree;

pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use script::{ScriptOutput, ScriptType};
pub use text::TextOutput;
pub use tree::TreeDump;

const UNITS: [char; 8] = ['k', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y'];

/// Render a byte count on the base-1024 ladder used in group headers.
///
/// Values below 1000 are printed as is. Larger values get one decimal while
/// under 10 units and none while under 1000 units.
///
/// ```
/// use finddup::output::to_human_str;
///
/// assert_eq!(to_human_str(999), "999");
/// assert_eq!(to_human_str(1000), "0.9k");
/// assert_eq!(to_human_str(1536), "1.5k");
/// assert_eq!(to_human_str(500 * 1024), "500k");
/// ```
#[must_use]
pub fn to_human_str(bytes: u64) -> String {
    if bytes < 1000 {
        return bytes.to_string();
    }
    // tenths of the current unit
    let mut v = u128::from(bytes) * 10;
    for unit in UNITS {
        v /= 1024;
        if v < 100 {
            return format!("{}.{}{}", v / 10, v % 10, unit);
        } else if v < 10_000 {
            return format!("{}{}", v / 10, unit);
        }
    }
    "?".to_string()
}
