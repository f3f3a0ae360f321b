//! Process exit codes and the JSON error report.

use serde::Serialize;

/// Exit codes for finddup.
///
/// - 0: Success (duplicates found)
/// - 1: Fatal error (unreadable input, bad configuration)
/// - 2: No duplicates found
/// - 3: Partial success (some listing lines could not be parsed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Analysis completed and duplicates were found.
    Success = 0,
    /// A listing could not be read, or the configuration is invalid.
    GeneralError = 1,
    /// No duplicates: Analysis completed but no duplicates were found.
    NoDuplicates = 2,
    /// Partial success: Analysis completed but some lines were skipped.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Numeric process exit status.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Stable code printed in front of error messages.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "FD000",
            Self::GeneralError => "FD001",
            Self::NoDuplicates => "FD002",
            Self::PartialSuccess => "FD003",
        }
    }

    /// Exit code for a finished analysis.
    ///
    /// Skipped lines take precedence over the duplicate outcome.
    #[must_use]
    pub fn for_outcome(found: bool, parse_errors: usize) -> Self {
        if parse_errors > 0 {
            Self::PartialSuccess
        } else if found {
            Self::Success
        } else {
            Self::NoDuplicates
        }
    }
}

/// Error report printed with `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "FD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Chain of underlying causes, outermost first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl StructuredError {
    /// Describe `err` and its cause chain.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
        }
    }
}
