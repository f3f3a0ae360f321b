//! Listing record format and line parser.
//!
//! A listing line is a fixed sequence of space-terminated fields followed by
//! the path, which runs to the end of the line and may contain spaces. The
//! sequence is described by a format string: `5` is the hash field, `s` the
//! size field and `-` a field that is read and ignored.
//!
//! ```
//! use finddup::scanner::RecordFormat;
//!
//! let format: RecordFormat = "5s".parse().unwrap();
//! let rec = format
//!     .parse_line("d41d8cd98f00b204e9800998ecf8427e 0 some dir/empty file")
//!     .unwrap();
//! assert_eq!(rec.size, 0);
//! assert_eq!(rec.path, "some dir/empty file");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One field of a listing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Hash,
    Size,
    Skip,
}

impl Field {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '5' => Some(Self::Hash),
            's' => Some(Self::Size),
            '-' => Some(Self::Skip),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Self::Hash => '5',
            Self::Size => 's',
            Self::Skip => '-',
        }
    }
}

/// Invalid format string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid format character {ch:?} at position {position} (expected '5', 's' or '-')")]
    InvalidChar { ch: char, position: usize },
}

/// Why a single line could not be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The line ended before field number `index` (0-based) and its separator.
    #[error("missing field {index}")]
    MissingField { index: usize },
    /// Nothing but spaces after the last field.
    #[error("missing path")]
    MissingPath,
}

/// Parsed listing line, borrowing from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    /// Raw hash field, if the format has one.
    pub hash: Option<&'a str>,
    /// Size in bytes; a size field that is not all digits reads as 0.
    pub size: u64,
    pub path: &'a str,
}

/// Ordered field layout of a listing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFormat {
    fields: Vec<Field>,
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self {
            fields: vec![Field::Hash, Field::Size],
        }
    }
}

impl FromStr for RecordFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s
            .chars()
            .enumerate()
            .map(|(position, ch)| {
                Field::from_char(ch).ok_or(FormatError::InvalidChar { ch, position })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in &self.fields {
            write!(f, "{}", field.as_char())?;
        }
        Ok(())
    }
}

impl RecordFormat {
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Whether lines carry a hash field.
    #[must_use]
    pub fn has_hash(&self) -> bool {
        self.fields.contains(&Field::Hash)
    }

    /// Split one line into its fields.
    ///
    /// Fields are separated by runs of spaces. Every field must be followed by
    /// at least one space, and the path must not be empty.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if a field or the path is missing.
    pub fn parse_line<'a>(&self, line: &'a str) -> Result<Record<'a>, RecordError> {
        let mut rest = line;
        let mut hash = None;
        let mut size_field = None;

        for (index, field) in self.fields.iter().enumerate() {
            let start = rest.trim_start_matches(' ');
            let end = start.find(' ').ok_or(RecordError::MissingField { index })?;
            if end == 0 {
                return Err(RecordError::MissingField { index });
            }
            let value = &start[..end];
            match field {
                Field::Hash => hash = Some(value),
                Field::Size => size_field = Some(value),
                Field::Skip => {}
            }
            rest = &start[end..];
        }

        let path = rest.trim_start_matches(' ');
        if path.is_empty() {
            return Err(RecordError::MissingPath);
        }

        Ok(Record {
            hash,
            size: size_field.map_or(0, parse_size),
            path,
        })
    }
}

fn parse_size(field: &str) -> u64 {
    if field.bytes().all(|b| b.is_ascii_digit()) {
        field.parse().unwrap_or(u64::MAX)
    } else {
        0
    }
}
