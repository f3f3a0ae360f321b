//! Unicode normalization of listing paths.
//!
//! Listings produced on macOS spell accented names in NFD (decomposed) form
//! while most other systems use NFC. Two listings of the same tree taken on
//! different systems would otherwise produce two separate subtrees.
//!
//! ```
//! use finddup::scanner::path_utils::{normalize_path_str, paths_equal};
//!
//! let nfc = "café.txt";
//! let nfd = "cafe\u{0301}.txt";
//! assert_eq!(normalize_path_str(nfd), nfc);
//! assert!(paths_equal(nfc, nfd));
//! ```

use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;

/// Normalize `s` to NFC, borrowing when it is already normalized.
#[must_use]
pub fn normalize_path_str(s: &str) -> Cow<'_, str> {
    if unicode_normalization::is_nfc(s) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.nfc().collect())
    }
}

/// Whether two paths are equal after NFC normalization.
#[must_use]
pub fn paths_equal(a: &str, b: &str) -> bool {
    normalize_path_str(a) == normalize_path_str(b)
}
