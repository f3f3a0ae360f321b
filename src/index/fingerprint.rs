//! 128-bit content fingerprints.

use std::fmt;
use std::str::FromStr;

/// Hex digest of the empty byte sequence.
pub const EMPTY_HASH: &str = "d41d8cd98f00b204e9800998ecf8427e";

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_HEX_LEN: usize = 32;

/// Content fingerprint of a file (an MD5 digest in practice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 16]);

/// Error for a hash field that is not a well-formed fingerprint.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid fingerprint {0:?}: expected {FINGERPRINT_HEX_LEN} lowercase hex digits")]
pub struct InvalidFingerprint(pub String);

impl Fingerprint {
    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Parse exactly 32 lowercase hex digits.
    #[must_use]
    pub fn parse(hex: &str) -> Option<Self> {
        if hex.len() != FINGERPRINT_HEX_LEN {
            return None;
        }
        let mut out = [0u8; 16];
        for (byte, pair) in out.iter_mut().zip(hex.as_bytes().chunks_exact(2)) {
            *byte = (nibble(pair[0])? << 4) | nibble(pair[1])?;
        }
        Some(Self(out))
    }
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

impl FromStr for Fingerprint {
    type Err = InvalidFingerprint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidFingerprint(s.to_string()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}
