//! Content fingerprints for raw feed payloads.

use std::fmt;

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a raw payload.
///
/// Used only as a skip-if-unchanged gate: any changed byte yields a
/// different fingerprint, while byte-different but semantically equal
/// payloads simply cost one extra reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    #[must_use]
    pub fn of(raw: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(raw)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when `stored` is unset or differs from `self`.
    #[must_use]
    pub fn has_changed(&self, stored: Option<&Fingerprint>) -> bool {
        stored != Some(self)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
