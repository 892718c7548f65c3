//! Incremental content digests for download verification.
//!
//! The catalog publishes MD5 digests; SHA-256 is accepted as well so callers
//! holding a stronger trusted value can use it. The algorithm is picked from
//! the length of the expected hex digest.

use md5::Md5;
use sha2::{Digest, Sha256};

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// MD5 (32 hex characters).
    Md5,
    /// SHA-256 (64 hex characters).
    Sha256,
}

impl DigestAlgorithm {
    /// Infers the algorithm from a hex-encoded expected digest.
    ///
    /// Returns `None` when the value is not hex or has an unsupported length.
    #[must_use]
    pub fn for_hex_digest(expected: &str) -> Option<Self> {
        if !expected.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match expected.len() {
            32 => Some(Self::Md5),
            64 => Some(Self::Sha256),
            _ => None,
        }
    }

    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }
}

/// Running digest fed one chunk at a time.
#[derive(Debug, Clone)]
pub enum ContentHasher {
    /// MD5 accumulator.
    Md5(Md5),
    /// SHA-256 accumulator.
    Sha256(Sha256),
}

impl ContentHasher {
    /// Creates an empty accumulator for `algorithm`.
    #[must_use]
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => Self::Md5(Md5::new()),
            DigestAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
        }
    }

    /// Feeds `chunk` into the digest.
    pub fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Md5(hasher) => hasher.update(chunk),
            Self::Sha256(hasher) => hasher.update(chunk),
        }
    }

    /// Finishes the digest and returns it as lowercase hex.
    #[must_use]
    pub fn finalize_hex(self) -> String {
        match self {
            Self::Md5(hasher) => hex::encode(hasher.finalize()),
            Self::Sha256(hasher) => hex::encode(hasher.finalize()),
        }
    }
}
