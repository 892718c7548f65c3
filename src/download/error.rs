//! Error types for the verified download session.
//!
//! Every variant carries enough context (paths, byte counts, digests) for the
//! operator to diagnose a failed transfer from the message alone.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed source error from the byte stream being downloaded.
pub type StreamSourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can end a download session.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The caller supplied no expected digest; the session refuses to start.
    #[error("no expected digest supplied for {destination}; refusing to download unverified")]
    MissingDigest {
        /// Destination that would have been written.
        destination: PathBuf,
    },

    /// The expected digest is not hex of a supported length.
    #[error("expected digest '{digest}' is not a 32 (md5) or 64 (sha256) character hex string")]
    InvalidDigest {
        /// The rejected digest value.
        digest: String,
    },

    /// The staging file could not be created. Nothing was written.
    #[error("cannot create staging file {path}: {source}")]
    Staging {
        /// Staging path that failed to open.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Reading from the source stream failed mid-transfer.
    #[error("stream read failed after {bytes_transferred} bytes (partial data kept at {staging_path}): {source}")]
    StreamRead {
        /// Bytes successfully written to staging before the failure.
        bytes_transferred: u64,
        /// Staging file left for diagnosis.
        staging_path: PathBuf,
        /// The underlying stream error.
        #[source]
        source: StreamSourceError,
    },

    /// Writing or syncing the staging file failed.
    #[error("IO error writing {path} after {bytes_transferred} bytes: {source}")]
    Write {
        /// Bytes successfully written before the failure.
        bytes_transferred: u64,
        /// Staging path being written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The transferred content does not match the expected digest.
    #[error(
        "checksum mismatch: expected {expected}, got {actual} (unverified data kept at {staging_path})"
    )]
    ChecksumMismatch {
        /// Lower-cased trusted digest.
        expected: String,
        /// Lower-cased digest of the received bytes.
        actual: String,
        /// Staging file holding the rejected bytes.
        staging_path: PathBuf,
    },

    /// Renaming the verified staging file into place failed.
    #[error("cannot move {from} to {to}: {source}")]
    Commit {
        /// Staging path.
        from: PathBuf,
        /// Final destination path.
        to: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates a stream read error.
    pub fn stream_read(
        bytes_transferred: u64,
        staging_path: impl Into<PathBuf>,
        source: impl Into<StreamSourceError>,
    ) -> Self {
        Self::StreamRead {
            bytes_transferred,
            staging_path: staging_path.into(),
            source: source.into(),
        }
    }

    /// Creates a staging write/sync error.
    pub fn write(bytes_transferred: u64, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            bytes_transferred,
            path: path.into(),
            source,
        }
    }

    /// Bytes that reached the staging file before an abort, when known.
    #[must_use]
    pub fn bytes_transferred(&self) -> Option<u64> {
        match self {
            Self::StreamRead {
                bytes_transferred, ..
            }
            | Self::Write {
                bytes_transferred, ..
            } => Some(*bytes_transferred),
            Self::MissingDigest { .. }
            | Self::InvalidDigest { .. }
            | Self::Staging { .. }
            | Self::ChecksumMismatch { .. }
            | Self::Commit { .. } => None,
        }
    }

    /// True for a digest mismatch after a structurally complete transfer.
    #[must_use]
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::ChecksumMismatch { .. })
    }
}
