//! Verified, atomically committed stream download.
//!
//! Bytes are written to a dot-prefixed staging sibling of the destination
//! while a digest is accumulated over the same chunks. Only after a clean end
//! of stream, an fsync, and a digest match is the staging file renamed onto
//! the destination. Every other outcome leaves the destination untouched.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures_util::{Stream, StreamExt};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};

use super::constants::DEFAULT_ETA_WINDOW;
use super::digest::{ContentHasher, DigestAlgorithm};
use super::error::DownloadError;
use super::filename::staging_path_for;
use super::progress::{EtaTracker, ProgressObserver};

/// Lifecycle of a [`VerifiedStreamDownloader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, nothing touched on disk.
    Idle,
    /// Opening the staging file.
    Staging,
    /// Copying stream chunks into staging.
    Transferring,
    /// Stream finished; syncing and comparing digests.
    Verifying,
    /// Digest matched and the destination now holds the content.
    Committed,
    /// Digest mismatch; staging kept, destination untouched.
    Rejected,
    /// Transfer or commit failed; destination untouched.
    Aborted,
}

impl SessionState {
    /// True once the session can no longer make progress.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Rejected | Self::Aborted)
    }
}

/// Outcome of a committed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    /// Final destination path.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
    /// Lower-case hex digest of the content, equal to the expected digest.
    pub digest: String,
    /// Wall-clock transfer time.
    pub elapsed: Duration,
}

/// Streams one artifact to disk and commits it only if its digest matches.
#[derive(Debug)]
pub struct VerifiedStreamDownloader {
    destination: PathBuf,
    staging_path: PathBuf,
    expected_digest: String,
    algorithm: DigestAlgorithm,
    eta_window: usize,
    state: SessionState,
}

impl VerifiedStreamDownloader {
    /// Prepares a session targeting `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::MissingDigest`] for an empty digest and
    /// [`DownloadError::InvalidDigest`] for one that is neither 32 nor 64 hex
    /// characters. No file is created in either case.
    pub fn new(
        destination: impl Into<PathBuf>,
        expected_digest: &str,
    ) -> Result<Self, DownloadError> {
        Self::with_eta_window(destination, expected_digest, DEFAULT_ETA_WINDOW)
    }

    /// Like [`new`](Self::new) with an explicit ETA smoothing window.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_eta_window(
        destination: impl Into<PathBuf>,
        expected_digest: &str,
        eta_window: usize,
    ) -> Result<Self, DownloadError> {
        let destination = destination.into();
        let expected_digest = expected_digest.trim().to_ascii_lowercase();
        if expected_digest.is_empty() {
            return Err(DownloadError::MissingDigest { destination });
        }
        let algorithm = DigestAlgorithm::for_hex_digest(&expected_digest).ok_or_else(|| {
            DownloadError::InvalidDigest {
                digest: expected_digest.clone(),
            }
        })?;

        Ok(Self {
            staging_path: staging_path_for(&destination),
            destination,
            expected_digest,
            algorithm,
            eta_window,
            state: SessionState::Idle,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Final destination path.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Staging path used while transferring.
    #[must_use]
    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    /// Digest algorithm selected from the expected digest.
    #[must_use]
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Drains `stream` into staging, verifies, and commits.
    ///
    /// `total_bytes` is the declared length used only for progress; the
    /// digest alone decides acceptance. `observer` receives one snapshot per
    /// chunk.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Staging`] if the staging file cannot be opened
    /// - [`DownloadError::StreamRead`] if the source stream yields an error
    /// - [`DownloadError::Write`] if writing or syncing staging fails
    /// - [`DownloadError::ChecksumMismatch`] if the digest does not match
    /// - [`DownloadError::Commit`] if the final rename fails
    #[instrument(
        skip(self, stream, observer),
        fields(destination = %self.destination.display(), algorithm = self.algorithm.as_str())
    )]
    pub async fn run<S, B, E, O>(
        &mut self,
        stream: S,
        total_bytes: Option<u64>,
        observer: &mut O,
    ) -> Result<DownloadReport, DownloadError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: std::error::Error + Send + Sync + 'static,
        O: ProgressObserver + ?Sized,
    {
        let result = self.transfer(stream, total_bytes, observer).await;
        self.state = match &result {
            Ok(_) => SessionState::Committed,
            Err(e) if e.is_integrity_failure() => SessionState::Rejected,
            Err(_) => SessionState::Aborted,
        };

        match &result {
            Ok(report) => info!(
                path = %report.path.display(),
                bytes = report.bytes,
                elapsed_ms = report.elapsed.as_millis(),
                "download committed"
            ),
            Err(e) => warn!(
                staging = %self.staging_path.display(),
                error = %e,
                "download not committed"
            ),
        }
        result
    }

    async fn transfer<S, B, E, O>(
        &mut self,
        stream: S,
        total_bytes: Option<u64>,
        observer: &mut O,
    ) -> Result<DownloadReport, DownloadError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: std::error::Error + Send + Sync + 'static,
        O: ProgressObserver + ?Sized,
    {
        self.state = SessionState::Staging;
        let file = File::create(&self.staging_path)
            .await
            .map_err(|source| DownloadError::Staging {
                path: self.staging_path.clone(),
                source,
            })?;
        let mut writer = BufWriter::new(file);
        debug!(staging = %self.staging_path.display(), "staging file opened");

        self.state = SessionState::Transferring;
        let mut hasher = ContentHasher::new(self.algorithm);
        let mut tracker = EtaTracker::new(total_bytes, self.eta_window);
        let mut bytes_transferred: u64 = 0;
        let started = Instant::now();

        let mut stream = std::pin::pin!(stream);
        let copied: Result<(), DownloadError> = async {
            while let Some(item) = stream.next().await {
                let chunk = item.map_err(|e| {
                    DownloadError::stream_read(bytes_transferred, &self.staging_path, e)
                })?;
                let chunk = chunk.as_ref();
                if chunk.is_empty() {
                    continue;
                }

                hasher.update(chunk);
                writer
                    .write_all(chunk)
                    .await
                    .map_err(|e| DownloadError::write(bytes_transferred, &self.staging_path, e))?;
                bytes_transferred += chunk.len() as u64;

                observer.on_progress(&tracker.observe(bytes_transferred, started.elapsed()));
            }
            Ok(())
        }
        .await;

        if let Err(error) = copied {
            // Staging must hold exactly the bytes the error reports.
            if let Err(flush_error) = writer.flush().await {
                warn!(error = %flush_error, "could not flush partial staging file");
            } else if let Err(sync_error) = writer.get_mut().sync_all().await {
                warn!(error = %sync_error, "could not sync partial staging file");
            }
            return Err(error);
        }

        self.state = SessionState::Verifying;
        writer
            .flush()
            .await
            .map_err(|e| DownloadError::write(bytes_transferred, &self.staging_path, e))?;
        writer
            .get_mut()
            .sync_all()
            .await
            .map_err(|e| DownloadError::write(bytes_transferred, &self.staging_path, e))?;
        drop(writer);

        let actual = hasher.finalize_hex();
        if actual != self.expected_digest {
            return Err(DownloadError::ChecksumMismatch {
                expected: self.expected_digest.clone(),
                actual,
                staging_path: self.staging_path.clone(),
            });
        }

        tokio::fs::rename(&self.staging_path, &self.destination)
            .await
            .map_err(|source| DownloadError::Commit {
                from: self.staging_path.clone(),
                to: self.destination.clone(),
                source,
            })?;

        Ok(DownloadReport {
            path: self.destination.clone(),
            bytes: bytes_transferred,
            digest: actual,
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures_util::stream;

    use super::super::progress::{NoProgress, TransferProgress};
    use super::*;

    const HELLO_WORLD_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";
    const HELLO_WORLD_SHA256: &str =
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    fn chunks(
        parts: &[&'static [u8]],
    ) -> impl Stream<Item = Result<&'static [u8], std::io::Error>> {
        stream::iter(parts.iter().copied().map(Ok).collect::<Vec<_>>())
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_matching_digest_commits_and_removes_staging() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Herbert - Dune.epub");
        let mut session = VerifiedStreamDownloader::new(&dest, HELLO_WORLD_MD5).unwrap();
        assert_eq!(session.state(), SessionState::Idle);

        let report = session
            .run(chunks(&[b"hello ", b"world"]), Some(11), &mut NoProgress)
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Committed);
        assert_eq!(report.bytes, 11);
        assert_eq!(report.digest, HELLO_WORLD_MD5);
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello world");
        assert_eq!(dir_entries(dir.path()), vec!["Herbert - Dune.epub"]);
    }

    #[tokio::test]
    async fn test_uppercase_expected_digest_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("book.pdf");
        let mut session =
            VerifiedStreamDownloader::new(&dest, &HELLO_WORLD_SHA256.to_uppercase()).unwrap();
        assert_eq!(session.algorithm(), DigestAlgorithm::Sha256);

        session
            .run(chunks(&[b"hello world"]), None, &mut NoProgress)
            .await
            .unwrap();
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn test_mismatch_rejects_and_keeps_staging() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("book.epub");
        let wrong = "00000000000000000000000000000000";
        let mut session = VerifiedStreamDownloader::new(&dest, wrong).unwrap();

        let err = session
            .run(chunks(&[b"hello ", b"world"]), Some(11), &mut NoProgress)
            .await
            .unwrap_err();

        assert_eq!(session.state(), SessionState::Rejected);
        match err {
            DownloadError::ChecksumMismatch {
                expected,
                actual,
                staging_path,
            } => {
                assert_eq!(expected, wrong);
                assert_eq!(actual, HELLO_WORLD_MD5);
                assert_eq!(std::fs::read(staging_path).unwrap(), b"hello world");
            }
            other => panic!("expected ChecksumMismatch, got {other:?}"),
        }
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_mismatch_never_overwrites_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("book.epub");
        std::fs::write(&dest, b"previous good copy").unwrap();

        let mut session =
            VerifiedStreamDownloader::new(&dest, "ffffffffffffffffffffffffffffffff").unwrap();
        let _ = session
            .run(chunks(&[b"tampered"]), None, &mut NoProgress)
            .await
            .unwrap_err();

        assert_eq!(std::fs::read(&dest).unwrap(), b"previous good copy");
    }

    #[tokio::test]
    async fn test_stream_error_aborts_with_partial_count() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("book.epub");
        let mut session = VerifiedStreamDownloader::new(&dest, HELLO_WORLD_MD5).unwrap();

        let items: Vec<Result<&'static [u8], std::io::Error>> = vec![
            Ok(b"hello"),
            Ok(b" "),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "peer reset",
            )),
        ];
        let err = session
            .run(stream::iter(items), Some(11), &mut NoProgress)
            .await
            .unwrap_err();

        assert_eq!(session.state(), SessionState::Aborted);
        assert!(matches!(err, DownloadError::StreamRead { .. }));
        assert_eq!(err.bytes_transferred(), Some(6));
        assert!(!dest.exists());
        assert_eq!(std::fs::read(session.staging_path()).unwrap(), b"hello ");
    }

    #[tokio::test]
    async fn test_stream_error_keeps_every_written_byte_in_staging() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("book.pdf");
        let mut session = VerifiedStreamDownloader::new(&dest, HELLO_WORLD_MD5).unwrap();

        let block = vec![7u8; 5000];
        let items: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(block.clone()),
            Ok(block.clone()),
            Ok(block),
            Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "body ended early",
            )),
        ];
        let err = session
            .run(stream::iter(items), Some(20_000), &mut NoProgress)
            .await
            .unwrap_err();

        assert_eq!(err.bytes_transferred(), Some(15_000));
        let staged = std::fs::metadata(session.staging_path()).unwrap().len();
        assert_eq!(Some(staged), err.bytes_transferred());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_missing_digest_refuses_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("book.epub");

        let err = VerifiedStreamDownloader::new(&dest, "  ").unwrap_err();
        assert!(matches!(err, DownloadError::MissingDigest { .. }));

        let err = VerifiedStreamDownloader::new(&dest, "not-a-digest").unwrap_err();
        assert!(matches!(err, DownloadError::InvalidDigest { .. }));

        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_unwritable_staging_directory_is_staging_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing-subdir").join("book.epub");
        let mut session = VerifiedStreamDownloader::new(&dest, HELLO_WORLD_MD5).unwrap();

        let err = session
            .run(chunks(&[b"hello world"]), None, &mut NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Staging { .. }));
        assert_eq!(session.state(), SessionState::Aborted);
    }

    #[tokio::test]
    async fn test_progress_reported_per_chunk_with_clamped_percent() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("book.epub");
        let mut session = VerifiedStreamDownloader::new(&dest, HELLO_WORLD_MD5).unwrap();

        let mut seen: Vec<TransferProgress> = Vec::new();
        let mut observer = |p: &TransferProgress| seen.push(*p);
        // declared total smaller than the body; percent must still cap at 100
        session
            .run(chunks(&[b"hello ", b"world"]), Some(6), &mut observer)
            .await
            .unwrap();

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].bytes_transferred, 6);
        assert_eq!(seen[1].bytes_transferred, 11);
        assert!(seen.iter().all(|p| p.percent == Some(100)));
    }

    #[tokio::test]
    async fn test_unknown_total_reports_indeterminate_progress() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("book.epub");
        let mut session = VerifiedStreamDownloader::new(&dest, HELLO_WORLD_MD5).unwrap();

        let mut percents = Vec::new();
        let mut observer = |p: &TransferProgress| percents.push((p.percent, p.eta));
        session
            .run(chunks(&[b"hello world"]), None, &mut observer)
            .await
            .unwrap();
        assert_eq!(percents, vec![(None, None)]);
    }
}
