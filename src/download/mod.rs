//! Verified streaming downloads to disk.
//!
//! A [`VerifiedStreamDownloader`] writes a byte stream to a staging file next
//! to the destination, hashes it on the fly, and renames it into place only
//! when the digest matches the trusted value from the catalog.
//!
//! # Example
//!
//! ```no_run
//! use bookfetch_core::download::{NoProgress, VerifiedStreamDownloader};
//! use bookfetch_core::HttpClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let body = client.open_stream("https://mirror.example/get/dune.epub").await?;
//! let total = body.content_length();
//!
//! let mut session = VerifiedStreamDownloader::new(
//!     "./Frank Herbert - Dune.epub",
//!     "5eb63bbbe01eeed093cb22bb8f5acdc3",
//! )?;
//! let report = session.run(body.into_stream(), total, &mut NoProgress).await?;
//! println!("saved {} ({} bytes)", report.path.display(), report.bytes);
//! # Ok(())
//! # }
//! ```

mod constants;
mod digest;
mod error;
pub mod estimator;
pub mod filename;
mod progress;
mod session;

pub use constants::{DEFAULT_ETA_WINDOW, MAX_FILENAME_BYTES, STAGING_PREFIX};
pub use digest::{ContentHasher, DigestAlgorithm};
pub use error::{DownloadError, StreamSourceError};
pub use estimator::{EstimatorError, MovingAverage};
pub use filename::{artifact_filename, staging_path_for};
pub use progress::{EtaTracker, NoProgress, ProgressObserver, TransferProgress};
pub use session::{DownloadReport, SessionState, VerifiedStreamDownloader};
