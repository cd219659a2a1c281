//! Error taxonomy for a single update run.
//!
//! Every variant is fatal: nothing in the workflow is retried. The variants
//! exist so callers (and tests) can tell a deadline expiry from a network
//! failure, or a malformed response from a corrupted download.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    /// Bad or missing input: empty flag values, invalid API server URL,
    /// unresolved template placeholders.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network, decode, or non-2xx failure while fetching build metadata.
    #[error("failed to fetch build metadata: {0}")]
    MetadataFetch(String),

    /// The metadata lookup did not complete within its deadline.
    #[error("metadata fetch timed out after {:?}", .0)]
    Timeout(Duration),

    /// Stat on the output path failed for a reason other than "not found"
    /// (e.g. permissions). Never folded into "no prior download".
    #[error("failed to inspect {}: {source}", .path.display())]
    LocalState {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The metadata response is missing the expected artifact role or
    /// carries an absent/malformed checksum.
    #[error("unexpected response shape: {0}")]
    ResponseShape(String),

    /// The destination file could not be opened for writing.
    #[error("failed to open {}: {source}", .path.display())]
    OpenDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Network or disk failure mid-download. The partial file is left in
    /// place for inspection.
    #[error("transfer failed: {0}")]
    Transfer(String),

    /// The destination file could not be flushed/closed after a transfer
    /// that otherwise succeeded.
    #[error("failed to finalize {}: {source}", .path.display())]
    CloseDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The downloaded bytes hash to something other than the advertised
    /// checksum. The corrupted file is removed before this is returned.
    #[error("checksum mismatch for {}: expected {expected}, got {actual}", .path.display())]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}
