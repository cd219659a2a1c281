//! Verified downloader: stream an artifact to disk while hashing it.
//!
//! The SHA-256 runs over the exact byte slices handed to the file writer,
//! so the digest always describes what actually landed on disk. Open,
//! transfer, and finalize failures are kept distinct; a finalize failure
//! after a failed transfer is appended to the transfer error rather than
//! replacing it.

use crate::api::http::{self, TransportError};
use crate::error::UpdateError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Digest and size of the bytes written by one download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// SHA-256 over the written bytes.
    pub digest: [u8; 32],
    /// Number of bytes written.
    pub bytes: u64,
}

/// File writer that hashes every chunk it writes.
struct DigestWriter {
    file: File,
    hasher: Sha256,
    bytes: u64,
}

impl DigestWriter {
    fn new(file: File) -> Self {
        DigestWriter {
            file,
            hasher: Sha256::new(),
            bytes: 0,
        }
    }

    fn consume(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.hasher.update(data);
        self.bytes += data.len() as u64;
        Ok(())
    }

    /// Flushes to disk and returns the outcome. The sync result is returned
    /// separately so the caller can combine it with the transfer result.
    fn finish(self) -> (io::Result<()>, DownloadOutcome) {
        let sync = self.file.sync_all();
        let outcome = DownloadOutcome {
            digest: self.hasher.finalize().into(),
            bytes: self.bytes,
        };
        (sync, outcome)
    }
}

/// Downloads `url` into `dest` (truncating any existing file) and returns
/// the digest of the written bytes. On transfer failure the partial file is
/// left in place; removing it is the caller's call.
pub fn download_to(url: &str, dest: &Path) -> Result<DownloadOutcome, UpdateError> {
    let file = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dest)
        .map_err(|source| UpdateError::OpenDestination {
            path: dest.to_path_buf(),
            source,
        })?;

    let mut writer = DigestWriter::new(file);
    let transfer = http::stream_get(url, |data| writer.consume(data));
    let (sync, outcome) = writer.finish();

    match (transfer, sync) {
        (Ok(()), Ok(())) => Ok(outcome),
        (Ok(()), Err(source)) => Err(UpdateError::CloseDestination {
            path: dest.to_path_buf(),
            source,
        }),
        (Err(e), Ok(())) => Err(transfer_error(e)),
        (Err(e), Err(sync_err)) => Err(UpdateError::Transfer(format!(
            "{}; additionally failed to finalize {}: {sync_err}",
            transfer_error_message(e),
            dest.display()
        ))),
    }
}

fn transfer_error(e: TransportError) -> UpdateError {
    UpdateError::Transfer(transfer_error_message(e))
}

fn transfer_error_message(e: TransportError) -> String {
    match e {
        TransportError::Sink(io_err) => format!("disk write failed: {io_err}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn file_url(path: &Path) -> String {
        format!("file://{}", path.display())
    }

    fn reference_sha256(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hasher.finalize().into()
    }

    fn download_payload(payload: &[u8]) -> (DownloadOutcome, Vec<u8>) {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        fs::write(&src, payload).unwrap();
        let dest = dir.path().join("dest.bin");

        let outcome = download_to(&file_url(&src), &dest).unwrap();
        let written = fs::read(&dest).unwrap();
        (outcome, written)
    }

    #[test]
    fn empty_payload() {
        let (outcome, written) = download_payload(b"");
        assert_eq!(outcome.bytes, 0);
        assert_eq!(outcome.digest, reference_sha256(b""));
        assert!(written.is_empty());
    }

    #[test]
    fn small_payload() {
        let payload = b"hello artifact";
        let (outcome, written) = download_payload(payload);
        assert_eq!(outcome.bytes, payload.len() as u64);
        assert_eq!(outcome.digest, reference_sha256(payload));
        assert_eq!(written, payload);
    }

    #[test]
    fn multi_megabyte_payload() {
        let payload: Vec<u8> = (0..3 * 1024 * 1024u32).map(|i| (i % 251) as u8).collect();
        let (outcome, written) = download_payload(&payload);
        assert_eq!(outcome.bytes, payload.len() as u64);
        assert_eq!(outcome.digest, reference_sha256(&payload));
        assert_eq!(written, payload);
    }

    #[test]
    fn truncates_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        fs::write(&src, b"new").unwrap();
        let dest = dir.path().join("dest.bin");
        fs::write(&dest, b"previous much longer contents").unwrap();

        download_to(&file_url(&src), &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn unopenable_destination_fails_before_transfer() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        fs::write(&src, b"x").unwrap();
        let dest = dir.path().join("no-such-subdir").join("dest.bin");

        let err = download_to(&file_url(&src), &dest).unwrap_err();
        assert!(matches!(err, UpdateError::OpenDestination { .. }));
    }

    #[test]
    fn missing_source_is_transfer_error_and_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dest.bin");

        let err = download_to("file:///nope/missing.bin", &dest).unwrap_err();
        assert!(matches!(err, UpdateError::Transfer(_)));
        // Destination was opened (and truncated) before the transfer, so it
        // stays behind for inspection.
        assert!(dest.exists());
    }

    #[test]
    fn digest_writer_counts_chunked_writes() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("out.bin")).unwrap();
        let mut writer = DigestWriter::new(file);
        writer.consume(b"abc").unwrap();
        writer.consume(b"").unwrap();
        writer.consume(b"defgh").unwrap();
        let (sync, outcome) = writer.finish();
        sync.unwrap();
        assert_eq!(outcome.bytes, 8);
        assert_eq!(outcome.digest, reference_sha256(b"abcdefgh"));
    }
}
