//! Update decision: pure comparison of remote build time vs local mtime.

use crate::probe::LocalFileState;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Download the latest build.
    Proceed,
    /// The local file is already newer; nothing to do.
    Skip,
}

/// Skips only when a local file exists and its mtime is strictly after the
/// remote build time. A tie re-downloads: a build stamped in the same
/// instant the file was written could still be a different artifact, so the
/// bias is toward re-checking.
pub fn decide(remote_build_time: DateTime<Utc>, local: LocalFileState) -> Decision {
    match local {
        LocalFileState::Present { modified } if modified > remote_build_time => Decision::Skip,
        _ => Decision::Proceed,
    }
}
