//! Local state probe: does the output file exist, and from when.

use crate::error::UpdateError;
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::Path;

/// What the filesystem says about the output path. The mtime of a present
/// file is the only durable record of the last verified download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalFileState {
    Absent,
    Present { modified: DateTime<Utc> },
}

/// Stats `path`. "Not found" means no prior download; any other stat
/// failure (permissions, bad path component) propagates so it cannot be
/// mistaken for "absent" and force a spurious re-download.
pub fn local_state(path: &Path) -> Result<LocalFileState, UpdateError> {
    match fs::metadata(path) {
        Ok(meta) => {
            let modified = meta.modified().map_err(|source| UpdateError::LocalState {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(LocalFileState::Present {
                modified: modified.into(),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(LocalFileState::Absent),
        Err(source) => Err(UpdateError::LocalState {
            path: path.to_path_buf(),
            source,
        }),
    }
}
