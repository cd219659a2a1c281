//! Wire formats for the two supported API generations.
//!
//! v2 returns every build for a version in ascending order; the latest is
//! the last element. v3 returns the latest build directly, with per-artifact
//! download URLs and a nested checksums object. Both normalize into
//! [`BuildInfo`] so the rest of the workflow is shape-agnostic.

use super::{ArtifactDescriptor, BuildInfo};
use crate::error::UpdateError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// v2 `GET .../versions/{version}/builds` response.
#[derive(Debug, Deserialize)]
pub struct V2BuildsResponse {
    #[serde(default)]
    pub builds: Vec<V2Build>,
}

#[derive(Debug, Deserialize)]
pub struct V2Build {
    pub build: i64,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub changes: Vec<V2Change>,
    #[serde(default)]
    pub downloads: HashMap<String, V2Download>,
}

#[derive(Debug, Deserialize)]
pub struct V2Change {
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct V2Download {
    pub name: String,
    pub sha256: Option<String>,
}

impl V2BuildsResponse {
    /// Takes the last (newest) build from the ascending list. An empty list
    /// is a response-shape error.
    pub fn normalize(mut self) -> Result<BuildInfo, UpdateError> {
        let latest = self
            .builds
            .pop()
            .ok_or_else(|| UpdateError::ResponseShape("no builds in response".into()))?;

        let downloads = latest
            .downloads
            .into_iter()
            .map(|(role, d)| {
                (
                    role,
                    ArtifactDescriptor {
                        name: d.name,
                        url: None,
                        sha256: d.sha256,
                    },
                )
            })
            .collect();

        let changes = latest
            .changes
            .into_iter()
            .filter_map(|c| c.summary)
            .collect();

        Ok(BuildInfo {
            id: latest.build,
            time: latest.time,
            downloads,
            changes,
        })
    }
}

/// v3 `GET .../builds/latest` response.
#[derive(Debug, Deserialize)]
pub struct V3LatestBuild {
    pub id: i64,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub commits: Vec<V3Commit>,
    #[serde(default)]
    pub downloads: HashMap<String, V3Download>,
}

#[derive(Debug, Deserialize)]
pub struct V3Commit {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct V3Download {
    pub name: String,
    pub url: Option<String>,
    pub checksums: Option<V3Checksums>,
}

#[derive(Debug, Deserialize)]
pub struct V3Checksums {
    pub sha256: Option<String>,
}

impl V3LatestBuild {
    pub fn normalize(self) -> Result<BuildInfo, UpdateError> {
        let downloads = self
            .downloads
            .into_iter()
            .map(|(role, d)| {
                (
                    role,
                    ArtifactDescriptor {
                        name: d.name,
                        url: d.url,
                        sha256: d.checksums.and_then(|c| c.sha256),
                    },
                )
            })
            .collect();

        // Commit messages can be multi-line; only the subject line is useful
        // as a change summary.
        let changes = self
            .commits
            .into_iter()
            .filter_map(|c| c.message)
            .map(|m| m.lines().next().unwrap_or_default().to_string())
            .collect();

        Ok(BuildInfo {
            id: self.id,
            time: self.time,
            downloads,
            changes,
        })
    }
}
