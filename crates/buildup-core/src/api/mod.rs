//! Build metadata model and the metadata-source boundary.
//!
//! The HTTP client ([`http`]) decodes one of two wire shapes ([`wire`]) and
//! normalizes it into [`BuildInfo`] here; nothing downstream of this module
//! knows which API generation served the data.

pub mod http;
pub mod wire;

use crate::error::UpdateError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Which generation of the build API the server speaks. Selects the wire
/// shape and the endpoint layout at the collaborator boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiGeneration {
    /// Ascending builds list; latest build is the last element.
    V2,
    /// Single latest-build object with direct download URLs.
    V3,
}

impl ApiGeneration {
    /// The downloads-map key each generation conventionally uses for the
    /// primary artifact.
    pub fn default_artifact_role(self) -> &'static str {
        match self {
            ApiGeneration::V2 => "application",
            ApiGeneration::V3 => "server:default",
        }
    }
}

/// The latest build for a project/version, normalized from either wire
/// shape. Owned by the orchestrator for the duration of one run.
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Build number.
    pub id: i64,
    /// When the build was produced.
    pub time: DateTime<Utc>,
    /// Downloadable artifacts keyed by role name (e.g. "application").
    pub downloads: HashMap<String, ArtifactDescriptor>,
    /// Change summaries for this build, in API order.
    pub changes: Vec<String>,
}

/// One downloadable artifact within a build.
#[derive(Debug, Clone)]
pub struct ArtifactDescriptor {
    /// Download filename as named by the API.
    pub name: String,
    /// Direct download URL, if the API provides one. When absent the
    /// download path is derived from the build number and artifact name.
    pub url: Option<String>,
    /// Hex-encoded SHA-256 of the artifact. Checked for presence and
    /// well-formedness before any download is attempted.
    pub sha256: Option<String>,
}

/// Answers "what is the latest build for this project/version".
///
/// Implementations block; the orchestrator runs them on a blocking task
/// under its metadata deadline.
pub trait MetadataSource: Send + Sync {
    fn fetch_latest_build(&self) -> Result<BuildInfo, UpdateError>;
}
