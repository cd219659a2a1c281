//! One update run, start to finish.
//!
//! The metadata lookup and the local-state probe run as two blocking tasks
//! joined at a single await point; only the metadata side carries a
//! deadline. Everything after the join is sequential: decide, locate the
//! artifact, download, verify, and clean up on mismatch.

use crate::api::{ArtifactDescriptor, BuildInfo, MetadataSource, http};
use crate::config::UpdateConfig;
use crate::decision::{self, Decision};
use crate::download;
use crate::error::UpdateError;
use crate::probe;
use crate::template::{self, SubstContext};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Terminal state of a successful run. Both variants map to exit code 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The local file is already newer than the latest build.
    UpToDate,
    /// A new build was downloaded and its checksum verified.
    Downloaded { build: i64, path: PathBuf },
}

/// Runs the whole workflow for one project/version.
pub async fn run_update(
    cfg: &UpdateConfig,
    source: Arc<dyn MetadataSource>,
) -> Result<RunOutcome, UpdateError> {
    let output_path = PathBuf::from(template::render(
        &cfg.filename_format,
        &SubstContext::from_config(cfg),
    )?);

    tracing::info!(
        project = %cfg.project_name,
        version = %cfg.project_version,
        "checking for updates"
    );

    let fetch_task = {
        let source = Arc::clone(&source);
        tokio::task::spawn_blocking(move || source.fetch_latest_build())
    };
    let fetch = tokio::time::timeout(cfg.metadata_deadline, fetch_task);

    let probe_path = output_path.clone();
    let probe_task = tokio::task::spawn_blocking(move || probe::local_state(&probe_path));

    let (fetch_result, probe_result) = tokio::join!(fetch, probe_task);

    // On expiry the in-flight lookup is abandoned, not awaited.
    let build = match fetch_result {
        Err(_elapsed) => return Err(UpdateError::Timeout(cfg.metadata_deadline)),
        Ok(joined) => joined
            .map_err(|e| UpdateError::MetadataFetch(format!("metadata task failed: {e}")))??,
    };
    let local = probe_result.map_err(|e| UpdateError::LocalState {
        path: output_path.clone(),
        source: io::Error::other(e),
    })??;

    if decision::decide(build.time, local) == Decision::Skip {
        tracing::info!(path = %output_path.display(), "no updates");
        return Ok(RunOutcome::UpToDate);
    }

    let artifact = locate_artifact(&build, &cfg.artifact_role)?;
    let expected = decode_checksum(artifact, &cfg.artifact_role)?;

    tracing::info!(build = build.id, time = %build.time, "found a new build");
    if !build.changes.is_empty() {
        tracing::info!("changes in this build:");
        for change in &build.changes {
            tracing::info!("  {change}");
        }
    }

    let url = match &artifact.url {
        Some(url) => url.clone(),
        None => http::templated_download_url(cfg, build.id, &artifact.name)?,
    };

    tracing::info!(name = %artifact.name, "downloading");
    let outcome = download::download_to(&url, &output_path)?;

    if outcome.digest[..] != expected[..] {
        tracing::error!(path = %output_path.display(), "downloaded file is corrupted, deleting it");
        if let Err(e) = fs::remove_file(&output_path) {
            tracing::warn!(path = %output_path.display(), "failed to remove corrupted file: {e}");
        }
        return Err(UpdateError::Integrity {
            path: output_path,
            expected: hex::encode(expected),
            actual: hex::encode(outcome.digest),
        });
    }

    tracing::info!(
        project = %cfg.project_name,
        version = %cfg.project_version,
        build = build.id,
        bytes = outcome.bytes,
        path = %output_path.display(),
        "latest build downloaded and verified"
    );
    Ok(RunOutcome::Downloaded {
        build: build.id,
        path: output_path,
    })
}

/// Looks up the configured artifact role in the build's downloads map.
fn locate_artifact<'a>(
    build: &'a BuildInfo,
    role: &str,
) -> Result<&'a ArtifactDescriptor, UpdateError> {
    build.downloads.get(role).ok_or_else(|| {
        UpdateError::ResponseShape(format!(
            "artifact role '{role}' not present in build {} (available: {})",
            build.id,
            available_roles(build)
        ))
    })
}

fn available_roles(build: &BuildInfo) -> String {
    let mut roles: Vec<&str> = build.downloads.keys().map(String::as_str).collect();
    roles.sort_unstable();
    if roles.is_empty() {
        "none".to_string()
    } else {
        roles.join(", ")
    }
}

/// Decodes the artifact's advertised checksum. Absence or malformed hex is
/// a response-shape error raised before any transfer starts.
fn decode_checksum(artifact: &ArtifactDescriptor, role: &str) -> Result<Vec<u8>, UpdateError> {
    let checksum = artifact.sha256.as_deref().ok_or_else(|| {
        UpdateError::ResponseShape(format!("artifact role '{role}' has no sha256 checksum"))
    })?;
    let decoded = hex::decode(checksum).map_err(|e| {
        UpdateError::ResponseShape(format!("malformed sha256 checksum '{checksum}': {e}"))
    })?;
    if decoded.len() != 32 {
        return Err(UpdateError::ResponseShape(format!(
            "sha256 checksum '{checksum}' decodes to {} bytes, expected 32",
            decoded.len()
        )));
    }
    Ok(decoded)
}
