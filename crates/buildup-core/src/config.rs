//! Immutable run configuration.
//!
//! Built once by the CLI from flags and passed by reference into every
//! component that needs it; there is no global mutable state.

use crate::api::ApiGeneration;
use crate::error::UpdateError;
use std::time::Duration;
use url::Url;

/// Deadline for the latest-build metadata lookup. The local-state probe has
/// no deadline of its own.
pub const DEFAULT_METADATA_DEADLINE: Duration = Duration::from_secs(15);

/// Everything one update run needs to know. Immutable after construction.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    /// Base URL of the build distribution API, without a trailing slash.
    pub api_server: String,
    /// Project to check (e.g. "paper").
    pub project_name: String,
    /// Project version to check (e.g. "1.21.4").
    pub project_version: String,
    /// Output filename template; `{project-name}` and `{project-version}`
    /// are substituted.
    pub filename_format: String,
    /// Which API generation the server speaks.
    pub generation: ApiGeneration,
    /// Artifact role to download from the build's downloads map.
    pub artifact_role: String,
    /// Deadline applied to the metadata lookup only.
    pub metadata_deadline: Duration,
}

impl UpdateConfig {
    /// Validates inputs and builds the config. Empty values and unparseable
    /// API server URLs are configuration errors; `artifact_role` falls back
    /// to the generation's conventional role when not given.
    pub fn new(
        api_server: &str,
        project_name: &str,
        project_version: &str,
        filename_format: &str,
        generation: ApiGeneration,
        artifact_role: Option<&str>,
    ) -> Result<Self, UpdateError> {
        if api_server.is_empty() {
            return Err(UpdateError::Config("api-server is empty".into()));
        }
        if project_name.is_empty() {
            return Err(UpdateError::Config("project-name is required".into()));
        }
        if project_version.is_empty() {
            return Err(UpdateError::Config("project-version is required".into()));
        }
        if filename_format.is_empty() {
            return Err(UpdateError::Config("filename-format is empty".into()));
        }
        Url::parse(api_server)
            .map_err(|e| UpdateError::Config(format!("invalid api-server URL '{api_server}': {e}")))?;

        let artifact_role = artifact_role
            .filter(|r| !r.is_empty())
            .unwrap_or(generation.default_artifact_role())
            .to_string();

        Ok(UpdateConfig {
            api_server: api_server.trim_end_matches('/').to_string(),
            project_name: project_name.to_string(),
            project_version: project_version.to_string(),
            filename_format: filename_format.to_string(),
            generation,
            artifact_role,
            metadata_deadline: DEFAULT_METADATA_DEADLINE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Result<UpdateConfig, UpdateError> {
        UpdateConfig::new(
            "https://api.example.org",
            "paper",
            "1.21.4",
            "{project-name}-{project-version}.jar",
            ApiGeneration::V2,
            None,
        )
    }

    #[test]
    fn valid_config() {
        let cfg = base().unwrap();
        assert_eq!(cfg.api_server, "https://api.example.org");
        assert_eq!(cfg.artifact_role, "application");
        assert_eq!(cfg.metadata_deadline, DEFAULT_METADATA_DEADLINE);
    }

    #[test]
    fn trailing_slash_stripped() {
        let cfg = UpdateConfig::new(
            "https://api.example.org/",
            "paper",
            "1.21.4",
            "out.jar",
            ApiGeneration::V2,
            None,
        )
        .unwrap();
        assert_eq!(cfg.api_server, "https://api.example.org");
    }

    #[test]
    fn empty_project_name_rejected() {
        let err = UpdateConfig::new(
            "https://api.example.org",
            "",
            "1.21.4",
            "out.jar",
            ApiGeneration::V2,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, UpdateError::Config(_)));
    }

    #[test]
    fn invalid_server_url_rejected() {
        let err = UpdateConfig::new(
            "not a url",
            "paper",
            "1.21.4",
            "out.jar",
            ApiGeneration::V2,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, UpdateError::Config(_)));
    }

    #[test]
    fn artifact_role_defaults_per_generation() {
        let v3 = UpdateConfig::new(
            "https://api.example.org",
            "paper",
            "1.21.4",
            "out.jar",
            ApiGeneration::V3,
            None,
        )
        .unwrap();
        assert_eq!(v3.artifact_role, "server:default");

        let custom = UpdateConfig::new(
            "https://api.example.org",
            "paper",
            "1.21.4",
            "out.jar",
            ApiGeneration::V3,
            Some("server:mojang"),
        )
        .unwrap();
        assert_eq!(custom.artifact_role, "server:mojang");
    }
}
