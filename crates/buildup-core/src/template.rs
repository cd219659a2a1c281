//! Placeholder substitution for URLs and output filenames.
//!
//! Templates use `{key}` placeholders. Substitution values travel in an
//! explicit [`SubstContext`] record; a placeholder left unresolved after
//! substitution is a configuration error, never a silent passthrough.

use crate::config::UpdateConfig;
use crate::error::UpdateError;

pub const API_SERVER_KEY: &str = "api-server";
pub const PROJECT_NAME_KEY: &str = "project-name";
pub const PROJECT_VERSION_KEY: &str = "project-version";
pub const BUILD_KEY: &str = "build";
pub const DOWNLOAD_NAME_KEY: &str = "download-name";

/// Substitution values for one run. The build number and download name only
/// become known after the metadata fetch.
#[derive(Debug, Clone)]
pub struct SubstContext {
    pub api_server: String,
    pub project_name: String,
    pub project_version: String,
    pub build: Option<i64>,
    pub download_name: Option<String>,
}

impl SubstContext {
    pub fn from_config(cfg: &UpdateConfig) -> Self {
        SubstContext {
            api_server: cfg.api_server.clone(),
            project_name: cfg.project_name.clone(),
            project_version: cfg.project_version.clone(),
            build: None,
            download_name: None,
        }
    }

    pub fn with_build(mut self, build: i64) -> Self {
        self.build = Some(build);
        self
    }

    pub fn with_download_name(mut self, name: &str) -> Self {
        self.download_name = Some(name.to_string());
        self
    }

    fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![
            (API_SERVER_KEY, self.api_server.clone()),
            (PROJECT_NAME_KEY, self.project_name.clone()),
            (PROJECT_VERSION_KEY, self.project_version.clone()),
        ];
        if let Some(build) = self.build {
            entries.push((BUILD_KEY, build.to_string()));
        }
        if let Some(name) = &self.download_name {
            entries.push((DOWNLOAD_NAME_KEY, name.clone()));
        }
        entries
    }
}

/// Substitutes every known `{key}` in `template` and returns the result.
/// Any `{` remaining afterwards means an unknown or unavailable key.
pub fn render(template: &str, ctx: &SubstContext) -> Result<String, UpdateError> {
    let mut out = template.to_string();
    for (key, value) in ctx.entries() {
        out = out.replace(&format!("{{{key}}}"), &value);
    }

    if let Some(start) = out.find('{') {
        let rest = &out[start..];
        let placeholder = rest.find('}').map(|end| &rest[..=end]).unwrap_or(rest);
        return Err(UpdateError::Config(format!(
            "unresolved placeholder '{placeholder}' in template '{template}'"
        )));
    }

    Ok(out)
}
