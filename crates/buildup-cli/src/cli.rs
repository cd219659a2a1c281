//! Flag surface and startup validation for the buildup CLI.

use anyhow::Result;
use buildup_core::api::ApiGeneration;
use buildup_core::api::http::HttpMetadataSource;
use buildup_core::config::UpdateConfig;
use buildup_core::orchestrator;
use clap::{Parser, ValueEnum};
use std::sync::Arc;

/// Check a build-distribution API for a newer artifact and download it with
/// SHA-256 verification.
#[derive(Debug, Parser)]
#[command(name = "buildup")]
#[command(about = "Keep a project artifact up to date from a build API", long_about = None)]
pub struct Cli {
    /// Base URL of the build API.
    #[arg(long, default_value = "https://api.papermc.io")]
    pub api_server: String,

    /// Project to check, e.g. "paper" or "velocity".
    #[arg(long)]
    pub project_name: String,

    /// Project version to check, e.g. "1.21.4".
    #[arg(long)]
    pub project_version: String,

    /// Output filename; {project-name} and {project-version} are substituted.
    #[arg(long, default_value = "{project-name}-{project-version}.jar")]
    pub filename_format: String,

    /// API generation the server speaks.
    #[arg(long, value_enum, default_value_t = Generation::V2)]
    pub api: Generation,

    /// Artifact role to download (defaults to the generation's primary
    /// artifact: "application" for v2, "server:default" for v3).
    #[arg(long)]
    pub artifact: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Generation {
    V2,
    V3,
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generation::V2 => f.write_str("v2"),
            Generation::V3 => f.write_str("v3"),
        }
    }
}

impl From<Generation> for ApiGeneration {
    fn from(g: Generation) -> Self {
        match g {
            Generation::V2 => ApiGeneration::V2,
            Generation::V3 => ApiGeneration::V3,
        }
    }
}

impl Cli {
    fn into_config(self) -> Result<UpdateConfig> {
        Ok(UpdateConfig::new(
            &self.api_server,
            &self.project_name,
            &self.project_version,
            &self.filename_format,
            self.api.into(),
            self.artifact.as_deref(),
        )?)
    }
}

pub async fn run_from_args() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // clap exits 2 by default; every startup failure here is exit 1.
            // Help and version output are not failures.
            let _ = err.print();
            std::process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };

    let cfg = cli.into_config()?;
    tracing::debug!(?cfg, "resolved configuration");
    let source = Arc::new(HttpMetadataSource::new(&cfg)?);
    orchestrator::run_update(&cfg, source).await?;
    Ok(())
}
