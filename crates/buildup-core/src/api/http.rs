//! HTTP collaborator: metadata fetch and download transport over libcurl.
//!
//! Calls here block; async callers wrap them in `spawn_blocking`. Redirects
//! are followed, non-2xx statuses are rejected, and download bodies stream
//! through a caller-supplied sink so verification sees the exact bytes
//! written.

use super::wire::{V2BuildsResponse, V3LatestBuild};
use super::{ApiGeneration, BuildInfo, MetadataSource};
use crate::config::UpdateConfig;
use crate::error::UpdateError;
use crate::template::{self, SubstContext};
use std::io;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("buildup/", env!("CARGO_PKG_VERSION"));

const V2_BUILDS_URL: &str =
    "{api-server}/v2/projects/{project-name}/versions/{project-version}/builds";
const V3_LATEST_BUILD_URL: &str =
    "{api-server}/v3/projects/{project-name}/versions/{project-version}/builds/latest";
const V2_DOWNLOAD_URL: &str =
    "{api-server}/v2/projects/{project-name}/versions/{project-version}/builds/{build}/downloads/{download-name}";

/// Transport-level failure, before mapping into the run's error taxonomy.
#[derive(Debug, Error)]
pub(crate) enum TransportError {
    #[error("{0}")]
    Curl(#[from] curl::Error),
    #[error("HTTP {0}")]
    Http(u32),
    #[error("write failed: {0}")]
    Sink(io::Error),
}

/// Performs a GET on `url`, feeding the body into `sink` as it arrives.
/// A sink error aborts the transfer and is reported in preference to the
/// curl abort it causes.
pub(crate) fn stream_get<F>(url: &str, mut sink: F) -> Result<(), TransportError>
where
    F: FnMut(&[u8]) -> io::Result<()>,
{
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.useragent(USER_AGENT)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(Duration::from_secs(30))?;

    let mut sink_err: Option<io::Error> = None;
    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match sink(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                sink_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Some(e) = sink_err {
        return Err(TransportError::Sink(e));
    }
    perform_result?;

    // file:// and other non-HTTP schemes report code 0.
    let code = easy.response_code()?;
    if code != 0 && !(200..300).contains(&code) {
        return Err(TransportError::Http(code));
    }
    Ok(())
}

/// GET `url` and buffer the whole body (metadata responses are small).
fn get_body(url: &str) -> Result<Vec<u8>, TransportError> {
    let mut body = Vec::new();
    stream_get(url, |data| {
        body.extend_from_slice(data);
        Ok(())
    })?;
    Ok(body)
}

/// Metadata source backed by the build API over HTTP.
pub struct HttpMetadataSource {
    url: String,
    generation: ApiGeneration,
}

impl HttpMetadataSource {
    /// Builds the latest-build endpoint URL for the configured generation.
    pub fn new(cfg: &UpdateConfig) -> Result<Self, UpdateError> {
        let template = match cfg.generation {
            ApiGeneration::V2 => V2_BUILDS_URL,
            ApiGeneration::V3 => V3_LATEST_BUILD_URL,
        };
        let url = template::render(template, &SubstContext::from_config(cfg))?;
        Ok(HttpMetadataSource {
            url,
            generation: cfg.generation,
        })
    }
}

impl MetadataSource for HttpMetadataSource {
    fn fetch_latest_build(&self) -> Result<BuildInfo, UpdateError> {
        let body = get_body(&self.url)
            .map_err(|e| UpdateError::MetadataFetch(format!("GET {}: {e}", self.url)))?;

        match self.generation {
            ApiGeneration::V2 => serde_json::from_slice::<V2BuildsResponse>(&body)
                .map_err(|e| UpdateError::MetadataFetch(format!("decode v2 builds list: {e}")))?
                .normalize(),
            ApiGeneration::V3 => serde_json::from_slice::<V3LatestBuild>(&body)
                .map_err(|e| UpdateError::MetadataFetch(format!("decode v3 latest build: {e}")))?
                .normalize(),
        }
    }
}

/// Builds the v2-style download URL for artifacts the API does not give a
/// direct URL for.
pub fn templated_download_url(
    cfg: &UpdateConfig,
    build: i64,
    download_name: &str,
) -> Result<String, UpdateError> {
    let ctx = SubstContext::from_config(cfg)
        .with_build(build)
        .with_download_name(download_name);
    template::render(V2_DOWNLOAD_URL, &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(generation: ApiGeneration) -> UpdateConfig {
        UpdateConfig::new(
            "https://api.example.org",
            "paper",
            "1.21.4",
            "out.jar",
            generation,
            None,
        )
        .unwrap()
    }

    #[test]
    fn v2_endpoint_url() {
        let source = HttpMetadataSource::new(&cfg(ApiGeneration::V2)).unwrap();
        assert_eq!(
            source.url,
            "https://api.example.org/v2/projects/paper/versions/1.21.4/builds"
        );
    }

    #[test]
    fn v3_endpoint_url() {
        let source = HttpMetadataSource::new(&cfg(ApiGeneration::V3)).unwrap();
        assert_eq!(
            source.url,
            "https://api.example.org/v3/projects/paper/versions/1.21.4/builds/latest"
        );
    }

    #[test]
    fn download_url_embeds_build_and_name() {
        let url =
            templated_download_url(&cfg(ApiGeneration::V2), 388, "paper-1.21.4-388.jar").unwrap();
        assert_eq!(
            url,
            "https://api.example.org/v2/projects/paper/versions/1.21.4/builds/388/downloads/paper-1.21.4-388.jar"
        );
    }

    #[test]
    fn stream_get_reads_local_file() {
        use std::io::Write;
        let mut src = tempfile::NamedTempFile::new().unwrap();
        src.write_all(b"payload bytes").unwrap();
        src.flush().unwrap();

        let url = format!("file://{}", src.path().display());
        let mut body = Vec::new();
        stream_get(&url, |data| {
            body.extend_from_slice(data);
            Ok(())
        })
        .unwrap();
        assert_eq!(body, b"payload bytes");
    }

    #[test]
    fn stream_get_missing_file_is_error() {
        let err = stream_get("file:///definitely/not/here.bin", |_| Ok(())).unwrap_err();
        assert!(matches!(err, TransportError::Curl(_)));
    }

    #[test]
    fn sink_error_wins_over_abort() {
        use std::io::Write;
        let mut src = tempfile::NamedTempFile::new().unwrap();
        src.write_all(&[0u8; 1024]).unwrap();
        src.flush().unwrap();

        let url = format!("file://{}", src.path().display());
        let err = stream_get(&url, |_| Err(io::Error::other("disk full"))).unwrap_err();
        match err {
            TransportError::Sink(e) => assert_eq!(e.to_string(), "disk full"),
            other => panic!("expected Sink, got {other:?}"),
        }
    }
}
