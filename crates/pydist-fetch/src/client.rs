//! Streaming download client.

use std::sync::Arc;

use futures_util::StreamExt;
use pydist_archive::{ByteSource, SpooledWriter};
use reqwest::Client;

use crate::TRACING_TARGET;
use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult};

/// Inner client that holds the HTTP client and configuration.
struct FetchClientInner {
    http: Client,
    config: FetchConfig,
}

/// HTTP client that downloads distribution archives into seekable byte
/// sources.
///
/// A download streams straight into a [`SpooledWriter`], so the archive
/// lands in memory or in a temporary file depending on its size, and is
/// fully materialized before the call returns. Size limits are enforced
/// both against the declared `Content-Length` and against the bytes
/// actually received.
#[derive(Clone)]
pub struct FetchClient {
    inner: Arc<FetchClientInner>,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    /// Creates a new download client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::BuildClient`] if the underlying HTTP client
    /// rejects the configuration.
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        tracing::debug!(
            target: TRACING_TARGET,
            timeout_ms = config.timeout().as_millis(),
            "Creating download client"
        );

        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()
            .map_err(FetchError::BuildClient)?;

        Ok(Self {
            inner: Arc::new(FetchClientInner { http, config }),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.inner.config
    }

    /// Downloads `url` into a fully materialized, seekable byte source.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UpstreamStatus`] for non-success responses,
    /// [`FetchError::TooLarge`] when the payload exceeds the configured
    /// limit, [`FetchError::Transport`] for network-level failures, and
    /// [`FetchError::Spool`] when local storage fails.
    pub async fn fetch(&self, url: &str) -> FetchResult<ByteSource> {
        let config = &self.inner.config;

        tracing::debug!(target: TRACING_TARGET, url = %url, "Requesting archive");

        let response = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| classify_transport(url, err))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(
                target: TRACING_TARGET,
                url = %url,
                status = status.as_u16(),
                "Upstream rejected the request"
            );
            return Err(FetchError::upstream_status(url, status.as_u16()));
        }

        if let Some(declared) = response.content_length() {
            if declared > config.max_download_bytes {
                return Err(FetchError::too_large(url, config.max_download_bytes));
            }
        }

        let mut writer = SpooledWriter::new(config.spool_threshold);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| classify_transport(url, err))?;
            if writer.written() + chunk.len() as u64 > config.max_download_bytes {
                return Err(FetchError::too_large(url, config.max_download_bytes));
            }
            for piece in chunk.chunks(config.chunk_size.max(1)) {
                writer
                    .write_chunk(piece)
                    .map_err(|err| FetchError::spool(url, err))?;
            }
        }

        let source = writer
            .finish()
            .map_err(|err| FetchError::spool(url, err))?;

        tracing::debug!(
            target: TRACING_TARGET,
            url = %url,
            bytes = source.len(),
            spooled = source.is_spooled(),
            "Archive downloaded"
        );

        Ok(source)
    }
}

fn classify_transport(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        tracing::warn!(target: TRACING_TARGET, url = %url, "Request timed out");
    } else if err.is_connect() {
        tracing::warn!(target: TRACING_TARGET, url = %url, "Connection failed");
    } else {
        tracing::warn!(target: TRACING_TARGET, url = %url, error = %err, "Request failed");
    }
    FetchError::transport(url, err)
}
