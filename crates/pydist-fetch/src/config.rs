//! Download client configuration.

use std::time::Duration;

use anyhow::anyhow;
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Default size of the chunks handed to stream consumers, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Default upper bound on a single download, in bytes.
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 128_000_000;

/// Configuration for the [`FetchClient`](crate::FetchClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct FetchConfig {
    /// Timeout for a complete download request, in seconds.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "fetch-timeout",
            env = "FETCH_TIMEOUT_SECONDS",
            default_value_t = DEFAULT_TIMEOUT_SECONDS
        )
    )]
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Size of the chunks handed to stream consumers, in bytes.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "chunk-size",
            env = "CHUNK_SIZE",
            default_value_t = DEFAULT_CHUNK_SIZE
        )
    )]
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Upper bound on a single download, in bytes.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "max-download-bytes",
            env = "MAX_DOWNLOAD_BYTES",
            default_value_t = DEFAULT_MAX_DOWNLOAD_BYTES
        )
    )]
    #[serde(default = "default_max_download_bytes")]
    pub max_download_bytes: u64,

    /// Downloads larger than this spill from memory to a temporary file.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "spool-threshold-bytes",
            env = "SPOOL_THRESHOLD_BYTES",
            default_value_t = pydist_archive::DEFAULT_SPOOL_THRESHOLD
        )
    )]
    #[serde(default = "default_spool_threshold")]
    pub spool_threshold: usize,

    /// User agent header sent with every download request.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "fetch-user-agent",
            env = "FETCH_USER_AGENT",
            default_value_t = default_user_agent()
        )
    )]
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_max_download_bytes() -> u64 {
    DEFAULT_MAX_DOWNLOAD_BYTES
}

fn default_spool_threshold() -> usize {
    pydist_archive::DEFAULT_SPOOL_THRESHOLD
}

fn default_user_agent() -> String {
    format!("pydist-viewer/{}", env!("CARGO_PKG_VERSION"))
}

impl FetchConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
            spool_threshold: pydist_archive::DEFAULT_SPOOL_THRESHOLD,
            user_agent: default_user_agent(),
        }
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Sets the stream chunk size in bytes.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets the download size limit in bytes.
    pub fn with_max_download_bytes(mut self, max_download_bytes: u64) -> Self {
        self.max_download_bytes = max_download_bytes;
        self
    }

    /// Sets the memory-to-disk spool threshold in bytes.
    pub fn with_spool_threshold(mut self, spool_threshold: usize) -> Self {
        self.spool_threshold = spool_threshold;
        self
    }

    /// Request timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first setting that is out of range.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_seconds == 0 {
            return Err(anyhow!("Fetch timeout must be at least 1 second."));
        }
        if self.chunk_size == 0 {
            return Err(anyhow!("Chunk size must be at least 1 byte."));
        }
        if self.max_download_bytes == 0 {
            return Err(anyhow!("Maximum download size must be at least 1 byte."));
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::new()
    }
}
