//! Error types for distribution downloads.

use std::io;

use thiserror::Error;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Errors produced while downloading a distribution archive.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered the request with a non-success status.
    #[error("upstream returned status {status} for {url}")]
    UpstreamStatus {
        /// URL of the rejected request.
        url: String,
        /// HTTP status code upstream answered with.
        status: u16,
    },
    /// The request failed below the HTTP layer.
    #[error("request to {url} failed")]
    Transport {
        /// URL of the failed request.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The download exceeds the configured size limit.
    #[error("download of {url} exceeds the {limit_bytes} byte limit")]
    TooLarge {
        /// URL of the oversized download.
        url: String,
        /// Configured maximum download size in bytes.
        limit_bytes: u64,
    },
    /// Downloaded bytes could not be written to local storage.
    #[error("failed to store downloaded bytes of {url}")]
    Spool {
        /// URL of the interrupted download.
        url: String,
        /// Underlying storage error.
        #[source]
        source: io::Error,
    },
    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client")]
    BuildClient(#[source] reqwest::Error),
}

impl FetchError {
    /// Creates an [`FetchError::UpstreamStatus`] error.
    pub fn upstream_status(url: impl Into<String>, status: u16) -> Self {
        Self::UpstreamStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an [`FetchError::Transport`] error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates an [`FetchError::TooLarge`] error.
    pub fn too_large(url: impl Into<String>, limit_bytes: u64) -> Self {
        Self::TooLarge {
            url: url.into(),
            limit_bytes,
        }
    }

    /// Creates an [`FetchError::Spool`] error.
    pub fn spool(url: impl Into<String>, source: io::Error) -> Self {
        Self::Spool {
            url: url.into(),
            source,
        }
    }

    /// Returns the status code when upstream rejected the request.
    pub const fn upstream_status_code(&self) -> Option<u16> {
        match self {
            Self::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
