//! Error taxonomy surfaced to the boundary layer.

use pydist_archive::ArchiveError;
use pydist_fetch::FetchError;
use thiserror::Error as ThisError;

/// Type alias for Results with the service [`Error`] type.
pub type ServiceResult<T> = std::result::Result<T, Error>;

/// Categories of service errors, used as stable wire error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// URL suffix does not map to a supported archive format.
    UnsupportedFormat,
    /// Upstream answered with a non-success status.
    Upstream,
    /// Download failed at the transport or storage level.
    FetchFailed,
    /// Download exceeded the configured size limit.
    TooLarge,
    /// Requested path is absent from the archive.
    NotFound,
    /// Archive bytes do not parse as the expected format.
    Decode,
}

/// Errors produced while answering an archive access request.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The URL suffix is not one of `.whl`, `.egg`, `.zip`, or `.tar.gz`.
    #[error("no supported archive format for {url}")]
    UnsupportedFormat {
        /// URL whose suffix was not recognized.
        url: String,
    },
    /// Upstream refused to serve the archive.
    #[error("upstream returned status {status} for {url}")]
    Upstream {
        /// URL of the rejected download.
        url: String,
        /// HTTP status code upstream answered with.
        status: u16,
    },
    /// The archive could not be downloaded.
    #[error("failed to download {url}")]
    FetchFailed {
        /// URL of the failed download.
        url: String,
        /// Underlying download error.
        #[source]
        source: FetchError,
    },
    /// The archive exceeds the configured download limit.
    #[error("download of {url} exceeds the {limit_bytes} byte limit")]
    TooLarge {
        /// URL of the oversized archive.
        url: String,
        /// Configured maximum download size in bytes.
        limit_bytes: u64,
    },
    /// The archive opened, but no file member has the requested path.
    #[error("no file named {path:?} in {url}")]
    NotFound {
        /// URL of the archive.
        url: String,
        /// Member path that was requested.
        path: String,
    },
    /// The downloaded bytes do not parse as the expected format.
    #[error("cannot decode {url}")]
    Decode {
        /// URL of the undecodable archive.
        url: String,
        /// Underlying archive error.
        #[source]
        source: ArchiveError,
    },
}

impl Error {
    /// Creates an [`Error::UnsupportedFormat`] error.
    pub fn unsupported_format(url: impl Into<String>) -> Self {
        Self::UnsupportedFormat { url: url.into() }
    }

    /// Returns the category of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::FetchFailed { .. } => ErrorKind::FetchFailed,
            Self::TooLarge { .. } => ErrorKind::TooLarge,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Returns the status code when upstream rejected the download.
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the request itself was at fault (4xx equivalent).
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::NotFound { .. }
        )
    }

    /// Returns true if the upstream or the service failed (5xx equivalent).
    pub const fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Translates a download failure, lifting status and size rejections
    /// into their own categories.
    pub(crate) fn from_fetch(url: &str, err: FetchError) -> Self {
        match err {
            FetchError::UpstreamStatus { url, status } => Self::Upstream { url, status },
            FetchError::TooLarge { url, limit_bytes } => Self::TooLarge { url, limit_bytes },
            other => Self::FetchFailed {
                url: url.to_owned(),
                source: other,
            },
        }
    }

    /// Translates an archive failure, keeping missing members distinct
    /// from undecodable archives.
    pub(crate) fn from_archive(url: &str, err: ArchiveError) -> Self {
        match err {
            ArchiveError::NotFound { path } => Self::NotFound {
                url: url.to_owned(),
                path,
            },
            other => Self::Decode {
                url: url.to_owned(),
                source: other,
            },
        }
    }
}
