//! Error types for archive decoding and entry access.

use crate::format::ArchiveFormat;

/// Specialized [`Result`] alias for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors produced while opening an archive or accessing its entries.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// No non-directory entry exists at the requested path.
    #[error("no file named {path:?} in archive")]
    NotFound {
        /// Archive-internal path that was requested.
        path: String,
    },

    /// The archive bytes do not parse as the expected container format.
    #[error("cannot decode archive as {format}: {message}")]
    Decode {
        /// Format the archive was expected to be.
        format: ArchiveFormat,
        /// Description of the decoder failure.
        message: String,
    },

    /// Reading the underlying byte source failed.
    #[error("archive byte source failed")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Creates an [`ArchiveError::NotFound`] for the given path.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates an [`ArchiveError::Decode`] for the given format.
    pub fn decode(format: ArchiveFormat, message: impl Into<String>) -> Self {
        Self::Decode {
            format,
            message: message.into(),
        }
    }

    /// Returns `true` if the error is a missing-entry failure.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the error is a container decode failure.
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
