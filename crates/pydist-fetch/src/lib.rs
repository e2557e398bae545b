#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod client;
mod config;
mod error;

/// Tracing target for download operations.
///
/// Use this target for logging request dispatch, upstream failures, and
/// spooling progress.
pub const TRACING_TARGET: &str = "pydist_fetch";

pub use crate::client::FetchClient;
pub use crate::config::{
    DEFAULT_CHUNK_SIZE, DEFAULT_MAX_DOWNLOAD_BYTES, DEFAULT_TIMEOUT_SECONDS, FetchConfig,
};
pub use crate::error::{FetchError, FetchResult};
