#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod service;
mod stream;

/// Tracing target for access service operations.
///
/// Use this target for logging cache misses, archive opens, and member
/// access failures.
pub const TRACING_TARGET: &str = "pydist_service";

pub use pydist_archive::FileEntry;
pub use pydist_cache::CacheStats;

pub use crate::config::ServiceConfig;
pub use crate::error::{Error, ErrorKind, ServiceResult};
pub use crate::service::AccessService;
pub use crate::stream::ContentStream;
