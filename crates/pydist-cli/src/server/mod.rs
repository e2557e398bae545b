//! HTTP server startup with graceful lifecycle management.
//!
//! This module binds the configured address, serves the application router,
//! and drains in-flight requests when a shutdown signal arrives.

/// Tracing target for server startup events.
pub const TRACING_TARGET_STARTUP: &str = "pydist_cli::server::startup";

/// Tracing target for server shutdown events.
pub const TRACING_TARGET_SHUTDOWN: &str = "pydist_cli::server::shutdown";

mod error;
mod http_server;
mod shutdown;

pub use error::{ServerError, ServerResult};
pub use http_server::serve_http;
use shutdown::shutdown_signal;
