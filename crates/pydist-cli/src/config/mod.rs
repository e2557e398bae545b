//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: ServerConfig     # Host, port, shutdown
//! ├── upstream: UpstreamConfig # Download base URL
//! ├── fetch: FetchConfig       # Download limits, timeouts, spooling
//! └── service: ServiceConfig   # Resident archive cache sizing
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Configure the bind address and cache
//! pydist-cli --host 0.0.0.0 --port 8080 --cache-capacity 16
//!
//! # Or via environment variables
//! HOST=0.0.0.0 PORT=8080 CACHE_CAPACITY=16 pydist-cli
//! ```

mod server;
mod upstream;

use anyhow::Context;
use clap::Parser;
use pydist_fetch::FetchConfig;
use pydist_service::ServiceConfig;
use serde::{Deserialize, Serialize};
pub use server::{ServerConfig, log_server_config};
pub use upstream::UpstreamConfig;

/// Complete CLI configuration.
///
/// Combines all configuration groups for the viewer server:
/// - [`ServerConfig`]: Network binding and graceful shutdown
/// - [`UpstreamConfig`]: Base URL that downloads are joined onto
/// - [`FetchConfig`]: Download limits, timeouts, and spooling
/// - [`ServiceConfig`]: Resident archive cache sizing
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "pydist-cli")]
#[command(about = "Remote viewer for Python distribution archives")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// Upstream package index configuration.
    #[clap(flatten)]
    pub upstream: UpstreamConfig,

    /// Archive download configuration.
    #[clap(flatten)]
    pub fetch: FetchConfig,

    /// Archive access and caching configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl Cli {
    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.upstream
            .validate()
            .context("invalid upstream configuration")?;
        self.fetch
            .validate()
            .context("invalid fetch configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        Ok(())
    }
}
