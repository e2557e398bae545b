#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
use pydist_fetch::FetchClient;
use pydist_server::{AppState, routes};
use pydist_service::AccessService;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Cli, log_server_config};

/// Tracing target for configuration events.
pub const TRACING_TARGET_CONFIG: &str = "pydist_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: server::TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: server::TRACING_TARGET_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing();
    log_startup_info();
    log_server_config(&cli.server);

    cli.validate()?;

    log_access_config(&cli);

    let fetcher =
        FetchClient::new(cli.fetch.clone()).context("failed to create the fetch client")?;
    let service = AccessService::new(fetcher, cli.service.clone());
    let state = AppState::new(service, cli.upstream.base_url.clone());

    server::serve_http(routes(state), cli.server).await?;

    Ok(())
}

/// Initializes tracing with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Logs startup information.
fn log_startup_info() {
    tracing::info!(
        target: server::TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting pydist viewer"
    );

    tracing::debug!(
        target: server::TRACING_TARGET_STARTUP,
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        "build information"
    );
}

/// Logs archive access configuration.
fn log_access_config(cli: &Cli) {
    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        upstream = %cli.upstream.base_url,
        cache_capacity = cli.service.cache_capacity,
        chunk_size = cli.fetch.chunk_size,
        max_download_bytes = cli.fetch.max_download_bytes,
        fetch_timeout_secs = cli.fetch.timeout_seconds,
        "Archive access configured successfully"
    );
}
