//! Main application entry point (server binary).
//!
//! This is a thin wrapper around the `page_analyzer` library that handles:
//! - Environment variable loading (.env file)
//! - Command-line/environment parsing into `Config`
//! - Logger initialization
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;

use page_analyzer::initialization::init_logger_with;
use page_analyzer::{serve, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    // Invalid values abort here with a clap error
    let config = Config::parse();

    init_logger_with(config.log_level.into(), config.log_format)
        .context("Failed to initialize logger")?;

    log::info!(
        "Starting page_analyzer: port={} fetch_timeout={}s max_redirects={} max_bytes={}",
        config.port,
        config.fetch_timeout_seconds,
        config.fetch_max_redirects,
        config.fetch_max_bytes
    );

    serve(&config).await
}
