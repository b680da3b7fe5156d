//! Configuration types and CLI options.
//!
//! Every setting can be supplied as a command-line flag or through the
//! environment (`PORT`, `FETCH_TIMEOUT_SECONDS`, ...). The binary also loads a
//! `.env` file before parsing.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use crate::config::constants::{
    DEFAULT_FETCH_MAX_BYTES, DEFAULT_FETCH_MAX_REDIRECTS, DEFAULT_FETCH_TIMEOUT_SECS,
    DEFAULT_PORT,
};

/// Verbosity of the service's own log output (`LOG_LEVEL`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Log line format (`LOG_FORMAT`): coloured text for terminals or one JSON
/// object per line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

/// Service configuration.
///
/// # Examples
///
/// ```no_run
/// use page_analyzer::Config;
///
/// let config = Config {
///     port: 9090,
///     fetch_timeout_seconds: 10,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "page_analyzer", version, about = "Analyze web pages over a JSON HTTP API")]
pub struct Config {
    /// Port the HTTP server listens on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Default per-analysis timeout in seconds (also the page fetch timeout)
    #[arg(
        long,
        env = "FETCH_TIMEOUT_SECONDS",
        default_value_t = DEFAULT_FETCH_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub fetch_timeout_seconds: u64,

    /// Maximum number of redirects followed when fetching a page
    #[arg(long, env = "FETCH_MAX_REDIRECTS", default_value_t = DEFAULT_FETCH_MAX_REDIRECTS)]
    pub fetch_max_redirects: usize,

    /// Maximum number of page body bytes read
    #[arg(
        long,
        env = "FETCH_MAX_BYTES",
        default_value_t = DEFAULT_FETCH_MAX_BYTES,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub fetch_max_bytes: u64,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Config {
    /// The default analysis timeout as a `Duration`.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            fetch_timeout_seconds: DEFAULT_FETCH_TIMEOUT_SECS,
            fetch_max_redirects: DEFAULT_FETCH_MAX_REDIRECTS,
            fetch_max_bytes: DEFAULT_FETCH_MAX_BYTES,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
