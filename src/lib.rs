//! page_analyzer library: single-page web analysis behind a JSON HTTP API
//!
//! Given a URL, the analyzer fetches the page under strict safety bounds and
//! reports its HTML version, title, heading counts, internal/external link
//! counts, how many links are unreachable, and whether a login form is present.
//!
//! # Example
//!
//! ```no_run
//! use page_analyzer::{AnalyzeRequest, Analyzer, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let analyzer = Analyzer::from_config(&Config::default())?;
//! let request = AnalyzeRequest::new("example.com").with_timeout_seconds(10);
//!
//! match analyzer.analyze(&request, &CancellationToken::new()).await {
//!     Ok(result) => println!("{} has {} external links", result.url, result.links_external),
//!     Err(failure) => println!("analysis failed: {}", failure),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod analyzer;
pub mod config;
pub mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod linkcheck;
pub mod models;
pub mod parse;
pub mod security;
pub mod server;
mod utils;

// Re-export public API
pub use analyzer::{Analyzer, AnalyzerConfig, DeadlineScope};
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{AnalysisFailure, AnalyzeError, FetchError, UrlValidationError};
pub use fetch::{BoundedBody, FetchedPage, Fetcher, FetcherConfig};
pub use linkcheck::{LinkProbeResult, LinkValidator};
pub use models::{AnalyzeRequest, AnalyzeResult};
pub use parse::{inspect, inspect_html, ParsedPage};
pub use security::validate_and_normalize_url;
pub use server::{build_router, serve, AppState};
