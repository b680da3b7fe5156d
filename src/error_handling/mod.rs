//! Error handling.
//!
//! This module provides the typed errors of every pipeline stage and the
//! warning types reported alongside successful analyses:
//! - **Errors**: failures that stop an analysis (reported in `errors` and
//!   mapped to an HTTP status by the server)
//! - **Warnings**: conditions that degrade but do not stop an analysis

mod types;

// Re-export public API
pub use types::{
    AnalysisFailure, AnalyzeError, FetchError, InitializationError, ParseError,
    UrlValidationError, WarningType,
};
