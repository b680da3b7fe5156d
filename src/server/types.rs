//! Server state and wire types.

use std::sync::Arc;

use serde::Serialize;

use super::metrics::Metrics;
use crate::analyzer::Analyzer;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            metrics: Arc::new(Metrics::new()),
        }
    }
}

/// JSON body of every 4xx response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
