//! HTTP handlers.

mod analyze;
mod health;
mod metrics;

pub use analyze::{analyze_handler, method_not_allowed};
pub use health::health_handler;
pub use metrics::metrics_handler;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::types::ErrorBody;

/// `{"error": message}` with `status`.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}
