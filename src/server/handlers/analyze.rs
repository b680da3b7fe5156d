//! `/api/analyze` handler.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tokio_util::sync::CancellationToken;

use super::super::types::AppState;
use super::error_response;
use crate::models::AnalyzeRequest;

/// Runs one analysis.
///
/// 200 with the result, 400 for bad input, 502 with the partial result when
/// the upstream page could not be analyzed. If the client goes away the
/// handler future is dropped and the analysis is cancelled.
pub async fn analyze_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            log::debug!("Rejected analyze request body: {}", rejection.body_text());
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("invalid JSON body: {}", rejection.body_text()),
            );
        }
    };
    if request.url.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "url is required");
    }

    let cancel = CancellationToken::new();
    let _disconnect_guard = cancel.clone().drop_guard();

    match state.analyzer.analyze(&request, &cancel).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(failure) if failure.source.is_client_error() => {
            error_response(StatusCode::BAD_REQUEST, failure.source.to_string())
        }
        Err(failure) => (StatusCode::BAD_GATEWAY, Json(*failure.partial)).into_response(),
    }
}

/// Any method other than POST on `/api/analyze`.
pub async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}
