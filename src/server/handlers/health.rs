//! Liveness handler.

/// Always `200 ok`.
pub async fn health_handler() -> &'static str {
    "ok"
}
