//! Health check endpoint

use axum::{http::StatusCode, response::IntoResponse, Json};

/// GET /health - liveness probe
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "OK",
            "message": "Server is running",
        })),
    )
}
