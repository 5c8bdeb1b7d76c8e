use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::error_response;

pub mod company;
pub mod health;
pub mod job;
pub mod token;
pub mod user;

/// Handler outcome; errors carry the `{"error": {...}}` body
pub type HandlerResult = Result<Response, (StatusCode, Json<serde_json::Value>)>;

/// Fallback for unknown routes
pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

pub(crate) fn ok(body: serde_json::Value) -> Response {
    Json(body).into_response()
}

pub(crate) fn created(body: serde_json::Value) -> Response {
    (StatusCode::CREATED, Json(body)).into_response()
}
