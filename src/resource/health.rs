use axum::extract::State;
use serde_json::json;

use super::{ok, HandlerResult};
use crate::startup::AppState;

/// Liveness check that also round-trips the store
pub async fn health(State(state): State<AppState>) -> HandlerResult {
    state
        .backend
        .health_check()
        .await
        .map_err(|e| e.to_response())?;

    Ok(ok(json!({"status": "ok"})))
}
