use axum::extract::State;
use serde_json::json;

use super::{created, ok, HandlerResult};
use crate::auth::create_token;
use crate::extractors::ApiJson;
use crate::models::{Credentials, NewUser};
use crate::schema::validate_new_user;
use crate::startup::AppState;

/// POST /auth/token: exchange credentials for a token
pub async fn token(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> HandlerResult {
    let user = state
        .backend
        .authenticate(&credentials.username, &credentials.password)
        .await
        .map_err(|e| e.to_response())?;

    let token = create_token(&user, &state.config.security).map_err(|e| e.to_response())?;
    Ok(ok(json!({ "token": token })))
}

/// POST /auth/register: self-service signup, never grants admin
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewUser>,
) -> HandlerResult {
    let new_user = NewUser {
        is_admin: false,
        ..payload
    };
    validate_new_user(&new_user).map_err(|e| e.to_response())?;

    let user = state
        .backend
        .register_user(&new_user)
        .await
        .map_err(|e| e.to_response())?;

    let token = create_token(&user, &state.config.security).map_err(|e| e.to_response())?;
    Ok(created(json!({ "token": token })))
}
