use axum::extract::{Extension, Path, State};
use serde_json::json;

use super::job::parse_job_id;
use super::{created, ok, HandlerResult};
use crate::auth::{create_token, ensure_admin, ensure_correct_user_or_admin, CurrentUser};
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiJsonRejection};
use crate::models::{NewUser, UserUpdate};
use crate::schema::{validate_new_user, validate_user_update};
use crate::startup::AppState;

/// POST /users: admin-only creation, may grant admin
pub async fn create_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    payload: Result<ApiJson<NewUser>, ApiJsonRejection>,
) -> HandlerResult {
    ensure_admin(&current).map_err(|e| e.to_response())?;
    let ApiJson(new_user) = payload.map_err(|e| e.to_response())?;
    validate_new_user(&new_user).map_err(|e| e.to_response())?;

    let user = state
        .backend
        .register_user(&new_user)
        .await
        .map_err(|e| e.to_response())?;

    let token = create_token(&user, &state.config.security).map_err(|e| e.to_response())?;
    Ok(created(json!({ "user": user, "token": token })))
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> HandlerResult {
    ensure_admin(&current).map_err(|e| e.to_response())?;

    let users = state
        .backend
        .find_all_users()
        .await
        .map_err(|e| e.to_response())?;
    Ok(ok(json!({ "users": users })))
}

/// GET /users/{username}
pub async fn get_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(username): Path<String>,
) -> HandlerResult {
    ensure_correct_user_or_admin(&current, &username).map_err(|e| e.to_response())?;

    let user = state
        .backend
        .get_user(&username)
        .await
        .map_err(|e| e.to_response())?;
    Ok(ok(json!({ "user": user })))
}

/// PATCH /users/{username}
///
/// Only admins may change `isAdmin`.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(username): Path<String>,
    payload: Result<ApiJson<UserUpdate>, ApiJsonRejection>,
) -> HandlerResult {
    let claims =
        ensure_correct_user_or_admin(&current, &username).map_err(|e| e.to_response())?;
    let ApiJson(update) = payload.map_err(|e| e.to_response())?;

    if update.is_admin.is_some() && !claims.is_admin {
        return Err(AppError::Unauthorized("Only admins may change isAdmin".to_string())
            .to_response());
    }
    validate_user_update(&update).map_err(|e| e.to_response())?;

    let user = state
        .backend
        .update_user(&username, &update)
        .await
        .map_err(|e| e.to_response())?;
    Ok(ok(json!({ "user": user })))
}

/// DELETE /users/{username}
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(username): Path<String>,
) -> HandlerResult {
    ensure_correct_user_or_admin(&current, &username).map_err(|e| e.to_response())?;

    state
        .backend
        .remove_user(&username)
        .await
        .map_err(|e| e.to_response())?;
    Ok(ok(json!({ "deleted": username })))
}

/// POST /users/{username}/jobs/{id}
pub async fn apply_to_job(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((username, raw_id)): Path<(String, String)>,
) -> HandlerResult {
    ensure_correct_user_or_admin(&current, &username).map_err(|e| e.to_response())?;
    let job_id = parse_job_id(&raw_id).map_err(|e| e.to_response())?;

    state
        .backend
        .apply_to_job(&username, job_id)
        .await
        .map_err(|e| e.to_response())?;
    Ok(ok(json!({ "applied": job_id })))
}
