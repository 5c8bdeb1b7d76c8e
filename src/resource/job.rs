use axum::extract::{Extension, Path, Query, State};
use serde_json::json;
use std::collections::HashMap;

use super::{created, ok, HandlerResult};
use crate::auth::{ensure_admin, CurrentUser};
use crate::error::{AppError, AppResult};
use crate::extractors::{ApiJson, ApiJsonRejection};
use crate::models::{JobUpdate, NewJob};
use crate::parser::parse_job_query;
use crate::schema::{validate_job_update, validate_new_job};
use crate::startup::AppState;

/// Job ids arrive as path text; anything but an integer is a client error
pub(crate) fn parse_job_id(raw: &str) -> AppResult<i32> {
    raw.parse::<i32>()
        .map_err(|_| AppError::BadRequest(format!("Invalid job id: {}", raw)))
}

/// POST /jobs
pub async fn create_job(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    payload: Result<ApiJson<NewJob>, ApiJsonRejection>,
) -> HandlerResult {
    ensure_admin(&current).map_err(|e| e.to_response())?;
    let ApiJson(new_job) = payload.map_err(|e| e.to_response())?;
    validate_new_job(&new_job).map_err(|e| e.to_response())?;

    let job = state
        .backend
        .create_job(&new_job)
        .await
        .map_err(|e| e.to_response())?;
    Ok(created(json!({ "job": job })))
}

/// GET /jobs
///
/// Both paths honour `sortBy` and `sortOrder`. Without them the full listing
/// is ordered by title and a filtered search by id.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> HandlerResult {
    let query = parse_job_query(&params).map_err(|e| e.to_response())?;

    let jobs = if query.filter.is_empty() {
        state
            .backend
            .find_all_jobs(&query.sort.unwrap_or_default())
            .await
    } else {
        state
            .backend
            .find_jobs(&query.filter, query.sort.as_ref())
            .await
    }
    .map_err(|e| e.to_response())?;

    Ok(ok(json!({ "jobs": jobs })))
}

/// GET /jobs/{id}
pub async fn get_job(State(state): State<AppState>, Path(raw_id): Path<String>) -> HandlerResult {
    let id = parse_job_id(&raw_id).map_err(|e| e.to_response())?;

    let job = state.backend.get_job(id).await.map_err(|e| e.to_response())?;
    Ok(ok(json!({ "job": job })))
}

/// PATCH /jobs/{id}
pub async fn update_job(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
    payload: Result<ApiJson<JobUpdate>, ApiJsonRejection>,
) -> HandlerResult {
    ensure_admin(&current).map_err(|e| e.to_response())?;
    let id = parse_job_id(&raw_id).map_err(|e| e.to_response())?;
    let ApiJson(update) = payload.map_err(|e| e.to_response())?;
    validate_job_update(&update).map_err(|e| e.to_response())?;

    let job = state
        .backend
        .update_job(id, &update)
        .await
        .map_err(|e| e.to_response())?;
    Ok(ok(json!({ "job": job })))
}

/// DELETE /jobs/{id}
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
) -> HandlerResult {
    ensure_admin(&current).map_err(|e| e.to_response())?;
    let id = parse_job_id(&raw_id).map_err(|e| e.to_response())?;

    state.backend.remove_job(id).await.map_err(|e| e.to_response())?;
    Ok(ok(json!({ "deleted": id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_job_id() {
        assert_eq!(parse_job_id("42").unwrap(), 42);
        assert!(matches!(parse_job_id("abc"), Err(AppError::BadRequest(_))));
        assert!(parse_job_id("99999999999").is_err());
    }
}
