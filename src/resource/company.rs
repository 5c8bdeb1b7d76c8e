use axum::extract::{Extension, Path, Query, State};
use serde_json::json;
use std::collections::HashMap;

use super::{created, ok, HandlerResult};
use crate::auth::{ensure_admin, CurrentUser};
use crate::extractors::{ApiJson, ApiJsonRejection};
use crate::models::{CompanyUpdate, NewCompany};
use crate::parser::parse_company_query;
use crate::schema::{validate_company_update, validate_new_company};
use crate::startup::AppState;

/// POST /companies
pub async fn create_company(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    payload: Result<ApiJson<NewCompany>, ApiJsonRejection>,
) -> HandlerResult {
    ensure_admin(&current).map_err(|e| e.to_response())?;
    let ApiJson(new_company) = payload.map_err(|e| e.to_response())?;
    validate_new_company(&new_company).map_err(|e| e.to_response())?;

    let company = state
        .backend
        .create_company(&new_company)
        .await
        .map_err(|e| e.to_response())?;
    Ok(created(json!({ "company": company })))
}

/// GET /companies
pub async fn list_companies(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> HandlerResult {
    let filter = parse_company_query(&params).map_err(|e| e.to_response())?;

    let companies = state
        .backend
        .find_companies(&filter)
        .await
        .map_err(|e| e.to_response())?;
    Ok(ok(json!({ "companies": companies })))
}

/// GET /companies/{handle}
pub async fn get_company(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> HandlerResult {
    let company = state
        .backend
        .get_company(&handle)
        .await
        .map_err(|e| e.to_response())?;
    Ok(ok(json!({ "company": company })))
}

/// PATCH /companies/{handle}
pub async fn update_company(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(handle): Path<String>,
    payload: Result<ApiJson<CompanyUpdate>, ApiJsonRejection>,
) -> HandlerResult {
    ensure_admin(&current).map_err(|e| e.to_response())?;
    let ApiJson(update) = payload.map_err(|e| e.to_response())?;
    validate_company_update(&update).map_err(|e| e.to_response())?;

    let company = state
        .backend
        .update_company(&handle, &update)
        .await
        .map_err(|e| e.to_response())?;
    Ok(ok(json!({ "company": company })))
}

/// DELETE /companies/{handle}
pub async fn delete_company(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(handle): Path<String>,
) -> HandlerResult {
    ensure_admin(&current).map_err(|e| e.to_response())?;

    state
        .backend
        .remove_company(&handle)
        .await
        .map_err(|e| e.to_response())?;
    Ok(ok(json!({ "deleted": handle })))
}
