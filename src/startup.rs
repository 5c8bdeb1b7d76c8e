use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::auth;
use crate::backend::{BackendFactory, JobBoardBackend};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::logging::logging_middleware;
use crate::resource::{self, company, health, job, token, user};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn JobBoardBackend>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(backend: Arc<dyn JobBoardBackend>, config: AppConfig) -> Self {
        Self {
            backend,
            config: Arc::new(config),
        }
    }
}

/// Connect the configured backend and make sure the schema exists
pub async fn setup_backend(config: &AppConfig) -> AppResult<Arc<dyn JobBoardBackend>> {
    let backend_config = config.to_backend_config()?;
    let passwords = Arc::new(config.password_manager()?);

    info!(
        database = ?backend_config.database_type,
        password_algorithm = %passwords.current_algorithm(),
        "Setting up backend"
    );

    let backend = BackendFactory::create(&backend_config, passwords).await?;
    backend.init_schema().await?;
    info!("Schema initialized");

    Ok(backend)
}

/// Every route of the service with authentication and access logging
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/auth/token", post(token::token))
        .route("/auth/register", post(token::register))
        .route("/users", post(user::create_user).get(user::list_users))
        .route(
            "/users/{username}",
            get(user::get_user)
                .patch(user::update_user)
                .delete(user::delete_user),
        )
        .route("/users/{username}/jobs/{id}", post(user::apply_to_job))
        .route("/jobs", post(job::create_job).get(job::list_jobs))
        .route(
            "/jobs/{id}",
            get(job::get_job).patch(job::update_job).delete(job::delete_job),
        )
        .route(
            "/companies",
            post(company::create_company).get(company::list_companies),
        )
        .route(
            "/companies/{handle}",
            get(company::get_company)
                .patch(company::update_company)
                .delete(company::delete_company),
        )
        .fallback(resource::not_found)
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth::authenticate_jwt,
        ))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}
