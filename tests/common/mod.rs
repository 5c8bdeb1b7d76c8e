#![allow(dead_code)]

use axum::Router;
use axum_test::TestServer;
use jobboard_server::auth::create_token;
use jobboard_server::backend::database::postgres::{schema, PostgresBackend};
use jobboard_server::backend::database::DatabaseBackendConfig;
use jobboard_server::backend::{Backend, JobBoardBackend};
use jobboard_server::config::AppConfig;
use jobboard_server::models::{NewCompany, NewJob, NewUser, User};
use jobboard_server::password::{PasswordAlgorithm, PasswordManager};
use jobboard_server::{build_router, setup_backend, AppState};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::{Mutex, MutexGuard};

/// Default configuration with the cheapest bcrypt cost
pub fn create_test_app_config() -> AppConfig {
    let mut config = AppConfig::default_config();
    config.security.bcrypt_work_factor = 4;
    config
}

/// Create backend for testing with in-memory SQLite database
pub async fn setup_test_database() -> Result<Arc<dyn JobBoardBackend>, Box<dyn std::error::Error>> {
    Ok(setup_backend(&create_test_app_config()).await?)
}

/// A freshly initialized PostgreSQL backend
///
/// The container, when one was started, is stopped when this is dropped.
pub struct PostgresTestDatabase {
    pub backend: Arc<dyn JobBoardBackend>,
    pub pool: PgPool,
    _container: Option<ContainerAsync<Postgres>>,
    _shared: Option<MutexGuard<'static, ()>>,
}

/// Tests sharing a DATABASE_URL server take turns with its schema
static SHARED_DATABASE: Mutex<()> = Mutex::const_new(());

/// Create backend for testing with PostgreSQL using TestContainers
///
/// DATABASE_URL, when set, points at an existing server instead. Returns
/// `None` when neither that nor Docker is available.
pub async fn setup_postgres_test_database() -> Option<PostgresTestDatabase> {
    let (url, container, shared) = match std::env::var("DATABASE_URL") {
        Ok(url) => (url, None, Some(SHARED_DATABASE.lock().await)),
        Err(_) => {
            let container = match Postgres::default().start().await {
                Ok(container) => container,
                Err(e) => {
                    eprintln!("Skipping PostgreSQL test, no container runtime: {}", e);
                    return None;
                }
            };
            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();
            let url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);
            (url, Some(container), None)
        }
    };

    let config = DatabaseBackendConfig::postgres(url).with_max_connections(5);
    let passwords = Arc::new(PasswordManager::new(PasswordAlgorithm::Bcrypt, 4).unwrap());
    let backend = PostgresBackend::connect(&config, passwords).await.unwrap();

    let pool = backend.pool().clone();
    schema::drop_schema(&pool).await.unwrap();
    backend.init_schema().await.unwrap();

    Some(PostgresTestDatabase {
        backend: Arc::new(backend),
        pool,
        _container: container,
        _shared: shared,
    })
}

/// Create a test app and keep a handle on its backend for seeding
pub async fn setup_test_app() -> Result<(Router, Arc<dyn JobBoardBackend>), Box<dyn std::error::Error>> {
    let config = create_test_app_config();
    let backend = setup_backend(&config).await?;
    let app = build_router(AppState::new(backend.clone(), config));
    Ok((app, backend))
}

/// Sign a token the way the server does, without a database round trip
pub fn token_for(username: &str, is_admin: bool) -> String {
    let user = User {
        username: username.to_string(),
        first_name: "F".to_string(),
        last_name: "L".to_string(),
        email: format!("{}@example.com", username),
        is_admin,
    };
    create_token(&user, &create_test_app_config().security).unwrap()
}

pub fn new_user(username: &str, is_admin: bool) -> NewUser {
    NewUser {
        username: username.to_string(),
        password: format!("password-{}", username),
        first_name: format!("F{}", username),
        last_name: format!("L{}", username),
        email: format!("{}@example.com", username),
        is_admin,
    }
}

pub fn new_company(handle: &str, num_employees: i32) -> NewCompany {
    NewCompany {
        handle: handle.to_string(),
        name: handle.to_uppercase(),
        description: format!("Desc {}", handle),
        num_employees: Some(num_employees),
        logo_url: Some(format!("http://{}.example.com/logo.png", handle)),
    }
}

pub fn new_job(title: &str, salary: i32, equity: Option<&str>, company_handle: &str) -> NewJob {
    NewJob {
        title: title.to_string(),
        salary: Some(salary),
        equity: equity.map(str::to_string),
        company_handle: company_handle.to_string(),
    }
}

/// Companies c1..c3, six jobs and users u1, u2 and admin
///
/// Jobs are titled after their salaries: j11, j12, j13 at c1 and j21, j22,
/// j23 at c2. u1 has applied to j11.
pub struct Fixture {
    pub job_ids: Vec<i32>,
}

pub async fn seed(backend: &Arc<dyn JobBoardBackend>) -> Fixture {
    for (handle, employees) in [("c1", 1), ("c2", 2), ("c3", 3)] {
        backend
            .create_company(&new_company(handle, employees))
            .await
            .unwrap();
    }

    let jobs = [
        ("j11", 11, Some("0.1"), "c1"),
        ("j12", 12, Some("0"), "c1"),
        ("j13", 13, None, "c1"),
        ("j21", 21, Some("0.2"), "c2"),
        ("j22", 22, None, "c2"),
        ("j23", 23, Some("0.3"), "c2"),
    ];
    let mut job_ids = Vec::new();
    for (title, salary, equity, handle) in jobs {
        let job = backend
            .create_job(&new_job(title, salary, equity, handle))
            .await
            .unwrap();
        job_ids.push(job.id);
    }

    backend.register_user(&new_user("u1", false)).await.unwrap();
    backend.register_user(&new_user("u2", false)).await.unwrap();
    backend.register_user(&new_user("admin", true)).await.unwrap();
    backend.apply_to_job("u1", job_ids[0]).await.unwrap();

    Fixture { job_ids }
}

/// A seeded server with tokens for every fixture user
pub struct SeededServer {
    pub server: TestServer,
    pub backend: Arc<dyn JobBoardBackend>,
    pub fixture: Fixture,
    pub u1_token: String,
    pub u2_token: String,
    pub admin_token: String,
}

pub async fn setup_seeded_server() -> SeededServer {
    let (app, backend) = setup_test_app().await.unwrap();
    let fixture = seed(&backend).await;
    SeededServer {
        server: TestServer::new(app).unwrap(),
        backend,
        fixture,
        u1_token: token_for("u1", false),
        u2_token: token_for("u2", false),
        admin_token: token_for("admin", true),
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn create_test_user_json(username: &str, first_name: &str, last_name: &str) -> Value {
    json!({
        "username": username,
        "password": "password123",
        "firstName": first_name,
        "lastName": last_name,
        "email": format!("{}@example.com", username)
    })
}

/// `error.message` of an error body
pub fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}
