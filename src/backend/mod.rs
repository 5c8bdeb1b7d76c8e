use crate::backend::database::DatabaseBackendConfig;
use crate::error::AppResult;
use crate::models::{
    Company, CompanyFilter, CompanyUpdate, CompanyWithJobs, Job, JobFilter, JobUpdate, NewCompany,
    NewJob, NewUser, User, UserUpdate, UserWithJobs,
};
use crate::parser::SortSpec;
use crate::password::PasswordManager;
use async_trait::async_trait;
use std::sync::Arc;

pub mod database;

/// Supported database backend types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl DatabaseType {
    /// Parse the `type` value of the database configuration
    pub fn parse(value: &str) -> Option<DatabaseType> {
        match value {
            "postgresql" | "postgres" => Some(DatabaseType::PostgreSQL),
            "sqlite" => Some(DatabaseType::SQLite),
            _ => None,
        }
    }
}

/// Core backend abstraction
///
/// Each database implementation (PostgreSQL, SQLite) implements this trait
/// together with the per-resource traits below.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Connect to the storage backend
    async fn connect(
        config: &DatabaseBackendConfig,
        passwords: Arc<PasswordManager>,
    ) -> AppResult<Self>
    where
        Self: Sized;

    /// Check if the storage backend is healthy and accessible
    async fn health_check(&self) -> AppResult<()>;

    /// Create tables and indexes if they do not exist yet
    async fn init_schema(&self) -> AppResult<()>;

    /// Clean up resources when storage is no longer needed
    async fn cleanup(&self) -> AppResult<()> {
        Ok(())
    }
}

/// User operations, including authentication and job applications
#[async_trait]
pub trait UserBackend: Backend {
    /// Verify credentials; unknown user and wrong password fail alike
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<User>;

    /// Register a new user with a hashed password
    async fn register_user(&self, user: &NewUser) -> AppResult<User>;

    /// All users with the ids of the jobs they applied to
    async fn find_all_users(&self) -> AppResult<Vec<UserWithJobs>>;

    async fn get_user(&self, username: &str) -> AppResult<UserWithJobs>;

    /// Partial update; the password is re-hashed when present
    async fn update_user(&self, username: &str, update: &UserUpdate) -> AppResult<User>;

    async fn remove_user(&self, username: &str) -> AppResult<()>;

    /// Record that a user applied to a job
    async fn apply_to_job(&self, username: &str, job_id: i32) -> AppResult<()>;
}

/// Job operations
#[async_trait]
pub trait JobBackend: Backend {
    async fn create_job(&self, job: &NewJob) -> AppResult<Job>;

    /// All jobs sorted by an allow-listed column
    async fn find_all_jobs(&self, sort: &SortSpec) -> AppResult<Vec<Job>>;

    async fn get_job(&self, id: i32) -> AppResult<Job>;

    /// Jobs matching every supplied filter
    ///
    /// Ordered by id when `sort` is `None`.
    async fn find_jobs(&self, filter: &JobFilter, sort: Option<&SortSpec>)
        -> AppResult<Vec<Job>>;

    async fn update_job(&self, id: i32, update: &JobUpdate) -> AppResult<Job>;

    async fn remove_job(&self, id: i32) -> AppResult<()>;
}

/// Company operations
#[async_trait]
pub trait CompanyBackend: Backend {
    async fn create_company(&self, company: &NewCompany) -> AppResult<Company>;

    async fn find_companies(&self, filter: &CompanyFilter) -> AppResult<Vec<Company>>;

    /// A company together with its jobs
    async fn get_company(&self, handle: &str) -> AppResult<CompanyWithJobs>;

    async fn update_company(&self, handle: &str, update: &CompanyUpdate) -> AppResult<Company>;

    async fn remove_company(&self, handle: &str) -> AppResult<()>;
}

/// Combined backend interface for every resource
pub trait JobBoardBackend: UserBackend + JobBackend + CompanyBackend {}

/// Automatic implementation for any type that implements all resource traits
impl<T> JobBoardBackend for T where T: UserBackend + JobBackend + CompanyBackend {}

/// Factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend based on configuration
    pub async fn create(
        config: &DatabaseBackendConfig,
        passwords: Arc<PasswordManager>,
    ) -> AppResult<Arc<dyn JobBoardBackend>> {
        let backend = Self::create_backend(config, passwords).await?;
        Ok(Arc::from(backend))
    }

    /// Create a backend based on configuration (returns Box)
    pub async fn create_backend(
        config: &DatabaseBackendConfig,
        passwords: Arc<PasswordManager>,
    ) -> AppResult<Box<dyn JobBoardBackend>> {
        match config.database_type {
            DatabaseType::PostgreSQL => {
                let backend =
                    database::postgres::PostgresBackend::connect(config, passwords).await?;
                Ok(Box::new(backend))
            }
            DatabaseType::SQLite => {
                let backend = database::sqlite::SqliteBackend::connect(config, passwords).await?;
                Ok(Box::new(backend))
            }
        }
    }
}
