use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::super::config::DatabaseBackendConfig;
use super::{PostgresCompanyStore, PostgresJobStore, PostgresUserStore};
use crate::backend::database::{UnifiedCompanyOps, UnifiedJobOps, UnifiedUserOps};
use crate::backend::{Backend, CompanyBackend, JobBackend, UserBackend};
use crate::error::{AppError, AppResult};
use crate::models::{
    Company, CompanyFilter, CompanyUpdate, CompanyWithJobs, Job, JobFilter, JobUpdate, NewCompany,
    NewJob, NewUser, User, UserUpdate, UserWithJobs,
};
use crate::parser::SortSpec;
use crate::password::PasswordManager;

/// PostgreSQL database backend implementation
///
/// Stores equity as NUMERIC and relies on foreign keys with
/// `ON DELETE CASCADE` to remove dependent jobs and applications.
pub struct PostgresBackend {
    pool: PgPool,
    user_ops: UnifiedUserOps<PostgresUserStore>,
    job_ops: UnifiedJobOps<PostgresJobStore>,
    company_ops: UnifiedCompanyOps<PostgresCompanyStore>,
}

impl PostgresBackend {
    /// Create a new PostgreSQL backend instance
    pub fn new(pool: PgPool, passwords: Arc<PasswordManager>) -> Self {
        Self {
            user_ops: UnifiedUserOps::new(PostgresUserStore::new(pool.clone()), passwords),
            job_ops: UnifiedJobOps::new(PostgresJobStore::new(pool.clone())),
            company_ops: UnifiedCompanyOps::new(PostgresCompanyStore::new(pool.clone())),
            pool,
        }
    }

    /// Get the connection pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Backend for PostgresBackend {
    async fn connect(
        config: &DatabaseBackendConfig,
        passwords: Arc<PasswordManager>,
    ) -> AppResult<Self> {
        config
            .validate()
            .map_err(|e| AppError::Configuration(format!("Invalid backend config: {}", e)))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.connection_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

        info!(max_connections = config.max_connections, "Connected to PostgreSQL");
        Ok(Self::new(pool, passwords))
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Health check failed: {}", e)))?;

        Ok(())
    }

    async fn init_schema(&self) -> AppResult<()> {
        super::schema::init_schema(&self.pool).await
    }

    async fn cleanup(&self) -> AppResult<()> {
        self.pool.close().await;
        Ok(())
    }
}

#[async_trait]
impl UserBackend for PostgresBackend {
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        self.user_ops.authenticate(username, password).await
    }

    async fn register_user(&self, user: &NewUser) -> AppResult<User> {
        self.user_ops.register(user).await
    }

    async fn find_all_users(&self) -> AppResult<Vec<UserWithJobs>> {
        self.user_ops.find_all().await
    }

    async fn get_user(&self, username: &str) -> AppResult<UserWithJobs> {
        self.user_ops.get(username).await
    }

    async fn update_user(&self, username: &str, update: &UserUpdate) -> AppResult<User> {
        self.user_ops.update(username, update).await
    }

    async fn remove_user(&self, username: &str) -> AppResult<()> {
        self.user_ops.remove(username).await
    }

    async fn apply_to_job(&self, username: &str, job_id: i32) -> AppResult<()> {
        self.user_ops.apply(username, job_id).await
    }
}

#[async_trait]
impl JobBackend for PostgresBackend {
    async fn create_job(&self, job: &NewJob) -> AppResult<Job> {
        self.job_ops.create(job).await
    }

    async fn find_all_jobs(&self, sort: &SortSpec) -> AppResult<Vec<Job>> {
        self.job_ops.find_all(sort).await
    }

    async fn get_job(&self, id: i32) -> AppResult<Job> {
        self.job_ops.get(id).await
    }

    async fn find_jobs(
        &self,
        filter: &JobFilter,
        sort: Option<&SortSpec>,
    ) -> AppResult<Vec<Job>> {
        self.job_ops.find(filter, sort).await
    }

    async fn update_job(&self, id: i32, update: &JobUpdate) -> AppResult<Job> {
        self.job_ops.update(id, update).await
    }

    async fn remove_job(&self, id: i32) -> AppResult<()> {
        self.job_ops.remove(id).await
    }
}

#[async_trait]
impl CompanyBackend for PostgresBackend {
    async fn create_company(&self, company: &NewCompany) -> AppResult<Company> {
        self.company_ops.create(company).await
    }

    async fn find_companies(&self, filter: &CompanyFilter) -> AppResult<Vec<Company>> {
        self.company_ops.find(filter).await
    }

    async fn get_company(&self, handle: &str) -> AppResult<CompanyWithJobs> {
        self.company_ops.get(handle).await
    }

    async fn update_company(&self, handle: &str, update: &CompanyUpdate) -> AppResult<Company> {
        self.company_ops.update(handle, update).await
    }

    async fn remove_company(&self, handle: &str) -> AppResult<()> {
        self.company_ops.remove(handle).await
    }
}
