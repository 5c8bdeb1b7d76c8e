use async_trait::async_trait;
use sqlx::PgPool;

use super::bind_values;
use crate::backend::database::dialect::{PostgresDialect, SqlDialect};
use crate::backend::database::filter::WhereClause;
use crate::backend::database::job_ops::{JobProcessor, JobStore, PreparedJob};
use crate::backend::database::update_clause::UpdateClause;
use crate::models::Job;

/// PostgreSQL-specific implementation of JobStore
pub struct PostgresJobStore {
    pool: PgPool,
}

impl PostgresJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn columns(&self) -> String {
        JobProcessor::columns(self.dialect())
    }
}

#[async_trait]
impl JobStore for PostgresJobStore {
    fn dialect(&self) -> &'static dyn SqlDialect {
        &PostgresDialect
    }

    async fn insert_job(&self, job: &PreparedJob) -> Result<Job, sqlx::Error> {
        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3::numeric, $4) RETURNING {}",
            self.columns()
        );
        sqlx::query_as::<_, Job>(&sql)
            .bind(&job.title)
            .bind(job.salary)
            .bind(&job.equity)
            .bind(&job.company_handle)
            .fetch_one(&self.pool)
            .await
    }

    async fn fetch_jobs(&self, order_by: &str) -> Result<Vec<Job>, sqlx::Error> {
        let sql = format!("SELECT {} FROM jobs ORDER BY {}", self.columns(), order_by);
        sqlx::query_as::<_, Job>(&sql).fetch_all(&self.pool).await
    }

    async fn fetch_job(&self, id: i32) -> Result<Option<Job>, sqlx::Error> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", self.columns());
        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_jobs(
        &self,
        clause: &WhereClause,
        order_by: &str,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE {} ORDER BY {}",
            self.columns(),
            clause.sql,
            order_by
        );
        bind_values(sqlx::query_as::<_, Job>(&sql), &clause.values)
            .fetch_all(&self.pool)
            .await
    }

    async fn update_job(
        &self,
        id: i32,
        clause: &UpdateClause,
    ) -> Result<Option<Job>, sqlx::Error> {
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = {} RETURNING {}",
            clause.set_cols,
            self.dialect().param_placeholder(clause.next_index()),
            self.columns()
        );
        bind_values(sqlx::query_as::<_, Job>(&sql), &clause.values)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_job(&self, id: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
