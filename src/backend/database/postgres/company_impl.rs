use async_trait::async_trait;
use sqlx::PgPool;

use super::bind_values;
use crate::backend::database::company_ops::CompanyStore;
use crate::backend::database::dialect::{PostgresDialect, SqlDialect};
use crate::backend::database::filter::WhereClause;
use crate::backend::database::update_clause::UpdateClause;
use crate::models::{Company, CompanyJob, NewCompany};

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// PostgreSQL-specific implementation of CompanyStore
pub struct PostgresCompanyStore {
    pool: PgPool,
}

impl PostgresCompanyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyStore for PostgresCompanyStore {
    fn dialect(&self) -> &'static dyn SqlDialect {
        &PostgresDialect
    }

    async fn insert_company(&self, company: &NewCompany) -> Result<Company, sqlx::Error> {
        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COMPANY_COLUMNS
        );
        sqlx::query_as::<_, Company>(&sql)
            .bind(&company.handle)
            .bind(&company.name)
            .bind(&company.description)
            .bind(company.num_employees)
            .bind(&company.logo_url)
            .fetch_one(&self.pool)
            .await
    }

    async fn find_companies(&self, clause: &WhereClause) -> Result<Vec<Company>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM companies WHERE {} ORDER BY name",
            COMPANY_COLUMNS, clause.sql
        );
        bind_values(sqlx::query_as::<_, Company>(&sql), &clause.values)
            .fetch_all(&self.pool)
            .await
    }

    async fn fetch_company(&self, handle: &str) -> Result<Option<Company>, sqlx::Error> {
        let sql = format!("SELECT {} FROM companies WHERE handle = $1", COMPANY_COLUMNS);
        sqlx::query_as::<_, Company>(&sql)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await
    }

    async fn fetch_company_jobs(&self, handle: &str) -> Result<Vec<CompanyJob>, sqlx::Error> {
        let sql = format!(
            "SELECT id, title, salary, {} AS equity FROM jobs \
             WHERE company_handle = $1 ORDER BY id",
            self.dialect().decimal_select("equity")
        );
        sqlx::query_as::<_, CompanyJob>(&sql)
            .bind(handle)
            .fetch_all(&self.pool)
            .await
    }

    async fn update_company(
        &self,
        handle: &str,
        clause: &UpdateClause,
    ) -> Result<Option<Company>, sqlx::Error> {
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = {} RETURNING {}",
            clause.set_cols,
            self.dialect().param_placeholder(clause.next_index()),
            COMPANY_COLUMNS
        );
        bind_values(sqlx::query_as::<_, Company>(&sql), &clause.values)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_company(&self, handle: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM companies WHERE handle = $1")
            .bind(handle)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
