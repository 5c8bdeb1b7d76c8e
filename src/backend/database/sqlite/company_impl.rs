use async_trait::async_trait;
use sqlx::SqlitePool;

use super::bind_values;
use crate::backend::database::company_ops::CompanyStore;
use crate::backend::database::dialect::{SqlDialect, SqliteDialect};
use crate::backend::database::filter::WhereClause;
use crate::backend::database::update_clause::UpdateClause;
use crate::models::{Company, CompanyJob, NewCompany};

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// SQLite-specific implementation of CompanyStore
pub struct SqliteCompanyStore {
    pool: SqlitePool,
}

impl SqliteCompanyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyStore for SqliteCompanyStore {
    fn dialect(&self) -> &'static dyn SqlDialect {
        &SqliteDialect
    }

    async fn insert_company(&self, company: &NewCompany) -> Result<Company, sqlx::Error> {
        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {}",
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
        let sql = format!("SELECT {} FROM companies WHERE handle = ?1", COMPANY_COLUMNS);
        sqlx::query_as::<_, Company>(&sql)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await
    }

    async fn fetch_company_jobs(&self, handle: &str) -> Result<Vec<CompanyJob>, sqlx::Error> {
        let sql = format!(
            "SELECT id, title, salary, {} AS equity FROM jobs \
             WHERE company_handle = ?1 ORDER BY id",
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
        let result = sqlx::query("DELETE FROM companies WHERE handle = ?1")
            .bind(handle)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::database::sqlite::schema::init_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_delete_cascades_to_jobs() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        let store = SqliteCompanyStore::new(pool.clone());

        store
            .insert_company(&NewCompany {
                handle: "c1".to_string(),
                name: "C1".to_string(),
                description: "Desc1".to_string(),
                num_employees: Some(1),
                logo_url: None,
            })
            .await
            .unwrap();
        sqlx::query("INSERT INTO jobs (title, company_handle) VALUES ('j1', 'c1')")
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(store.fetch_company_jobs("c1").await.unwrap().len(), 1);

        assert_eq!(store.delete_company("c1").await.unwrap(), 1);

        let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining.0, 0);
    }
}
