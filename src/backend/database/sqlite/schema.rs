use crate::error::{AppError, AppResult};
use sqlx::SqlitePool;

/// Initialize the job board schema for SQLite
///
/// Equity is kept as canonical decimal text and checked numerically.
pub async fn init_schema(pool: &SqlitePool) -> AppResult<()> {
    let tables = [
        (
            "companies",
            r#"
            CREATE TABLE IF NOT EXISTS companies (
                handle TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                num_employees INTEGER CHECK (num_employees >= 0),
                description TEXT NOT NULL,
                logo_url TEXT
            )
            "#,
        ),
        (
            "jobs",
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                salary INTEGER CHECK (salary >= 0),
                equity TEXT CHECK (CAST(equity AS REAL) <= 1),
                company_handle TEXT NOT NULL
                    REFERENCES companies (handle) ON DELETE CASCADE
            )
            "#,
        ),
        (
            "users",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY,
                password TEXT NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL,
                is_admin BOOLEAN NOT NULL DEFAULT 0
            )
            "#,
        ),
        (
            "applications",
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                username TEXT NOT NULL
                    REFERENCES users (username) ON DELETE CASCADE,
                job_id INTEGER NOT NULL
                    REFERENCES jobs (id) ON DELETE CASCADE,
                PRIMARY KEY (username, job_id)
            )
            "#,
        ),
    ];

    for (table, sql) in tables {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create {} table: {}", table, e)))?;
    }

    create_indexes(pool).await
}

async fn create_indexes(pool: &SqlitePool) -> AppResult<()> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_jobs_company_handle ON jobs (company_handle)",
        "CREATE INDEX IF NOT EXISTS idx_applications_job_id ON applications (job_id)",
    ];

    for sql in indexes {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;
    }

    Ok(())
}

/// Drop every table (for cleanup/testing)
pub async fn drop_schema(pool: &SqlitePool) -> AppResult<()> {
    for table in ["applications", "users", "jobs", "companies"] {
        let sql = format!("DROP TABLE IF EXISTS {}", table);
        sqlx::query(&sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to drop table {}: {}", table, e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_schema_creation_is_idempotent() {
        let pool = create_test_pool().await;
        init_schema(&pool).await.unwrap();
        init_schema(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(names, vec!["applications", "companies", "jobs", "users"]);
    }

    #[tokio::test]
    async fn test_equity_check_constraint() {
        let pool = create_test_pool().await;
        init_schema(&pool).await.unwrap();

        sqlx::query("INSERT INTO companies (handle, name, description) VALUES ('c1', 'C1', 'Desc1')")
            .execute(&pool)
            .await
            .unwrap();

        let ok = sqlx::query("INSERT INTO jobs (title, equity, company_handle) VALUES ('j', '0.5', 'c1')")
            .execute(&pool)
            .await;
        assert!(ok.is_ok());

        let too_big = sqlx::query("INSERT INTO jobs (title, equity, company_handle) VALUES ('j', '1.5', 'c1')")
            .execute(&pool)
            .await;
        assert!(too_big.is_err());
    }

    #[tokio::test]
    async fn test_drop_schema() {
        let pool = create_test_pool().await;
        init_schema(&pool).await.unwrap();
        drop_schema(&pool).await.unwrap();

        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'jobs'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count.0, 0);
    }
}
