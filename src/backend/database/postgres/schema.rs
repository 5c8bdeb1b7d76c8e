use crate::error::{AppError, AppResult};
use sqlx::PgPool;

/// Initialize the job board schema for PostgreSQL
///
/// Creates companies, jobs, users and applications with their constraints.
/// Safe to run on every startup.
pub async fn init_schema(pool: &PgPool) -> AppResult<()> {
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
                id SERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                salary INTEGER CHECK (salary >= 0),
                equity NUMERIC CHECK (equity <= 1.0),
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
                is_admin BOOLEAN NOT NULL DEFAULT FALSE
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

/// Create performance indexes for foreign key lookups
async fn create_indexes(pool: &PgPool) -> AppResult<()> {
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
pub async fn drop_schema(pool: &PgPool) -> AppResult<()> {
    // Reverse order due to foreign key constraints
    for table in ["applications", "users", "jobs", "companies"] {
        let sql = format!("DROP TABLE IF EXISTS {} CASCADE", table);
        sqlx::query(&sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to drop table {}: {}", table, e)))?;
    }

    Ok(())
}
