use async_trait::async_trait;
use sqlx::SqlitePool;

use super::bind_values;
use crate::backend::database::application::ApplicationCheck;
use crate::backend::database::dialect::{SqlDialect, SqliteDialect};
use crate::backend::database::update_clause::UpdateClause;
use crate::backend::database::user_ops::{PreparedUser, UserCredentialRow, UserJobRow, UserStore};
use crate::models::User;

const USER_COLUMNS: &str = "username, first_name, last_name, email, is_admin";

/// SQLite-specific implementation of UserStore
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    fn dialect(&self) -> &'static dyn SqlDialect {
        &SqliteDialect
    }

    async fn fetch_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentialRow>, sqlx::Error> {
        let sql = format!("SELECT {}, password FROM users WHERE username = ?1", USER_COLUMNS);
        sqlx::query_as::<_, UserCredentialRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    async fn username_exists(&self, username: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
    }

    async fn insert_user(&self, user: &PreparedUser) -> Result<User, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(user.is_admin)
            .fetch_one(&self.pool)
            .await
    }

    async fn fetch_users_with_jobs(
        &self,
        username: Option<&str>,
    ) -> Result<Vec<UserJobRow>, sqlx::Error> {
        let filter = if username.is_some() {
            "WHERE u.username = ?1"
        } else {
            ""
        };
        let sql = format!(
            r#"
            SELECT u.username, u.first_name, u.last_name, u.email, u.is_admin, a.job_id
            FROM users u
            LEFT JOIN applications a ON a.username = u.username
            {}
            ORDER BY u.username, a.job_id
            "#,
            filter
        );

        let mut query = sqlx::query_as::<_, UserJobRow>(&sql);
        if let Some(username) = username {
            query = query.bind(username);
        }
        query.fetch_all(&self.pool).await
    }

    async fn update_user(
        &self,
        username: &str,
        clause: &UpdateClause,
    ) -> Result<Option<User>, sqlx::Error> {
        let sql = format!(
            "UPDATE users SET {} WHERE username = {} RETURNING {}",
            clause.set_cols,
            self.dialect().param_placeholder(clause.next_index()),
            USER_COLUMNS
        );

        bind_values(sqlx::query_as::<_, User>(&sql), &clause.values)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_user(&self, username: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE username = ?1")
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn check_application(
        &self,
        username: &str,
        job_id: i32,
    ) -> Result<ApplicationCheck, sqlx::Error> {
        sqlx::query_as::<_, ApplicationCheck>(
            r#"
            SELECT
                EXISTS(SELECT 1 FROM users WHERE username = ?1) AS user_exists,
                EXISTS(SELECT 1 FROM jobs WHERE id = ?2) AS job_exists,
                EXISTS(SELECT 1 FROM applications WHERE username = ?1 AND job_id = ?2) AS already_applied
            "#,
        )
        .bind(username)
        .bind(job_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn insert_application(&self, username: &str, job_id: i32) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO applications (username, job_id) VALUES (?1, ?2)")
            .bind(username)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
