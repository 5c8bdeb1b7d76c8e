//! User repository operations
//!
//! Shared business logic lives in [`UserProcessor`] and [`UnifiedUserOps`];
//! each database provides a [`UserStore`] that runs the actual statements.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::application::{ApplicationCheck, ApplicationProcessor};
use super::dialect::SqlDialect;
use super::update_clause::{sql_for_partial_update, SqlValue, UpdateClause};
use crate::error::{constraint_violation, map_database_error, AppError, AppResult, ConstraintViolation};
use crate::models::{NewUser, User, UserUpdate, UserWithJobs};
use crate::password::PasswordManager;

/// One row of the users/applications LEFT JOIN
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserJobRow {
    #[sqlx(flatten)]
    pub user: User,
    pub job_id: Option<i32>,
}

/// A user together with the stored password hash
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentialRow {
    #[sqlx(flatten)]
    pub user: User,
    pub password: String,
}

/// Registration data with the password already hashed
#[derive(Debug, Clone)]
pub struct PreparedUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Database-specific adapter for user statements
///
/// Methods return the raw driver error so constraint violations can be
/// classified by the shared logic.
#[async_trait]
pub trait UserStore: Send + Sync {
    fn dialect(&self) -> &'static dyn SqlDialect;

    async fn fetch_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentialRow>, sqlx::Error>;

    async fn username_exists(&self, username: &str) -> Result<bool, sqlx::Error>;

    async fn insert_user(&self, user: &PreparedUser) -> Result<User, sqlx::Error>;

    /// Users LEFT JOIN applications, ordered by username then job id
    async fn fetch_users_with_jobs(
        &self,
        username: Option<&str>,
    ) -> Result<Vec<UserJobRow>, sqlx::Error>;

    /// `UPDATE ... RETURNING`; `None` when no row matched
    async fn update_user(
        &self,
        username: &str,
        clause: &UpdateClause,
    ) -> Result<Option<User>, sqlx::Error>;

    /// Number of rows deleted
    async fn delete_user(&self, username: &str) -> Result<u64, sqlx::Error>;

    async fn check_application(
        &self,
        username: &str,
        job_id: i32,
    ) -> Result<ApplicationCheck, sqlx::Error>;

    async fn insert_application(&self, username: &str, job_id: i32) -> Result<(), sqlx::Error>;
}

/// Shared business logic for user operations
pub struct UserProcessor;

impl UserProcessor {
    /// Logical field names whose column differs
    pub const RENAMES: &'static [(&'static str, &'static str)] = &[
        ("firstName", "first_name"),
        ("lastName", "last_name"),
        ("isAdmin", "is_admin"),
    ];

    /// Fold username-ordered join rows into one entry per user
    pub fn group_user_rows(rows: Vec<UserJobRow>) -> Vec<UserWithJobs> {
        let mut users: Vec<UserWithJobs> = Vec::new();

        for row in rows {
            match users.last_mut() {
                Some(current) if current.user.username == row.user.username => {
                    if let Some(job_id) = row.job_id {
                        current.jobs.push(job_id);
                    }
                }
                _ => users.push(UserWithJobs {
                    user: row.user,
                    jobs: row.job_id.into_iter().collect(),
                }),
            }
        }

        users
    }

    /// Changed fields in a stable order, password replaced by its hash
    pub fn update_fields(
        update: &UserUpdate,
        password_hash: Option<String>,
    ) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(hash) = password_hash {
            fields.push(("password", SqlValue::Text(Some(hash))));
        }
        if let Some(first_name) = &update.first_name {
            fields.push(("firstName", SqlValue::Text(Some(first_name.clone()))));
        }
        if let Some(last_name) = &update.last_name {
            fields.push(("lastName", SqlValue::Text(Some(last_name.clone()))));
        }
        if let Some(email) = &update.email {
            fields.push(("email", SqlValue::Text(Some(email.clone()))));
        }
        if let Some(is_admin) = update.is_admin {
            fields.push(("isAdmin", SqlValue::Bool(is_admin)));
        }
        fields
    }

    fn invalid_credentials() -> AppError {
        AppError::Unauthorized("Invalid username/password".to_string())
    }

    fn duplicate_username(username: &str) -> AppError {
        AppError::BadRequest(format!("Duplicate username: {}", username))
    }

    fn no_user(username: &str) -> AppError {
        AppError::NotFound(format!("No user: {}", username))
    }
}

/// Unified user operations using the adapter pattern
pub struct UnifiedUserOps<T: UserStore> {
    store: T,
    passwords: Arc<PasswordManager>,
}

impl<T: UserStore> UnifiedUserOps<T> {
    pub fn new(store: T, passwords: Arc<PasswordManager>) -> Self {
        Self { store, passwords }
    }

    /// Check a username/password pair and return the user without password
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let Some(row) = self
            .store
            .fetch_credentials(username)
            .await
            .map_err(|e| map_database_error(e, "fetch user credentials"))?
        else {
            self.passwords.verify_dummy(password)?;
            return Err(UserProcessor::invalid_credentials());
        };

        if self.passwords.verify_password(password, &row.password)? {
            Ok(row.user)
        } else {
            Err(UserProcessor::invalid_credentials())
        }
    }

    /// Register a new user
    pub async fn register(&self, new_user: &NewUser) -> AppResult<User> {
        let exists = self
            .store
            .username_exists(&new_user.username)
            .await
            .map_err(|e| map_database_error(e, "check duplicate username"))?;
        if exists {
            return Err(UserProcessor::duplicate_username(&new_user.username));
        }

        let prepared = PreparedUser {
            username: new_user.username.clone(),
            password_hash: self.passwords.hash_password(&new_user.password)?,
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            email: new_user.email.clone(),
            is_admin: new_user.is_admin,
        };

        match self.store.insert_user(&prepared).await {
            Ok(user) => {
                info!("Registered user {}", user.username);
                Ok(user)
            }
            Err(e) if constraint_violation(&e) == Some(ConstraintViolation::Unique) => {
                warn!("Concurrent registration of {} rejected", new_user.username);
                Err(UserProcessor::duplicate_username(&new_user.username))
            }
            Err(e) => Err(map_database_error(e, "insert user")),
        }
    }

    /// Every user with the ids of the jobs they applied to
    pub async fn find_all(&self) -> AppResult<Vec<UserWithJobs>> {
        let rows = self
            .store
            .fetch_users_with_jobs(None)
            .await
            .map_err(|e| map_database_error(e, "list users"))?;
        debug!("Fetched {} user/application rows", rows.len());
        Ok(UserProcessor::group_user_rows(rows))
    }

    pub async fn get(&self, username: &str) -> AppResult<UserWithJobs> {
        let rows = self
            .store
            .fetch_users_with_jobs(Some(username))
            .await
            .map_err(|e| map_database_error(e, "fetch user"))?;

        UserProcessor::group_user_rows(rows)
            .into_iter()
            .next()
            .ok_or_else(|| UserProcessor::no_user(username))
    }

    /// Partially update a user, re-hashing the password when present
    pub async fn update(&self, username: &str, update: &UserUpdate) -> AppResult<User> {
        let password_hash = match &update.password {
            Some(password) => Some(self.passwords.hash_password(password)?),
            None => None,
        };

        let clause = sql_for_partial_update(
            UserProcessor::update_fields(update, password_hash),
            UserProcessor::RENAMES,
            self.store.dialect(),
        )?;

        let user = self
            .store
            .update_user(username, &clause)
            .await
            .map_err(|e| map_database_error(e, "update user"))?
            .ok_or_else(|| UserProcessor::no_user(username))?;

        info!("Updated user {}", username);
        Ok(user)
    }

    pub async fn remove(&self, username: &str) -> AppResult<()> {
        let deleted = self
            .store
            .delete_user(username)
            .await
            .map_err(|e| map_database_error(e, "delete user"))?;

        if deleted == 0 {
            return Err(UserProcessor::no_user(username));
        }

        info!("Removed user {}", username);
        Ok(())
    }

    /// Record that a user applied to a job
    pub async fn apply(&self, username: &str, job_id: i32) -> AppResult<()> {
        let check = self
            .store
            .check_application(username, job_id)
            .await
            .map_err(|e| map_database_error(e, "check application"))?;

        ApplicationProcessor::evaluate(check, username, job_id)?;

        self.store
            .insert_application(username, job_id)
            .await
            .map_err(|e| ApplicationProcessor::map_insert_error(e, username, job_id))?;

        info!("User {} applied to job {}", username, job_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::database::sqlite::schema::init_schema;
    use crate::backend::database::SqliteUserStore;
    use crate::password::PasswordAlgorithm;
    use sqlx::sqlite::SqlitePoolOptions;

    fn user(username: &str) -> User {
        User {
            username: username.to_string(),
            first_name: format!("{}F", username),
            last_name: format!("{}L", username),
            email: format!("{}@email.com", username),
            is_admin: false,
        }
    }

    fn row(username: &str, job_id: Option<i32>) -> UserJobRow {
        UserJobRow {
            user: user(username),
            job_id,
        }
    }

    #[test]
    fn test_group_user_rows() {
        let grouped = UserProcessor::group_user_rows(vec![
            row("u1", Some(1)),
            row("u1", Some(3)),
            row("u2", None),
            row("u3", Some(2)),
        ]);

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0].user.username, "u1");
        assert_eq!(grouped[0].jobs, vec![1, 3]);
        assert_eq!(grouped[1].user.username, "u2");
        assert!(grouped[1].jobs.is_empty());
        assert_eq!(grouped[2].jobs, vec![2]);
    }

    #[test]
    fn test_group_user_rows_empty() {
        assert!(UserProcessor::group_user_rows(vec![]).is_empty());
    }

    #[test]
    fn test_update_fields_order_and_hash() {
        let update = UserUpdate {
            password: Some("new-password".to_string()),
            first_name: Some("New".to_string()),
            is_admin: Some(true),
            ..Default::default()
        };

        let fields = UserProcessor::update_fields(&update, Some("$2b$hash".to_string()));
        let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["password", "firstName", "isAdmin"]);
        assert_eq!(fields[0].1, SqlValue::Text(Some("$2b$hash".to_string())));
        assert_eq!(fields[2].1, SqlValue::Bool(true));
    }

    #[test]
    fn test_update_fields_empty() {
        assert!(UserProcessor::update_fields(&UserUpdate::default(), None).is_empty());
    }

    /// Store whose existence check always misses, as when a concurrent
    /// registration commits between the check and the insert
    struct StaleCheckStore(SqliteUserStore);

    #[async_trait]
    impl UserStore for StaleCheckStore {
        fn dialect(&self) -> &'static dyn SqlDialect {
            self.0.dialect()
        }

        async fn fetch_credentials(
            &self,
            username: &str,
        ) -> Result<Option<UserCredentialRow>, sqlx::Error> {
            self.0.fetch_credentials(username).await
        }

        async fn username_exists(&self, _username: &str) -> Result<bool, sqlx::Error> {
            Ok(false)
        }

        async fn insert_user(&self, user: &PreparedUser) -> Result<User, sqlx::Error> {
            self.0.insert_user(user).await
        }

        async fn fetch_users_with_jobs(
            &self,
            username: Option<&str>,
        ) -> Result<Vec<UserJobRow>, sqlx::Error> {
            self.0.fetch_users_with_jobs(username).await
        }

        async fn update_user(
            &self,
            username: &str,
            clause: &UpdateClause,
        ) -> Result<Option<User>, sqlx::Error> {
            self.0.update_user(username, clause).await
        }

        async fn delete_user(&self, username: &str) -> Result<u64, sqlx::Error> {
            self.0.delete_user(username).await
        }

        async fn check_application(
            &self,
            username: &str,
            job_id: i32,
        ) -> Result<ApplicationCheck, sqlx::Error> {
            self.0.check_application(username, job_id).await
        }

        async fn insert_application(&self, username: &str, job_id: i32) -> Result<(), sqlx::Error> {
            self.0.insert_application(username, job_id).await
        }
    }

    async fn sqlite_store() -> SqliteUserStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        SqliteUserStore::new(pool)
    }

    fn passwords() -> Arc<PasswordManager> {
        Arc::new(PasswordManager::new(PasswordAlgorithm::Bcrypt, 4).unwrap())
    }

    fn new_user(username: &str, first_name: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "password1".to_string(),
            first_name: first_name.to_string(),
            last_name: "L".to_string(),
            email: format!("{}@example.com", username),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_register_unique_violation_is_duplicate() {
        let ops = UnifiedUserOps::new(StaleCheckStore(sqlite_store().await), passwords());
        ops.register(&new_user("u1", "First")).await.unwrap();

        let err = ops.register(&new_user("u1", "Second")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Duplicate username: u1"));

        // the first registration is untouched
        let stored = ops.get("u1").await.unwrap();
        assert_eq!(stored.user.first_name, "First");
        assert_eq!(ops.find_all().await.unwrap().len(), 1);
        assert!(ops.authenticate("u1", "password1").await.is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user_still_verifies() {
        let passwords = passwords();
        let ops = UnifiedUserOps::new(sqlite_store().await, passwords.clone());
        ops.register(&new_user("u1", "First")).await.unwrap();

        let unknown = ops.authenticate("nope", "password1").await.unwrap_err();
        assert!(passwords.has_dummy_hash());

        let wrong = ops.authenticate("u1", "wrong").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, AppError::Unauthorized(_)));
    }
}
