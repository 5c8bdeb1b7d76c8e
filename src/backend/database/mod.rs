//! Database abstraction layer
//!
//! This module provides a unified interface for database operations across
//! different database backends (PostgreSQL, SQLite) while keeping the
//! database-specific SQL in per-backend stores.
//!
//! # Architecture
//!
//! ```text
//! Common logic (user_ops.rs, job_ops.rs, company_ops.rs)
//!     ├── update_clause.rs (partial UPDATE ... SET)
//!     ├── filter.rs        (search WHERE predicates)
//!     └── application.rs   (user/job application checks)
//!     ↓
//! Database-specific stores
//!     ├── postgres/ (PostgreSQL-specific code)
//!     └── sqlite/   (SQLite-specific code)
//! ```

pub mod application;
pub mod company_ops;
pub mod config;
pub mod dialect;
pub mod filter;
pub mod job_ops;
pub mod postgres;
pub mod sqlite;
pub mod update_clause;
pub mod user_ops;

// Re-export key types for convenience
pub use config::DatabaseBackendConfig;
pub use dialect::{PostgresDialect, SqlDialect, SqliteDialect};
pub use update_clause::{sql_for_partial_update, SqlValue, UpdateClause};

pub use company_ops::UnifiedCompanyOps;
pub use job_ops::UnifiedJobOps;
pub use user_ops::UnifiedUserOps;

pub use postgres::{PostgresCompanyStore, PostgresJobStore, PostgresUserStore};
pub use sqlite::{SqliteCompanyStore, SqliteJobStore, SqliteUserStore};
