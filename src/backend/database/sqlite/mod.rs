//! SQLite backend

use sqlx::query::QueryAs;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use super::update_clause::SqlValue;

pub mod backend_impl;
pub mod company_impl;
pub mod job_impl;
pub mod schema;
pub mod user_impl;

pub use backend_impl::SqliteBackend;
pub use company_impl::SqliteCompanyStore;
pub use job_impl::SqliteJobStore;
pub use user_impl::SqliteUserStore;

/// Bind dynamically built values in placeholder order
pub(crate) fn bind_values<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    values: &[SqlValue],
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            SqlValue::Text(v) | SqlValue::Decimal(v) => query.bind(v.clone()),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Bool(v) => query.bind(*v),
        };
    }
    query
}
