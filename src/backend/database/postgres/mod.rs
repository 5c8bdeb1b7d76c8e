//! PostgreSQL backend

use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::Postgres;

use super::update_clause::SqlValue;

pub mod backend_impl;
pub mod company_impl;
pub mod job_impl;
pub mod schema;
pub mod user_impl;

pub use backend_impl::PostgresBackend;
pub use company_impl::PostgresCompanyStore;
pub use job_impl::PostgresJobStore;
pub use user_impl::PostgresUserStore;

/// Bind dynamically built values in placeholder order
pub(crate) fn bind_values<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    values: &[SqlValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for value in values {
        query = match value {
            SqlValue::Text(v) | SqlValue::Decimal(v) => query.bind(v.clone()),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Bool(v) => query.bind(*v),
        };
    }
    query
}
