//! Partial update SQL generation
//!
//! Turns a sparse set of changed fields into the `SET` part of an `UPDATE`
//! statement plus the values to bind, in the same order.

use super::dialect::SqlDialect;
use crate::error::{AppError, AppResult};

/// A value to bind into a dynamically built statement
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    Int(Option<i32>),
    /// Canonical decimal text, cast to NUMERIC where the database has one
    Decimal(Option<String>),
    Bool(bool),
}

/// Rendered assignment list and its ordered parameters
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateClause {
    pub set_cols: String,
    pub values: Vec<SqlValue>,
}

impl UpdateClause {
    /// Index of the first parameter not used by the assignment list
    pub fn next_index(&self) -> usize {
        self.values.len() + 1
    }
}

/// Build `"col1"=<p1>, "col2"=<p2>` from logical field names and values
///
/// `renames` maps logical names to physical columns for fields whose names
/// differ. Fields are emitted in the order given.
pub fn sql_for_partial_update(
    fields: Vec<(&str, SqlValue)>,
    renames: &[(&str, &str)],
    dialect: &dyn SqlDialect,
) -> AppResult<UpdateClause> {
    if fields.is_empty() {
        return Err(AppError::BadRequest("No data".to_string()));
    }

    let mut assignments = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());

    for (index, (name, value)) in fields.into_iter().enumerate() {
        let column = renames
            .iter()
            .find(|(logical, _)| *logical == name)
            .map(|(_, physical)| *physical)
            .unwrap_or(name);

        if !is_valid_column(column) {
            return Err(AppError::Internal(format!(
                "Invalid column name in update: {}",
                column
            )));
        }

        let placeholder = match value {
            SqlValue::Decimal(_) => dialect.decimal_placeholder(index + 1),
            _ => dialect.param_placeholder(index + 1),
        };

        assignments.push(format!("\"{}\"={}", column, placeholder));
        values.push(value);
    }

    Ok(UpdateClause {
        set_cols: assignments.join(", "),
        values,
    })
}

fn is_valid_column(column: &str) -> bool {
    !column.is_empty()
        && !column.starts_with(|c: char| c.is_ascii_digit())
        && column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::database::dialect::{PostgresDialect, SqliteDialect};

    #[test]
    fn test_renamed_and_plain_fields() {
        let clause = sql_for_partial_update(
            vec![
                ("firstName", SqlValue::Text(Some("Aliya".to_string()))),
                ("email", SqlValue::Text(Some("a@b.com".to_string()))),
            ],
            &[("firstName", "first_name"), ("lastName", "last_name")],
            &PostgresDialect,
        )
        .unwrap();

        assert_eq!(clause.set_cols, "\"first_name\"=$1, \"email\"=$2");
        assert_eq!(
            clause.values,
            vec![
                SqlValue::Text(Some("Aliya".to_string())),
                SqlValue::Text(Some("a@b.com".to_string())),
            ]
        );
        assert_eq!(clause.next_index(), 3);
    }

    #[test]
    fn test_single_field() {
        let clause = sql_for_partial_update(
            vec![("isAdmin", SqlValue::Bool(true))],
            &[("isAdmin", "is_admin")],
            &SqliteDialect,
        )
        .unwrap();

        assert_eq!(clause.set_cols, "\"is_admin\"=?1");
        assert_eq!(clause.values.len(), 1);
        assert_eq!(clause.next_index(), 2);
    }

    #[test]
    fn test_decimal_cast_on_postgres() {
        let fields = vec![
            ("salary", SqlValue::Int(None)),
            ("equity", SqlValue::Decimal(Some("0.5".to_string()))),
        ];

        let pg = sql_for_partial_update(fields.clone(), &[], &PostgresDialect).unwrap();
        assert_eq!(pg.set_cols, "\"salary\"=$1, \"equity\"=$2::numeric");

        let sqlite = sql_for_partial_update(fields, &[], &SqliteDialect).unwrap();
        assert_eq!(sqlite.set_cols, "\"salary\"=?1, \"equity\"=?2");
    }

    #[test]
    fn test_indices_are_contiguous() {
        let fields: Vec<(&str, SqlValue)> = ["a", "b", "c", "d"]
            .iter()
            .map(|name| (*name, SqlValue::Int(Some(1))))
            .collect();

        let clause = sql_for_partial_update(fields, &[], &PostgresDialect).unwrap();
        assert_eq!(clause.set_cols, "\"a\"=$1, \"b\"=$2, \"c\"=$3, \"d\"=$4");
        assert_eq!(clause.values.len(), 4);
    }

    #[test]
    fn test_empty_fields_is_rejected() {
        match sql_for_partial_update(vec![], &[], &PostgresDialect) {
            Err(AppError::BadRequest(message)) => assert_eq!(message, "No data"),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_unsafe_column_is_rejected() {
        let result = sql_for_partial_update(
            vec![("name\" = 'x'; --", SqlValue::Text(None))],
            &[],
            &PostgresDialect,
        );
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
