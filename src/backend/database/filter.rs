use super::dialect::SqlDialect;
use super::update_clause::SqlValue;
use crate::error::{AppError, AppResult};
use crate::models::{CompanyFilter, JobFilter};

/// A `WHERE` predicate with its ordered parameters
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Conjunction of predicates, one per supplied filter
///
/// Each clause that takes a value gets the next positional parameter.
/// An empty builder renders the always-true predicate.
struct PredicateBuilder<'a> {
    dialect: &'a dyn SqlDialect,
    clauses: Vec<String>,
    values: Vec<SqlValue>,
}

impl<'a> PredicateBuilder<'a> {
    fn new(dialect: &'a dyn SqlDialect) -> Self {
        Self {
            dialect,
            clauses: Vec::new(),
            values: Vec::new(),
        }
    }

    fn push_param(&mut self, render: impl FnOnce(&str) -> String, value: SqlValue) {
        let placeholder = self.dialect.param_placeholder(self.values.len() + 1);
        self.clauses.push(render(&placeholder));
        self.values.push(value);
    }

    fn push_contains(&mut self, column: &str, needle: &str) {
        let dialect = self.dialect;
        self.push_param(
            |p| dialect.contains_predicate(column, p),
            SqlValue::Text(Some(dialect.contains_pattern(needle))),
        );
    }

    fn push(&mut self, clause: String) {
        self.clauses.push(clause);
    }

    fn build(self) -> WhereClause {
        let sql = if self.clauses.is_empty() {
            "TRUE".to_string()
        } else {
            self.clauses.join(" AND ")
        };

        WhereClause {
            sql,
            values: self.values,
        }
    }
}

/// Predicate for job search
pub fn job_filter_clause(filter: &JobFilter, dialect: &dyn SqlDialect) -> WhereClause {
    let mut builder = PredicateBuilder::new(dialect);

    if let Some(title) = &filter.title {
        builder.push_contains("title", title);
    }

    if let Some(min_salary) = filter.min_salary {
        builder.push_param(
            |p| format!("salary >= {}", p),
            SqlValue::Int(Some(min_salary)),
        );
    }

    if filter.has_equity == Some(true) {
        builder.push(format!("{} > 0", dialect.numeric_column("equity")));
    }

    if let Some(handle) = &filter.company_handle {
        builder.push_param(
            |p| format!("company_handle = {}", p),
            SqlValue::Text(Some(handle.clone())),
        );
    }

    builder.build()
}

/// Predicate for company search
pub fn company_filter_clause(
    filter: &CompanyFilter,
    dialect: &dyn SqlDialect,
) -> AppResult<WhereClause> {
    if let (Some(min), Some(max)) = (filter.min_employees, filter.max_employees) {
        if min > max {
            return Err(AppError::BadRequest(
                "minEmployees cannot be greater than maxEmployees".to_string(),
            ));
        }
    }

    let mut builder = PredicateBuilder::new(dialect);

    if let Some(name) = &filter.name_like {
        builder.push_contains("name", name);
    }

    if let Some(min) = filter.min_employees {
        builder.push_param(
            |p| format!("num_employees >= {}", p),
            SqlValue::Int(Some(min)),
        );
    }

    if let Some(max) = filter.max_employees {
        builder.push_param(
            |p| format!("num_employees <= {}", p),
            SqlValue::Int(Some(max)),
        );
    }

    Ok(builder.build())
}
