/// SQL syntax differences between the supported databases
///
/// Everything that is rendered as text into a statement and differs between
/// PostgreSQL and SQLite goes through this trait. Values are always bound as
/// parameters; only placeholders and column expressions are produced here.
pub trait SqlDialect: Send + Sync {
    /// Get the parameter placeholder for the given 1-based index
    ///
    /// For example:
    /// - PostgreSQL: $1, $2, $3...
    /// - SQLite: ?1, ?2, ?3...
    fn param_placeholder(&self, index: usize) -> String;

    /// Placeholder for a decimal value bound as text
    fn decimal_placeholder(&self, index: usize) -> String {
        self.param_placeholder(index)
    }

    /// Expression that compares a decimal column numerically
    fn numeric_column(&self, column: &str) -> String {
        column.to_string()
    }

    /// Expression that reads a decimal column back as canonical text
    fn decimal_select(&self, column: &str) -> String {
        column.to_string()
    }

    /// Case-insensitive substring match of a column against a bound pattern
    ///
    /// The bound value must come from [`SqlDialect::contains_pattern`].
    fn contains_predicate(&self, column: &str, placeholder: &str) -> String {
        format!("LOWER({}) LIKE LOWER({}) ESCAPE '\\'", column, placeholder)
    }

    /// Pattern matching `needle` anywhere, metacharacters taken literally
    fn contains_pattern(&self, needle: &str) -> String {
        like_pattern(needle)
    }
}

/// `%value%` with LIKE metacharacters escaped by backslash
pub fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// PostgreSQL placeholders and NUMERIC handling
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn param_placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn decimal_placeholder(&self, index: usize) -> String {
        format!("${}::numeric", index)
    }

    fn decimal_select(&self, column: &str) -> String {
        format!("{}::text", column)
    }
}

/// SQLite stores decimals as TEXT and compares them as REAL
///
/// SQLite's LOWER and LIKE only fold ASCII, so substring search goes through
/// the REGEXP function registered on every connection instead.
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn param_placeholder(&self, index: usize) -> String {
        format!("?{}", index)
    }

    fn numeric_column(&self, column: &str) -> String {
        format!("CAST({} AS REAL)", column)
    }

    fn contains_predicate(&self, column: &str, placeholder: &str) -> String {
        format!("{} REGEXP {}", column, placeholder)
    }

    fn contains_pattern(&self, needle: &str) -> String {
        format!("(?i){}", regex::escape(needle))
    }
}
