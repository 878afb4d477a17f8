//! Statement text exchanged between builders, entities and the transport.

use std::fmt;

/// A SQL statement plus the schema unqualified names resolve against.
///
/// `schema == None` lets the server pick its default (`mindsdb`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    sql: String,
    schema: Option<String>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            schema: None,
        }
    }

    /// Same statement resolved against `schema`
    pub fn with_schema(self, schema: impl Into<String>) -> Self {
        Self {
            sql: self.sql,
            schema: Some(schema.into()),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// SQL without the trailing `;`, for embedding in another statement
    pub fn as_subquery(&self) -> &str {
        self.sql.trim_end().trim_end_matches(';').trim_end()
    }

    /// First 80 characters on one line, for log output
    pub(crate) fn preview(&self) -> String {
        let flat = self.sql.replace('\n', " ");
        if flat.chars().count() > 80 {
            let cut: String = flat.chars().take(80).collect();
            format!("{}...", cut)
        } else {
            flat
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Self::new(sql)
    }
}
