//! Immutable `SELECT` builder and the write statements derived from it.

use serde_json::{Map, Value as JsonValue};

use super::filter::{render_where, Filter};
use super::literal::render_literal;
use super::target::Target;
use crate::error::{MindsLinkError, Result};
use crate::statement::Statement;

/// Fluent, immutable query state for one target.
///
/// Every mutator borrows the receiver and returns a new builder with its own
/// copy of the filter list, so a builder never changes once created and two
/// builders never share filter storage.
///
/// # Examples
///
/// ```rust
/// use mindsdb_link::query::{SelectBuilder, TableRef};
///
/// let base = SelectBuilder::new(TableRef::new("db", "t"));
/// let narrowed = base.filter(&["status=active"]).unwrap().limit(5);
///
/// assert_eq!(base.render(), "SELECT * FROM db.t;");
/// assert_eq!(narrowed.render(), "SELECT * FROM db.t WHERE status = 'active' LIMIT 5;");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SelectBuilder<T: Target> {
    target: T,
    filters: Vec<Filter>,
    limit: Option<u64>,
    track_column: Option<String>,
}

impl<T: Target> SelectBuilder<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            filters: Vec::new(),
            limit: None,
            track_column: None,
        }
    }

    /// New state from this one plus a delta
    fn derive(
        &self,
        filters: Vec<Filter>,
        limit: Option<u64>,
        track_column: Option<String>,
    ) -> Self {
        Self {
            target: self.target.clone(),
            filters,
            limit,
            track_column,
        }
    }

    /// Append `key=value` predicates in call order.
    ///
    /// All pairs are validated before anything is built; duplicate keys are
    /// kept and rendered as separate clauses.
    pub fn filter(&self, pairs: &[&str]) -> Result<Self> {
        let parsed = Filter::parse_all(pairs)?;
        let mut filters = self.filters.clone();
        filters.extend(parsed);
        Ok(self.derive(filters, self.limit, self.track_column.clone()))
    }

    /// Append already-built predicates
    pub fn with_filters(&self, extra: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters = self.filters.clone();
        filters.extend(extra);
        self.derive(filters, self.limit, self.track_column.clone())
    }

    pub fn limit(&self, n: u64) -> Self {
        self.derive(self.filters.clone(), Some(n), self.track_column.clone())
    }

    /// Only return rows whose `column` is past the server's last-seen mark
    pub fn track(&self, column: impl Into<String>) -> Self {
        self.derive(self.filters.clone(), self.limit, Some(column.into()))
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn row_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn track_column(&self) -> Option<&str> {
        self.track_column.as_deref()
    }

    /// Statement text; a pure function of the builder state
    pub fn render(&self) -> String {
        let mut sql = format!("SELECT * FROM {}", self.target.identifier());
        sql.push_str(&render_where(&self.filters, self.track_column.as_deref()));
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql.push(';');
        sql
    }

    pub fn to_statement(&self) -> Statement {
        self.statement(self.render())
    }

    fn statement(&self, sql: String) -> Statement {
        match self.target.schema() {
            Some(schema) => Statement::new(sql).with_schema(schema),
            None => Statement::new(sql),
        }
    }

    /// This builder's filters followed by `extra`
    fn combined_filters(&self, extra: &[&str]) -> Result<Vec<Filter>> {
        let parsed = Filter::parse_all(extra)?;
        let mut filters = self.filters.clone();
        filters.extend(parsed);
        Ok(filters)
    }

    /// `INSERT INTO <target> ...`
    pub fn insert_statement(&self, source: &InsertSource) -> Result<Statement> {
        let sql = render_insert(&self.target.identifier(), source)?;
        Ok(self.statement(sql))
    }

    /// `UPDATE <target> SET ... WHERE ...`.
    ///
    /// Needs at least one value and at least one predicate (from the builder
    /// or `extra_filters`); an unfiltered update is rejected.
    pub fn update_statement(
        &self,
        values: &Map<String, JsonValue>,
        extra_filters: &[&str],
    ) -> Result<Statement> {
        if values.is_empty() {
            return Err(MindsLinkError::validation("Update requires at least one value"));
        }
        let filters = self.combined_filters(extra_filters)?;
        if filters.is_empty() {
            return Err(MindsLinkError::validation(
                "Update requires at least one filter; refusing to update every row",
            ));
        }

        let assignments: Vec<String> = values
            .iter()
            .map(|(column, value)| format!("{} = {}", column, render_literal(value)))
            .collect();
        let sql = format!(
            "UPDATE {} SET {}{};",
            self.target.identifier(),
            assignments.join(", "),
            render_where(&filters, None)
        );
        Ok(self.statement(sql))
    }

    /// `UPDATE <target> ON <keys> FROM (<source>)`: update matching rows from
    /// the result of another statement
    pub fn update_from_statement(&self, on: &[&str], source: &Statement) -> Result<Statement> {
        if on.is_empty() {
            return Err(MindsLinkError::validation(
                "Update from a query requires at least one key column",
            ));
        }
        let sql = format!(
            "UPDATE {} ON {} FROM ({});",
            self.target.identifier(),
            on.join(", "),
            source.as_subquery()
        );
        Ok(self.statement(sql))
    }

    /// `DELETE FROM <target> [WHERE ...]`; without filters every row goes
    pub fn delete_statement(&self, extra_filters: &[&str]) -> Result<Statement> {
        let filters = self.combined_filters(extra_filters)?;
        let sql = format!(
            "DELETE FROM {}{};",
            self.target.identifier(),
            render_where(&filters, None)
        );
        Ok(self.statement(sql))
    }
}

/// Data for an insert
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// Rows produced by another statement
    Query(Statement),

    /// Bulk rows in column order
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<JsonValue>>,
    },

    /// A single row keyed by column
    Row(Map<String, JsonValue>),
}

impl From<Statement> for InsertSource {
    fn from(statement: Statement) -> Self {
        Self::Query(statement)
    }
}

impl From<Map<String, JsonValue>> for InsertSource {
    fn from(row: Map<String, JsonValue>) -> Self {
        Self::Row(row)
    }
}

/// Render `INSERT INTO <identifier> ...` for any source
pub(crate) fn render_insert(identifier: &str, source: &InsertSource) -> Result<String> {
    match source {
        InsertSource::Query(statement) => Ok(format!(
            "INSERT INTO {} ({});",
            identifier,
            statement.as_subquery()
        )),
        InsertSource::Row(row) => {
            if row.is_empty() {
                return Err(MindsLinkError::validation("Insert requires at least one column"));
            }
            let columns: Vec<&str> = row.keys().map(String::as_str).collect();
            let values: Vec<String> = row.values().map(render_literal).collect();
            Ok(format!(
                "INSERT INTO {} ({}) VALUES ({});",
                identifier,
                columns.join(", "),
                values.join(", ")
            ))
        },
        InsertSource::Rows { columns, rows } => {
            if columns.is_empty() {
                return Err(MindsLinkError::validation("Insert requires at least one column"));
            }
            if rows.is_empty() {
                return Err(MindsLinkError::validation("Insert requires at least one row"));
            }
            let mut tuples = Vec::with_capacity(rows.len());
            for (idx, row) in rows.iter().enumerate() {
                if row.len() != columns.len() {
                    return Err(MindsLinkError::validation(format!(
                        "Row {} has {} values, expected {}",
                        idx,
                        row.len(),
                        columns.len()
                    )));
                }
                let values: Vec<String> = row.iter().map(render_literal).collect();
                tuples.push(format!("({})", values.join(", ")));
            }
            Ok(format!(
                "INSERT INTO {} ({}) VALUES {};",
                identifier,
                columns.join(", "),
                tuples.join(", ")
            ))
        },
    }
}
