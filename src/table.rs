//! Queryable table handle bound to a transport.

use serde_json::{Map, Value as JsonValue};

use crate::error::Result;
use crate::models::TabularResult;
use crate::query::{InsertSource, SelectBuilder, TableRef};
use crate::statement::Statement;
use crate::transport::Transport;

/// A table (or view) of a database or project.
///
/// Reading methods follow [`SelectBuilder`]: `filter`, `limit` and `track`
/// return new handles and never modify `self`. `insert`, `update` and
/// `delete` run immediately and re-execute on every call.
#[derive(Debug, Clone)]
pub struct Table {
    transport: Transport,
    builder: SelectBuilder<TableRef>,
}

impl Table {
    pub(crate) fn new(transport: Transport, scope: &str, name: &str) -> Self {
        Self {
            transport,
            builder: SelectBuilder::new(TableRef::new(scope, name)),
        }
    }

    fn with_builder(&self, builder: SelectBuilder<TableRef>) -> Self {
        Self {
            transport: self.transport.clone(),
            builder,
        }
    }

    pub fn name(&self) -> &str {
        self.builder.target().name()
    }

    /// Owning database or project
    pub fn scope(&self) -> &str {
        self.builder.target().scope()
    }

    pub fn builder(&self) -> &SelectBuilder<TableRef> {
        &self.builder
    }

    pub fn filter(&self, pairs: &[&str]) -> Result<Self> {
        Ok(self.with_builder(self.builder.filter(pairs)?))
    }

    pub fn limit(&self, n: u64) -> Self {
        self.with_builder(self.builder.limit(n))
    }

    pub fn track(&self, column: impl Into<String>) -> Self {
        self.with_builder(self.builder.track(column))
    }

    pub fn render(&self) -> String {
        self.builder.render()
    }

    pub fn to_statement(&self) -> Statement {
        self.builder.to_statement()
    }

    /// Run the current `SELECT`
    pub fn fetch(&self) -> Result<TabularResult> {
        self.transport.fetch(&self.to_statement())
    }

    pub fn insert(&self, source: impl Into<InsertSource>) -> Result<()> {
        let statement = self.builder.insert_statement(&source.into())?;
        self.transport.execute(&statement)?;
        Ok(())
    }

    /// Update rows matching this handle's filters plus `filters`; at least
    /// one filter must apply
    pub fn update(&self, values: &Map<String, JsonValue>, filters: &[&str]) -> Result<()> {
        let statement = self.builder.update_statement(values, filters)?;
        self.transport.execute(&statement)?;
        Ok(())
    }

    /// Update rows from another statement's result, matched on `on`
    pub fn update_from(&self, on: &[&str], source: &Statement) -> Result<()> {
        let statement = self.builder.update_from_statement(on, source)?;
        self.transport.execute(&statement)?;
        Ok(())
    }

    /// Delete rows matching this handle's filters plus `filters`; with no
    /// filters at all every row is deleted
    pub fn delete(&self, filters: &[&str]) -> Result<()> {
        let statement = self.builder.delete_statement(filters)?;
        self.transport.execute(&statement)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let transport = Transport::builder().build().unwrap();
        Table::new(transport, "db", "t")
    }

    #[test]
    fn test_table_render() {
        let t = table().filter(&["status=active"]).unwrap().limit(5);
        assert_eq!(t.render(), "SELECT * FROM db.t WHERE status = 'active' LIMIT 5;");
        assert_eq!(t.name(), "t");
        assert_eq!(t.scope(), "db");
    }

    #[test]
    fn test_table_handles_are_independent() {
        let base = table();
        let filtered = base.filter(&["a=1"]).unwrap();
        assert_eq!(base.render(), "SELECT * FROM db.t;");
        assert_eq!(filtered.render(), "SELECT * FROM db.t WHERE a = '1';");
    }

    #[test]
    fn test_update_validation_happens_before_network() {
        // The transport points at a local default that is not running;
        // validation must fail first.
        let err = table().update(&Map::new(), &["x=1"]).unwrap_err();
        assert!(err.is_validation());
        let err = table().delete(&["bad"]).unwrap_err();
        assert!(err.is_validation());
    }
}
