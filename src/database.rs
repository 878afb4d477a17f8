//! Data source handle.

use crate::ddl;
use crate::error::{MindsLinkError, Result};
use crate::models::{DatabaseInfo, TableInfo, TabularResult};
use crate::statement::Statement;
use crate::table::Table;
use crate::transport::Transport;

/// A connected data source (integration) of the server
#[derive(Debug, Clone)]
pub struct Database {
    transport: Transport,
    info: DatabaseInfo,
}

impl Database {
    pub(crate) fn new(transport: Transport, info: DatabaseInfo) -> Self {
        Self { transport, info }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn engine(&self) -> Option<&str> {
        self.info.engine.as_deref()
    }

    pub fn info(&self) -> &DatabaseInfo {
        &self.info
    }

    /// Run SQL with this database as the default schema.
    ///
    /// Queries are forwarded to the data source in its own dialect.
    pub fn query(&self, sql: impl Into<String>) -> Result<TabularResult> {
        self.transport
            .fetch(&Statement::new(sql).with_schema(&self.info.name))
    }

    pub fn list_tables(&self) -> Result<Vec<Table>> {
        let statement = Statement::new("SHOW TABLES;").with_schema(&self.info.name);
        let result = self.transport.fetch(&statement)?;
        result
            .rows()
            .map(|row| {
                let info = TableInfo::from_listing_row(&row)?;
                Ok(Table::new(self.transport.clone(), &self.info.name, &info.name))
            })
            .collect()
    }

    pub fn get_table(&self, name: &str) -> Result<Table> {
        self.list_tables()?
            .into_iter()
            .find(|table| table.name() == name)
            .ok_or_else(|| MindsLinkError::not_found("Table doesn't exist"))
    }

    /// Handle to `name` without checking that it exists
    pub fn table(&self, name: &str) -> Table {
        Table::new(self.transport.clone(), &self.info.name, name)
    }

    /// Create (or replace) a table from the result of `source`
    pub fn create_table(&self, name: &str, source: &Statement, replace: bool) -> Result<Table> {
        let statement = ddl::create_table(&self.info.name, name, source, replace)?;
        self.transport
            .execute(&statement.with_schema(&self.info.name))?;
        Ok(self.table(name))
    }

    pub fn drop_table(&self, name: &str) -> Result<()> {
        let statement = ddl::drop_table(&self.info.name, name)?;
        self.transport
            .execute(&statement.with_schema(&self.info.name))?;
        Ok(())
    }
}
