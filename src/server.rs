//! Top-level server handle: projects, databases, ML engines and handlers.

use log::debug;
use serde_json::{Map, Value as JsonValue};

use crate::database::Database;
use crate::ddl;
use crate::error::{MindsLinkError, Result};
use crate::materialize::Materialize;
use crate::models::{
    DatabaseInfo, HandlerInfo, HandlerKind, MlEngineInfo, StatusResponse, TabularResult,
    DEFAULT_SCHEMA,
};
use crate::project::Project;
use crate::query::{SelectBuilder, TableRef};
use crate::statement::Statement;
use crate::transport::{Transport, TransportBuilder};

/// Entry point of the SDK.
///
/// # Examples
///
/// ```rust,no_run
/// use mindsdb_link::{Server, Transport};
///
/// let server = Server::connect(Transport::builder().base_url("http://127.0.0.1:47334"))?;
/// let rows = server.project("mindsdb").query("SELECT * FROM models;")?;
/// println!("{} models", rows.row_count());
/// # Ok::<(), mindsdb_link::MindsLinkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Server {
    transport: Transport,
}

impl Server {
    /// Wrap an already authenticated transport
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Build the transport and log in
    pub fn connect(builder: TransportBuilder) -> Result<Self> {
        Ok(Self::new(builder.connect()?))
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn status(&self) -> Result<StatusResponse> {
        self.transport.status()
    }

    /// Run SQL against the default `mindsdb` schema
    pub fn query(&self, sql: impl Into<String>) -> Result<TabularResult> {
        self.transport.fetch(&Statement::new(sql))
    }

    /// Drop this server's session handle; see [`Transport::close`]
    pub fn close(self) {
        self.transport.close();
    }

    // ── Projects ─────────────────────────────────────────────────────────────

    fn catalog_names(&self, kind: &str) -> Result<Vec<String>> {
        let builder = SelectBuilder::new(TableRef::new("information_schema", "databases"))
            .filter(&[&format!("type={}", kind)])?;
        let result = self.transport.fetch(&builder.to_statement())?;
        Ok(result
            .rows()
            .filter_map(|row| row.get("name").and_then(|v| v.as_str()).map(str::to_string))
            .collect())
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self
            .catalog_names("project")?
            .iter()
            .map(|name| Project::new(self.transport.clone(), name))
            .collect())
    }

    pub fn get_project(&self, name: &str) -> Result<Project> {
        self.list_projects()?
            .into_iter()
            .find(|project| project.name() == name)
            .ok_or_else(|| MindsLinkError::not_found("Project doesn't exist"))
    }

    /// Handle to `name` without checking that it exists
    pub fn project(&self, name: &str) -> Project {
        Project::new(self.transport.clone(), name)
    }

    /// The built-in `mindsdb` project
    pub fn default_project(&self) -> Project {
        self.project(DEFAULT_SCHEMA)
    }

    pub fn create_project(&self, name: &str) -> Result<Project> {
        self.transport.execute(&ddl::create_project(name)?)?;
        debug!("[MINDS_QUERY] Created project {}", name);
        Ok(self.project(name))
    }

    pub fn drop_project(&self, name: &str) -> Result<()> {
        self.transport.execute(&ddl::drop_project(name)?)?;
        Ok(())
    }

    // ── Databases ────────────────────────────────────────────────────────────

    pub fn list_databases(&self) -> Result<Vec<Database>> {
        let builder = SelectBuilder::new(TableRef::new("information_schema", "databases"))
            .filter(&["type=data"])?;
        let result = self.transport.fetch(&builder.to_statement())?;
        result
            .rows()
            .map(|row| {
                let info = DatabaseInfo::from_row(&row)?;
                Ok(Database::new(self.transport.clone(), info))
            })
            .collect()
    }

    pub fn get_database(&self, name: &str) -> Result<Database> {
        self.list_databases()?
            .into_iter()
            .find(|db| db.name() == name)
            .ok_or_else(|| MindsLinkError::not_found("Database doesn't exist"))
    }

    /// Connect a data source
    pub fn create_database(
        &self,
        name: &str,
        engine: &str,
        connection_args: &Map<String, JsonValue>,
    ) -> Result<Database> {
        self.transport
            .execute(&ddl::create_database(name, engine, connection_args)?)?;
        Ok(Database::new(
            self.transport.clone(),
            DatabaseInfo {
                name: name.to_string(),
                engine: Some(engine.to_string()),
                database_type: Some("data".to_string()),
                connection_data: connection_args.clone(),
                extra: Map::new(),
            },
        ))
    }

    pub fn drop_database(&self, name: &str) -> Result<()> {
        self.transport.execute(&ddl::drop_database(name)?)?;
        Ok(())
    }

    // ── ML engines ───────────────────────────────────────────────────────────

    pub fn list_ml_engines(&self) -> Result<Vec<MlEngineInfo>> {
        let result = self
            .transport
            .fetch_lowercase(&Statement::new("SHOW ML_ENGINES;"))?;
        result.rows().map(|row| MlEngineInfo::from_row(&row)).collect()
    }

    pub fn get_ml_engine(&self, name: &str) -> Result<MlEngineInfo> {
        self.list_ml_engines()?
            .into_iter()
            .find(|engine| engine.name == name)
            .ok_or_else(|| MindsLinkError::not_found("ML engine doesn't exist"))
    }

    pub fn create_ml_engine(
        &self,
        name: &str,
        handler: &str,
        connection_data: &Map<String, JsonValue>,
    ) -> Result<MlEngineInfo> {
        self.transport
            .execute(&ddl::create_ml_engine(name, handler, connection_data)?)?;
        Ok(MlEngineInfo {
            name: name.to_string(),
            handler: Some(handler.to_string()),
            connection_data: connection_data.clone(),
            extra: Map::new(),
        })
    }

    pub fn drop_ml_engine(&self, name: &str) -> Result<()> {
        self.transport.execute(&ddl::drop_ml_engine(name)?)?;
        Ok(())
    }

    // ── Handlers ─────────────────────────────────────────────────────────────

    pub fn list_handlers(&self, kind: HandlerKind) -> Result<Vec<HandlerInfo>> {
        let statement = Statement::new(format!("SHOW HANDLERS WHERE type = '{}';", kind.as_str()));
        let result = self.transport.fetch_lowercase(&statement)?;
        result.rows().map(|row| HandlerInfo::from_row(&row)).collect()
    }

    pub fn ml_handlers(&self) -> Result<Vec<HandlerInfo>> {
        self.list_handlers(HandlerKind::Ml)
    }

    pub fn data_handlers(&self) -> Result<Vec<HandlerInfo>> {
        self.list_handlers(HandlerKind::Data)
    }

    pub fn get_handler(&self, kind: HandlerKind, name: &str) -> Result<HandlerInfo> {
        self.list_handlers(kind)?
            .into_iter()
            .find(|handler| handler.name == name)
            .ok_or_else(|| MindsLinkError::not_found("Handler doesn't exist"))
    }
}
