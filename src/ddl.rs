//! Rendering of catalog statements: projects, databases, tables, views,
//! models, knowledge bases and ML engines.
//!
//! Pure functions from typed arguments to [`Statement`]s; the façade types
//! in [`crate::server`], [`crate::project`] and [`crate::database`] execute
//! them.

use serde_json::{Map, Value as JsonValue};

use crate::error::{MindsLinkError, Result};
use crate::query::render_literal;
use crate::statement::Statement;

fn require_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(MindsLinkError::validation(format!("{} name is required", kind)));
    }
    Ok(())
}

/// ` USING k = v, ...`, or empty when there are no options
pub(crate) fn render_using(options: &Map<String, JsonValue>) -> String {
    if options.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = options
        .iter()
        .map(|(key, value)| format!("{} = {}", key, render_literal(value)))
        .collect();
    format!(" USING {}", pairs.join(", "))
}

pub fn create_project(name: &str) -> Result<Statement> {
    require_name("Project", name)?;
    Ok(Statement::new(format!("CREATE PROJECT {};", name)))
}

pub fn drop_project(name: &str) -> Result<Statement> {
    require_name("Project", name)?;
    Ok(Statement::new(format!("DROP PROJECT {};", name)))
}

/// `CREATE DATABASE name WITH ENGINE = 'engine'[, PARAMETERS = {...}]`
pub fn create_database(
    name: &str,
    engine: &str,
    connection_args: &Map<String, JsonValue>,
) -> Result<Statement> {
    require_name("Database", name)?;
    require_name("Engine", engine)?;
    let mut sql = format!("CREATE DATABASE {} WITH ENGINE = '{}'", name, engine);
    if !connection_args.is_empty() {
        let params = serde_json::to_string(connection_args)?;
        sql.push_str(&format!(", PARAMETERS = {}", params));
    }
    sql.push(';');
    Ok(Statement::new(sql))
}

pub fn drop_database(name: &str) -> Result<Statement> {
    require_name("Database", name)?;
    Ok(Statement::new(format!("DROP DATABASE {};", name)))
}

/// `CREATE [OR REPLACE] TABLE db.name (<query>)`
pub fn create_table(
    database: &str,
    name: &str,
    source: &Statement,
    replace: bool,
) -> Result<Statement> {
    require_name("Table", name)?;
    let verb = if replace { "CREATE OR REPLACE TABLE" } else { "CREATE TABLE" };
    Ok(Statement::new(format!(
        "{} {}.{} ({});",
        verb,
        database,
        name,
        source.as_subquery()
    )))
}

pub fn drop_table(database: &str, name: &str) -> Result<Statement> {
    require_name("Table", name)?;
    Ok(Statement::new(format!("DROP TABLE {}.{};", database, name)))
}

/// `CREATE VIEW project.name AS (<query>)`, or `FROM <database> (<native query>)`
/// when the query is written in the data source's own dialect
pub fn create_view(
    project: &str,
    name: &str,
    database: Option<&str>,
    source: &Statement,
) -> Result<Statement> {
    require_name("View", name)?;
    let body = match database {
        Some(db) => format!("FROM {} ({})", db, source.as_subquery()),
        None => format!("AS ({})", source.as_subquery()),
    };
    Ok(Statement::new(format!("CREATE VIEW {}.{} {};", project, name, body)))
}

pub fn drop_view(project: &str, name: &str) -> Result<Statement> {
    require_name("View", name)?;
    Ok(Statement::new(format!("DROP VIEW {}.{};", project, name)))
}

/// Time-series settings of a model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeseriesOptions {
    pub order_by: Option<String>,
    pub group_by: Vec<String>,
    pub window: Option<u32>,
    pub horizon: Option<u32>,
}

impl TimeseriesOptions {
    fn render(&self) -> String {
        let mut sql = String::new();
        if let Some(order_by) = &self.order_by {
            sql.push_str(&format!(" ORDER BY {}", order_by));
        }
        if !self.group_by.is_empty() {
            sql.push_str(&format!(" GROUP BY {}", self.group_by.join(", ")));
        }
        if let Some(window) = self.window {
            sql.push_str(&format!(" WINDOW {}", window));
        }
        if let Some(horizon) = self.horizon {
            sql.push_str(&format!(" HORIZON {}", horizon));
        }
        sql
    }
}

/// Training data: a query run in `database`
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingData {
    pub database: String,
    pub query: Statement,
}

impl TrainingData {
    pub fn new(database: impl Into<String>, query: impl Into<Statement>) -> Self {
        Self {
            database: database.into(),
            query: query.into(),
        }
    }

    fn render(&self) -> String {
        format!(" FROM {} ({})", self.database, self.query.as_subquery())
    }
}

/// Arguments of `CREATE MODEL`
///
/// # Examples
///
/// ```rust
/// use mindsdb_link::ddl::{ModelSpec, TrainingData};
///
/// let spec = ModelSpec::new("home_rentals_model")
///     .predict("rental_price")
///     .engine("lightwood")
///     .training_data(TrainingData::new("example_db", "SELECT * FROM demo_data.home_rentals"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSpec {
    pub name: String,
    pub predict: Option<String>,
    pub engine: Option<String>,
    pub training_data: Option<TrainingData>,
    pub timeseries: Option<TimeseriesOptions>,
    pub options: Map<String, JsonValue>,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn predict(mut self, column: impl Into<String>) -> Self {
        self.predict = Some(column.into());
        self
    }

    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn training_data(mut self, data: TrainingData) -> Self {
        self.training_data = Some(data);
        self
    }

    pub fn timeseries(mut self, options: TimeseriesOptions) -> Self {
        self.timeseries = Some(options);
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// `USING` map with `engine` first
    fn using(&self) -> Map<String, JsonValue> {
        let mut using = Map::new();
        if let Some(engine) = &self.engine {
            using.insert("engine".into(), JsonValue::String(engine.clone()));
        }
        for (key, value) in &self.options {
            using.insert(key.clone(), value.clone());
        }
        using
    }
}

pub fn create_model(project: &str, spec: &ModelSpec) -> Result<Statement> {
    require_name("Model", &spec.name)?;
    let mut sql = format!("CREATE MODEL {}.{}", project, spec.name);
    if let Some(data) = &spec.training_data {
        sql.push_str(&data.render());
    }
    if let Some(predict) = &spec.predict {
        sql.push_str(&format!(" PREDICT {}", predict));
    }
    if let Some(ts) = &spec.timeseries {
        sql.push_str(&ts.render());
    }
    sql.push_str(&render_using(&spec.using()));
    sql.push(';');
    Ok(Statement::new(sql))
}

pub fn drop_model(project: &str, name: &str) -> Result<Statement> {
    require_name("Model", name)?;
    Ok(Statement::new(format!("DROP MODEL {}.{};", project, name)))
}

/// `RETRAIN` / `FINETUNE` of an existing model
pub fn retrain_model(
    project: &str,
    name: &str,
    finetune: bool,
    data: Option<&TrainingData>,
    options: &Map<String, JsonValue>,
) -> Result<Statement> {
    require_name("Model", name)?;
    if finetune && data.is_none() {
        return Err(MindsLinkError::validation("Finetune requires training data"));
    }
    let verb = if finetune { "FINETUNE" } else { "RETRAIN" };
    let mut sql = format!("{} {}.{}", verb, project, name);
    if let Some(data) = data {
        sql.push_str(&data.render());
    }
    sql.push_str(&render_using(options));
    sql.push(';');
    Ok(Statement::new(sql))
}

/// `DESCRIBE project.model[.attribute]`
pub fn describe_model(project: &str, name: &str, attribute: Option<&str>) -> Result<Statement> {
    require_name("Model", name)?;
    let sql = match attribute {
        Some(attr) => format!("DESCRIBE {}.{}.{};", project, name, attr),
        None => format!("DESCRIBE {}.{};", project, name),
    };
    Ok(Statement::new(sql))
}

/// Arguments of `CREATE KNOWLEDGE_BASE`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBaseSpec {
    pub name: String,
    pub model: Option<String>,
    pub storage: Option<String>,
    pub metadata_columns: Vec<String>,
    pub content_columns: Vec<String>,
    pub id_column: Option<String>,
    pub params: Map<String, JsonValue>,
}

impl KnowledgeBaseSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Vector table, as `database.table`
    pub fn storage(mut self, storage: impl Into<String>) -> Self {
        self.storage = Some(storage.into());
        self
    }

    pub fn metadata_columns(mut self, columns: &[&str]) -> Self {
        self.metadata_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn content_columns(mut self, columns: &[&str]) -> Self {
        self.content_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = Some(column.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

pub fn create_knowledge_base(project: &str, spec: &KnowledgeBaseSpec) -> Result<Statement> {
    require_name("Knowledge base", &spec.name)?;

    // model and storage are identifiers, not literals
    let mut clauses = Vec::new();
    if let Some(model) = &spec.model {
        clauses.push(format!("model = {}", model));
    }
    if let Some(storage) = &spec.storage {
        clauses.push(format!("storage = {}", storage));
    }
    if !spec.metadata_columns.is_empty() {
        clauses.push(format!(
            "metadata_columns = {}",
            serde_json::to_string(&spec.metadata_columns)?
        ));
    }
    if !spec.content_columns.is_empty() {
        clauses.push(format!(
            "content_columns = {}",
            serde_json::to_string(&spec.content_columns)?
        ));
    }
    if let Some(id_column) = &spec.id_column {
        clauses.push(format!("id_column = '{}'", id_column));
    }
    for (key, value) in &spec.params {
        clauses.push(format!("{} = {}", key, render_literal(value)));
    }

    let mut sql = format!("CREATE KNOWLEDGE_BASE {}.{}", project, spec.name);
    if !clauses.is_empty() {
        sql.push_str(&format!(" USING {}", clauses.join(", ")));
    }
    sql.push(';');
    Ok(Statement::new(sql))
}

pub fn drop_knowledge_base(project: &str, name: &str) -> Result<Statement> {
    require_name("Knowledge base", name)?;
    Ok(Statement::new(format!("DROP KNOWLEDGE_BASE {}.{};", project, name)))
}

/// `CREATE ML_ENGINE name FROM handler [USING ...]`
pub fn create_ml_engine(
    name: &str,
    handler: &str,
    connection_data: &Map<String, JsonValue>,
) -> Result<Statement> {
    require_name("ML engine", name)?;
    require_name("Handler", handler)?;
    Ok(Statement::new(format!(
        "CREATE ML_ENGINE {} FROM {}{};",
        name,
        handler,
        render_using(connection_data)
    )))
}

pub fn drop_ml_engine(name: &str) -> Result<Statement> {
    require_name("ML engine", name)?;
    Ok(Statement::new(format!("DROP ML_ENGINE {};", name)))
}
