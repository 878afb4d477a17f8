//! Knowledge base handle: semantic search builder plus ingestion.

use serde_json::{Map, Value as JsonValue};

use crate::error::Result;
use crate::materialize::{coerce_string, json_object, required_string, string_list, FieldSource};
use crate::models::{Row, TabularResult};
use crate::query::select::render_insert;
use crate::query::{InsertSource, TableRef, Target};
use crate::statement::Statement;
use crate::transport::Transport;

/// A knowledge base of a project.
///
/// Catalog metadata is read once when the handle is built; the search state
/// (`query_text`, `result_limit`) follows the same copy-on-write rules as
/// [`SelectBuilder`](crate::query::SelectBuilder).
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    transport: Transport,
    target: TableRef,
    storage: Option<String>,
    model: Option<String>,
    metadata_columns: Vec<String>,
    content_columns: Vec<String>,
    id_column: Option<String>,
    params: Map<String, JsonValue>,
    query_text: Option<String>,
    result_limit: Option<u64>,
}

impl KnowledgeBase {
    /// Build from a row of `information_schema.knowledge_bases`.
    ///
    /// `params` may be a JSON string or an object; anything undecodable
    /// yields an empty parameter set. `metadata_columns`, `content_columns`
    /// and `id_column` are lifted out of `params` into their own fields.
    pub fn from_row(transport: Transport, project: &str, row: &Row<'_>) -> Result<Self> {
        Self::from_fields(transport, project, row)
    }

    pub(crate) fn from_fields(
        transport: Transport,
        project: &str,
        source: &dyn FieldSource,
    ) -> Result<Self> {
        let name = required_string(source, "name")?;
        let mut params = json_object(source.field("params"));

        let metadata_columns = string_list(params.remove("metadata_columns").as_ref());
        let content_columns = string_list(params.remove("content_columns").as_ref());
        let id_column = coerce_string(params.remove("id_column").as_ref());

        let model = coerce_string(source.field("embedding_model"))
            .or_else(|| coerce_string(source.field("model")));

        Ok(Self {
            transport,
            target: TableRef::new(project, name),
            storage: coerce_string(source.field("storage")),
            model,
            metadata_columns,
            content_columns,
            id_column,
            params,
            query_text: None,
            result_limit: None,
        })
    }

    pub fn name(&self) -> &str {
        self.target.name()
    }

    pub fn project(&self) -> &str {
        self.target.scope()
    }

    pub fn storage(&self) -> Option<&str> {
        self.storage.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn metadata_columns(&self) -> &[String] {
        &self.metadata_columns
    }

    pub fn content_columns(&self) -> &[String] {
        &self.content_columns
    }

    pub fn id_column(&self) -> Option<&str> {
        self.id_column.as_deref()
    }

    /// Parameters not lifted into typed fields
    pub fn params(&self) -> &Map<String, JsonValue> {
        &self.params
    }

    pub fn query_text(&self) -> Option<&str> {
        self.query_text.as_deref()
    }

    pub fn result_limit(&self) -> Option<u64> {
        self.result_limit
    }

    fn derive(&self, query_text: Option<String>, result_limit: Option<u64>) -> Self {
        Self {
            query_text,
            result_limit,
            ..self.clone()
        }
    }

    /// Semantic search for `query`, optionally capped at `limit` rows
    pub fn find(&self, query: impl Into<String>, limit: Option<u64>) -> Self {
        self.derive(Some(query.into()), limit)
    }

    pub fn limit(&self, n: u64) -> Self {
        self.derive(self.query_text.clone(), Some(n))
    }

    pub fn render(&self) -> String {
        let mut sql = format!("SELECT * FROM {}", self.target.identifier());
        if let Some(query) = &self.query_text {
            sql.push_str(&format!(" WHERE CONTENT = '{}'", query));
        }
        if let Some(limit) = self.result_limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql.push(';');
        sql
    }

    pub fn to_statement(&self) -> Statement {
        Statement::new(self.render()).with_schema(self.project())
    }

    pub fn fetch(&self) -> Result<TabularResult> {
        self.transport.fetch(&self.to_statement())
    }

    /// Insert rows (or a query's result) through SQL
    pub fn insert(&self, source: impl Into<InsertSource>) -> Result<()> {
        let sql = render_insert(&self.target.identifier(), &source.into())?;
        self.transport
            .execute(&Statement::new(sql).with_schema(self.project()))?;
        Ok(())
    }

    /// Ingest files previously uploaded with
    /// [`Transport::upload_file`]
    pub fn insert_files(&self, files: &[&str]) -> Result<()> {
        self.transport.insert_files_into_knowledge_base(
            self.project(),
            self.name(),
            files.iter().map(|f| f.to_string()).collect(),
        )
    }

    /// Crawl `urls` to `crawl_depth` and ingest the pages
    pub fn insert_webpages(&self, urls: &[&str], crawl_depth: u32, filters: &[&str]) -> Result<()> {
        self.transport.insert_webpages_into_knowledge_base(
            self.project(),
            self.name(),
            urls.iter().map(|u| u.to_string()).collect(),
            crawl_depth,
            filters.iter().map(|f| f.to_string()).collect(),
        )
    }
}
