use serde::{Deserialize, Serialize};

/// Schema used when a statement does not name one
pub const DEFAULT_SCHEMA: &str = "mindsdb";

/// Request payload for `POST /api/sql/query`.
///
/// # Examples
///
/// ```rust
/// use mindsdb_link::models::QueryRequest;
///
/// let request = QueryRequest::new("SELECT * FROM models", None);
/// assert_eq!(request.context.db, "mindsdb");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRequest {
    /// Statement text
    pub query: String,

    /// Resolution context for unqualified names
    pub context: QueryContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryContext {
    /// Default schema (project or database)
    pub db: String,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, schema: Option<&str>) -> Self {
        Self {
            query: query.into(),
            context: QueryContext {
                db: schema.unwrap_or(DEFAULT_SCHEMA).to_string(),
            },
        }
    }
}
