use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::tabular_result::TabularResult;
use crate::error::{MindsLinkError, Result};

/// Raw body of a `POST /api/sql/query` response.
///
/// The `type` discriminator decides how the rest is read: `"table"` carries
/// `column_names` + row-major `data`, `"error"` carries `error_message`, and
/// anything else (`"ok"` for DDL/DML) carries no rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(rename = "type", default)]
    pub response_type: Option<JsonValue>,

    #[serde(default)]
    pub column_names: Option<Vec<String>>,

    #[serde(default)]
    pub data: Option<Vec<Vec<JsonValue>>>,

    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<JsonValue>,
}

/// Classified response of a statement execution
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Row data
    Table(TabularResult),

    /// Statement executed, nothing to return; carries the discriminator seen
    NoRows(String),
}

impl QueryResponse {
    /// Classify by the `type` discriminator.
    ///
    /// A server-reported error becomes [`MindsLinkError::QueryError`]; a missing
    /// or non-string discriminator, or a table without columns, is a
    /// [`MindsLinkError::TransportError`].
    pub fn into_outcome(self) -> Result<QueryOutcome> {
        let kind = match self.response_type {
            Some(JsonValue::String(kind)) => kind,
            Some(other) => {
                return Err(MindsLinkError::TransportError(format!(
                    "Unexpected response type discriminator: {}",
                    other
                )))
            },
            None => {
                return Err(MindsLinkError::TransportError(
                    "Response is missing the 'type' field".into(),
                ))
            },
        };

        match kind.as_str() {
            "table" => {
                let column_names = self.column_names.ok_or_else(|| {
                    MindsLinkError::TransportError("Table response without column_names".into())
                })?;
                let data = self.data.unwrap_or_default();
                TabularResult::from_rows(column_names, data).map(QueryOutcome::Table)
            },
            "error" => Err(MindsLinkError::QueryError(
                self.error_message.unwrap_or_else(|| "Unknown server error".to_string()),
            )),
            _ => Ok(QueryOutcome::NoRows(kind)),
        }
    }
}
