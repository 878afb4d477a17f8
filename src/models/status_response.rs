use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Body of `GET /api/status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    #[serde(default)]
    pub mindsdb_version: Option<String>,

    #[serde(default)]
    pub environment: Option<String>,

    #[serde(default)]
    pub auth: Option<JsonValue>,

    /// Fields added by newer servers
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}
