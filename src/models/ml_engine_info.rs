use serde_json::{Map, Value as JsonValue};

use crate::error::Result;
use crate::materialize::{
    coerce_string, json_object, required_string, split_unknown, FieldSource, Materialize,
};

/// Snapshot of one configured ML engine
#[derive(Debug, Clone, PartialEq)]
pub struct MlEngineInfo {
    pub name: String,
    pub handler: Option<String>,
    pub connection_data: Map<String, JsonValue>,
    pub extra: Map<String, JsonValue>,
}

impl Materialize for MlEngineInfo {
    const KNOWN_FIELDS: &'static [&'static str] = &["name", "handler", "connection_data"];

    fn materialize(source: &dyn FieldSource) -> Result<Self> {
        Ok(Self {
            name: required_string(source, "name")?,
            handler: coerce_string(source.field("handler")),
            connection_data: json_object(source.field("connection_data")),
            extra: split_unknown(source, Self::KNOWN_FIELDS),
        })
    }
}
