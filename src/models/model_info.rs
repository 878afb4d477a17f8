use serde_json::{Map, Value as JsonValue};

use crate::error::Result;
use crate::materialize::{
    coerce_f64, coerce_string, json_object, normalize_bool, optional_i64, required_string,
    split_unknown, FieldSource, Materialize,
};

/// Snapshot of one row of a project's `models` table
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    pub project: Option<String>,
    pub engine: Option<String>,
    pub engine_name: Option<String>,
    pub version: Option<i64>,
    pub active: bool,
    pub status: Option<String>,
    pub accuracy: Option<f64>,
    pub predict: Option<String>,
    pub error: Option<String>,
    pub select_data_query: Option<String>,
    pub training_options: Map<String, JsonValue>,
    pub tag: Option<String>,
    /// Columns not recognized above
    pub extra: Map<String, JsonValue>,
}

impl Materialize for ModelInfo {
    const KNOWN_FIELDS: &'static [&'static str] = &[
        "name",
        "project",
        "engine",
        "mlengine_name",
        "version",
        "active",
        "status",
        "accuracy",
        "predict",
        "error",
        "select_data_query",
        "training_options",
        "tag",
    ];

    fn materialize(source: &dyn FieldSource) -> Result<Self> {
        Ok(Self {
            name: required_string(source, "name")?,
            project: coerce_string(source.field("project")),
            engine: coerce_string(source.field("engine")),
            engine_name: coerce_string(source.field("mlengine_name")),
            version: optional_i64(source, "version")?,
            active: normalize_bool(source.field("active")),
            status: coerce_string(source.field("status")),
            accuracy: coerce_f64(source.field("accuracy")),
            predict: coerce_string(source.field("predict")),
            error: coerce_string(source.field("error")),
            select_data_query: coerce_string(source.field("select_data_query")),
            training_options: json_object(source.field("training_options")),
            tag: coerce_string(source.field("tag")),
            extra: split_unknown(source, Self::KNOWN_FIELDS),
        })
    }
}

impl ModelInfo {
    /// Training finished successfully
    pub fn is_complete(&self) -> bool {
        matches!(self.status.as_deref(), Some(s) if s.eq_ignore_ascii_case("complete"))
    }

    /// Training ended in error
    pub fn is_error(&self) -> bool {
        matches!(self.status.as_deref(), Some(s) if s.eq_ignore_ascii_case("error"))
    }
}
