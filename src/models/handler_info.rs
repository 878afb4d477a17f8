use serde_json::{Map, Value as JsonValue};

use crate::error::Result;
use crate::materialize::{
    coerce_string, normalize_bool, required_string, split_unknown, FieldSource, Materialize,
};

/// Kind of server-side integration a handler provides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// ML engine integration
    Ml,
    /// Data source integration
    Data,
}

impl HandlerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ml => "ml",
            Self::Data => "data",
        }
    }
}

/// Read-only descriptor of a server plugin
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerInfo {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub handler_type: Option<String>,
    pub import_success: bool,
    pub import_error: Option<String>,
    pub connection_args: Option<JsonValue>,
    pub extra: Map<String, JsonValue>,
}

impl Materialize for HandlerInfo {
    const KNOWN_FIELDS: &'static [&'static str] = &[
        "name",
        "title",
        "description",
        "version",
        "type",
        "import_success",
        "import_error",
        "connection_args",
    ];

    fn materialize(source: &dyn FieldSource) -> Result<Self> {
        Ok(Self {
            name: required_string(source, "name")?,
            title: coerce_string(source.field("title")),
            description: coerce_string(source.field("description")),
            version: coerce_string(source.field("version")),
            handler_type: coerce_string(source.field("type")),
            import_success: normalize_bool(source.field("import_success")),
            import_error: coerce_string(source.field("import_error")),
            connection_args: source.field("connection_args").filter(|v| !v.is_null()).cloned(),
            extra: split_unknown(source, Self::KNOWN_FIELDS),
        })
    }
}
