use serde_json::{Map, Value as JsonValue};

use crate::error::{MindsLinkError, Result};
use crate::materialize::{
    coerce_string, json_object, required_string, split_unknown, FieldSource, Materialize,
};
use crate::models::Row;

/// Row of `information_schema.databases`; used for both data sources and projects
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseInfo {
    pub name: String,
    pub engine: Option<String>,
    pub database_type: Option<String>,
    pub connection_data: Map<String, JsonValue>,
    pub extra: Map<String, JsonValue>,
}

impl Materialize for DatabaseInfo {
    const KNOWN_FIELDS: &'static [&'static str] = &["name", "engine", "type", "connection_data"];

    fn materialize(source: &dyn FieldSource) -> Result<Self> {
        Ok(Self {
            name: required_string(source, "name")?,
            engine: coerce_string(source.field("engine")),
            database_type: coerce_string(source.field("type")),
            connection_data: json_object(source.field("connection_data")),
            extra: split_unknown(source, Self::KNOWN_FIELDS),
        })
    }
}

/// Row of a `SHOW FULL TABLES` listing
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub name: String,
    pub table_type: Option<String>,
    pub extra: Map<String, JsonValue>,
}

impl TableInfo {
    /// Read a listing row: the name is the first column (`Tables_in_<db>`),
    /// the type comes from `table_type` when present. Other columns land in
    /// `extra`.
    pub fn from_listing_row(row: &Row<'_>) -> Result<Self> {
        let (name_column, name) = row
            .entries()
            .next()
            .and_then(|(column, value)| Some((column, coerce_string(Some(value))?)))
            .ok_or_else(|| {
                MindsLinkError::TransportError("Table listing row has no name".into())
            })?;
        Ok(Self {
            name,
            table_type: coerce_string(row.get("table_type")),
            extra: split_unknown(row, &[name_column, "table_type"]),
        })
    }

    pub fn is_view(&self) -> bool {
        matches!(self.table_type.as_deref(), Some(t) if t.eq_ignore_ascii_case("view"))
    }
}
