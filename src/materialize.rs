//! Conversion of wire rows and JSON objects into typed entities.
//!
//! Catalog reads arrive either as a [`Row`] of a [`TabularResult`] or as a JSON
//! object from a REST endpoint. Both are exposed through [`FieldSource`], so an
//! entity's [`Materialize`] impl is written once. Recognized keys are matched
//! case-insensitively; every other key is kept in the entity's open bag.
//!
//! [`TabularResult`]: crate::models::TabularResult

use serde_json::{Map, Value as JsonValue};

use crate::error::{MindsLinkError, Result};
use crate::models::Row;

/// Read-only, case-insensitive access to named wire fields
pub trait FieldSource {
    /// Value for `key`, exact match first, then ignoring ASCII case
    fn field(&self, key: &str) -> Option<&JsonValue>;

    /// All `(name, value)` pairs in source order
    fn fields(&self) -> Vec<(&str, &JsonValue)>;
}

impl FieldSource for Row<'_> {
    fn field(&self, key: &str) -> Option<&JsonValue> {
        self.get(key)
    }

    fn fields(&self) -> Vec<(&str, &JsonValue)> {
        self.entries().collect()
    }
}

impl FieldSource for Map<String, JsonValue> {
    fn field(&self, key: &str) -> Option<&JsonValue> {
        self.get(key).or_else(|| {
            self.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    fn fields(&self) -> Vec<(&str, &JsonValue)> {
        self.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }
}

/// An entity built from one catalog row or JSON object
pub trait Materialize: Sized {
    /// Keys this entity reads into typed fields (lowercase)
    const KNOWN_FIELDS: &'static [&'static str];

    fn materialize(source: &dyn FieldSource) -> Result<Self>;

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Self::materialize(row)
    }

    fn from_json(value: &JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(map) => Self::materialize(map),
            other => Err(MindsLinkError::TransportError(format!(
                "Expected a JSON object, got: {}",
                other
            ))),
        }
    }
}

/// Wire boolean normalization.
///
/// Absent or `null` is `false`; a value whose string form equals `"false"`
/// in any case is `false`; every other value is `true` (including `0`).
pub fn normalize_bool(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => false,
        Some(JsonValue::String(s)) => !s.eq_ignore_ascii_case("false"),
        Some(other) => !other.to_string().eq_ignore_ascii_case("false"),
    }
}

/// String form of a scalar; `null` and absent become `None`
pub fn coerce_string(value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Integer coercion accepting numbers and numeric strings
pub fn coerce_i64(value: Option<&JsonValue>) -> Option<i64> {
    match value? {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        JsonValue::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            })
        },
        _ => None,
    }
}

pub fn coerce_f64(value: Option<&JsonValue>) -> Option<f64> {
    match value? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Like [`coerce_i64`] but a present, non-null, non-numeric value is an error
pub fn optional_i64(source: &dyn FieldSource, key: &str) -> Result<Option<i64>> {
    match source.field(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => coerce_i64(Some(value)).map(Some).ok_or_else(|| {
            MindsLinkError::TransportError(format!("Field '{}' is not an integer: {}", key, value))
        }),
    }
}

/// Required string field
pub fn required_string(source: &dyn FieldSource, key: &str) -> Result<String> {
    coerce_string(source.field(key))
        .ok_or_else(|| MindsLinkError::TransportError(format!("Missing field '{}'", key)))
}

/// JSON object field that may arrive encoded as a string.
///
/// Undecodable or non-object content degrades to an empty map.
pub fn json_object(value: Option<&JsonValue>) -> Map<String, JsonValue> {
    match value {
        Some(JsonValue::Object(map)) => map.clone(),
        Some(JsonValue::String(text)) => match serde_json::from_str::<JsonValue>(text) {
            Ok(JsonValue::Object(map)) => map,
            Ok(_) | Err(_) => {
                log::debug!("[MINDS_MATERIALIZE] Ignoring undecodable params payload");
                Map::new()
            },
        },
        _ => Map::new(),
    }
}

/// List of strings from a JSON array or a JSON-encoded array string
pub fn string_list(value: Option<&JsonValue>) -> Vec<String> {
    let decoded;
    let value = match value {
        Some(JsonValue::String(text)) => match serde_json::from_str::<JsonValue>(text) {
            Ok(parsed @ JsonValue::Array(_)) => {
                decoded = parsed;
                &decoded
            },
            _ => return vec![text.clone()],
        },
        Some(other) => other,
        None => return Vec::new(),
    };

    match value {
        JsonValue::Array(items) => items.iter().filter_map(|v| coerce_string(Some(v))).collect(),
        _ => Vec::new(),
    }
}

/// Every field whose name is not in `known` (compared ignoring case)
pub fn split_unknown(source: &dyn FieldSource, known: &[&str]) -> Map<String, JsonValue> {
    source
        .fields()
        .into_iter()
        .filter(|(name, _)| !known.iter().any(|k| k.eq_ignore_ascii_case(name)))
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TabularResult;
    use serde_json::json;

    #[test]
    fn test_normalize_bool() {
        assert!(!normalize_bool(None));
        assert!(!normalize_bool(Some(&JsonValue::Null)));
        assert!(!normalize_bool(Some(&json!("false"))));
        assert!(!normalize_bool(Some(&json!("FALSE"))));
        assert!(!normalize_bool(Some(&json!("False"))));
        assert!(!normalize_bool(Some(&json!(false))));

        assert!(normalize_bool(Some(&json!("true"))));
        assert!(normalize_bool(Some(&json!(true))));
        assert!(normalize_bool(Some(&json!(""))));
        assert!(normalize_bool(Some(&json!("no"))));
        assert!(normalize_bool(Some(&json!(0))));
        assert!(normalize_bool(Some(&json!(1))));
    }

    #[test]
    fn test_coerce_i64() {
        assert_eq!(coerce_i64(Some(&json!(3))), Some(3));
        assert_eq!(coerce_i64(Some(&json!("1"))), Some(1));
        assert_eq!(coerce_i64(Some(&json!(" 42 "))), Some(42));
        assert_eq!(coerce_i64(Some(&json!(2.0))), Some(2));
        assert_eq!(coerce_i64(Some(&json!("2.0"))), Some(2));
        assert_eq!(coerce_i64(Some(&json!(2.5))), None);
        assert_eq!(coerce_i64(Some(&json!("abc"))), None);
        assert_eq!(coerce_i64(None), None);
    }

    #[test]
    fn test_map_source_is_case_insensitive() {
        let map = json!({"Name": "agent", "MODEL_NAME": "gpt"});
        let map = map.as_object().unwrap();
        assert_eq!(map.field("name"), Some(&json!("agent")));
        assert_eq!(map.field("model_name"), Some(&json!("gpt")));
    }

    #[test]
    fn test_json_object_fallbacks() {
        let from_str = json_object(Some(&json!("{\"a\": 1}")));
        assert_eq!(from_str.get("a"), Some(&json!(1)));

        let from_map = json_object(Some(&json!({"b": 2})));
        assert_eq!(from_map.get("b"), Some(&json!(2)));

        assert!(json_object(Some(&json!("{not json"))).is_empty());
        assert!(json_object(Some(&json!("[1, 2]"))).is_empty());
        assert!(json_object(None).is_empty());
    }

    #[test]
    fn test_string_list() {
        assert_eq!(string_list(Some(&json!(["a", "b"]))), vec!["a", "b"]);
        assert_eq!(string_list(Some(&json!("[\"x\"]"))), vec!["x"]);
        assert_eq!(string_list(Some(&json!("single"))), vec!["single"]);
        assert!(string_list(None).is_empty());
    }

    #[test]
    fn test_split_unknown_from_row() {
        let result = TabularResult::from_rows(
            vec!["NAME".into(), "ENGINE".into(), "new_server_field".into()],
            vec![vec![json!("db"), json!("postgres"), json!(7)]],
        )
        .unwrap();
        let row = result.row(0).unwrap();
        let extra = split_unknown(&row, &["name", "engine"]);
        assert_eq!(extra.len(), 1);
        assert_eq!(extra.get("new_server_field"), Some(&json!(7)));
    }

    #[test]
    fn test_optional_i64_rejects_garbage() {
        let map = json!({"version": "v1"});
        let err = optional_i64(map.as_object().unwrap(), "version").unwrap_err();
        assert!(err.is_transport());

        let map = json!({"version": null});
        assert_eq!(optional_i64(map.as_object().unwrap(), "version").unwrap(), None);
    }
}
