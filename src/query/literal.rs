//! SQL literal rendering for insert and update values.

use serde_json::Value as JsonValue;

/// Render a JSON value as a SQL literal.
///
/// Strings are wrapped in single quotes without escaping, matching the
/// server's existing statement format. Arrays and objects are sent as their
/// quoted JSON text.
pub fn render_literal(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => format!("'{}'", s),
        other => format!("'{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(render_literal(&json!(null)), "NULL");
        assert_eq!(render_literal(&json!(true)), "true");
        assert_eq!(render_literal(&json!(42)), "42");
        assert_eq!(render_literal(&json!(1.5)), "1.5");
        assert_eq!(render_literal(&json!("abc")), "'abc'");
    }

    #[test]
    fn test_structured_values_are_quoted_json() {
        assert_eq!(render_literal(&json!(["a", 1])), "'[\"a\",1]'");
        assert_eq!(render_literal(&json!({"k": "v"})), "'{\"k\":\"v\"}'");
    }

    #[test]
    fn test_quotes_are_not_escaped() {
        // Values are passed through verbatim; a quote inside breaks the literal.
        assert_eq!(render_literal(&json!("O'Brien")), "'O'Brien'");
    }
}
