//! `column=value` filter predicates.

use crate::error::{MindsLinkError, Result};

/// One equality predicate, rendered as `column = 'value'`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Filter {
    column: String,
    value: String,
}

impl Filter {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Parse `key=value`. The text must contain exactly one `=` and a
    /// non-empty key; surrounding whitespace is trimmed.
    pub fn parse(pair: &str) -> Result<Self> {
        let mut parts = pair.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) if !key.trim().is_empty() => {
                Ok(Self::new(key.trim(), value.trim()))
            },
            _ => Err(MindsLinkError::validation(format!(
                "Invalid filter '{}': expected key=value",
                pair
            ))),
        }
    }

    /// Parse every pair or fail on the first malformed one
    pub fn parse_all(pairs: &[&str]) -> Result<Vec<Self>> {
        pairs.iter().map(|pair| Self::parse(pair)).collect()
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The value is quoted as-is; embedded quotes are not escaped.
    pub fn render(&self) -> String {
        format!("{} = '{}'", self.column, self.value)
    }
}

/// ` WHERE a = '1' AND b = '2'` (insertion order) plus the optional tracking
/// predicate; empty when there is nothing to filter on.
pub(crate) fn render_where(filters: &[Filter], track_column: Option<&str>) -> String {
    let mut clauses: Vec<String> = filters.iter().map(Filter::render).collect();
    if let Some(column) = track_column {
        clauses.push(format!("{} > last", column));
    }
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let f = Filter::parse("status=active").unwrap();
        assert_eq!(f.column(), "status");
        assert_eq!(f.value(), "active");
        assert_eq!(f.render(), "status = 'active'");

        let f = Filter::parse(" a = 1 ").unwrap();
        assert_eq!(f.render(), "a = '1'");

        let f = Filter::parse("note=").unwrap();
        assert_eq!(f.render(), "note = ''");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["novalue", "=x", "a=b=c", "", " =1"] {
            let err = Filter::parse(bad).unwrap_err();
            assert!(err.is_validation(), "expected validation error for {:?}", bad);
        }
    }

    #[test]
    fn test_parse_all_stops_on_first_error() {
        assert!(Filter::parse_all(&["a=1", "bad", "c=3"]).is_err());
        assert_eq!(Filter::parse_all(&["a=1", "b=2"]).unwrap().len(), 2);
    }

    #[test]
    fn test_render_where() {
        let filters = vec![Filter::new("a", "1"), Filter::new("b", "2")];
        assert_eq!(render_where(&filters, None), " WHERE a = '1' AND b = '2'");
        assert_eq!(render_where(&filters, Some("ts")), " WHERE a = '1' AND b = '2' AND ts > last");
        assert_eq!(render_where(&[], Some("ts")), " WHERE ts > last");
        assert_eq!(render_where(&[], None), "");
    }
}
