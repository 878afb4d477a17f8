//! Target-identifier resolution for builders.

use std::fmt;

/// How a builder names the relation it reads from or writes to.
///
/// Builders are generic over this so scoped tables, project objects and
/// bare identifiers share one rendering path.
pub trait Target: Clone + fmt::Debug + PartialEq + Send + Sync {
    /// Identifier as it appears after `FROM` / `INTO`
    fn identifier(&self) -> String;

    /// Schema the rendered statement should execute in
    fn schema(&self) -> Option<&str> {
        None
    }
}

/// A relation inside a named scope: a table of a data source, or a view,
/// model or knowledge base of a project. Renders as `scope.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    scope: String,
    name: String,
}

impl TableRef {
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Target for TableRef {
    fn identifier(&self) -> String {
        format!("{}.{}", self.scope, self.name)
    }

    fn schema(&self) -> Option<&str> {
        Some(&self.scope)
    }
}

/// An identifier used verbatim, resolved against the server default schema
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawTarget(pub String);

impl RawTarget {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }
}

impl Target for RawTarget {
    fn identifier(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ref_identifier() {
        let target = TableRef::new("db", "t");
        assert_eq!(target.identifier(), "db.t");
        assert_eq!(target.schema(), Some("db"));
    }

    #[test]
    fn test_raw_target_identifier() {
        let target = RawTarget::new("information_schema.handlers");
        assert_eq!(target.identifier(), "information_schema.handlers");
        assert_eq!(target.schema(), None);
    }
}
