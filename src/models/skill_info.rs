use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::error::Result;
use crate::materialize::{
    coerce_string, json_object, required_string, split_unknown, FieldSource, Materialize,
};

/// Skill type understood by the server's agent runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillKind {
    /// Answers questions by querying database tables
    Sql,
    /// Answers questions from a knowledge base
    Retrieval,
    /// Any type this client does not model
    Other(String),
}

impl SkillKind {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "sql" => Self::Sql,
            "retrieval" => Self::Retrieval,
            _ => Self::Other(value.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Sql => "sql",
            Self::Retrieval => "retrieval",
            Self::Other(other) => other,
        }
    }
}

/// Agent skill as returned by `/api/projects/{project}/skills`
#[derive(Debug, Clone, PartialEq)]
pub struct SkillInfo {
    pub name: String,
    pub kind: SkillKind,
    pub params: Map<String, JsonValue>,
    pub extra: Map<String, JsonValue>,
}

impl Materialize for SkillInfo {
    const KNOWN_FIELDS: &'static [&'static str] = &["name", "type", "params"];

    fn materialize(source: &dyn FieldSource) -> Result<Self> {
        let kind = coerce_string(source.field("type"))
            .map(|k| SkillKind::parse(&k))
            .unwrap_or_else(|| SkillKind::Other(String::new()));
        Ok(Self {
            name: required_string(source, "name")?,
            kind,
            params: json_object(source.field("params")),
            extra: split_unknown(source, Self::KNOWN_FIELDS),
        })
    }
}

impl SkillInfo {
    pub fn new(name: impl Into<String>, kind: SkillKind, params: Map<String, JsonValue>) -> Self {
        Self {
            name: name.into(),
            kind,
            params,
            extra: Map::new(),
        }
    }

    /// SQL skill over `tables` of `database`
    pub fn sql(
        name: impl Into<String>,
        database: &str,
        tables: &[&str],
        description: &str,
    ) -> Self {
        let mut params = Map::new();
        params.insert("database".into(), json!(database));
        params.insert("tables".into(), json!(tables));
        params.insert("description".into(), json!(description));
        Self::new(name, SkillKind::Sql, params)
    }

    /// Retrieval skill backed by a knowledge base
    pub fn retrieval(name: impl Into<String>, knowledge_base: &str, description: &str) -> Self {
        let mut params = Map::new();
        params.insert("source".into(), json!(knowledge_base));
        params.insert("description".into(), json!(description));
        Self::new(name, SkillKind::Retrieval, params)
    }

    /// Re-serialize for create/update requests
    pub fn to_request(&self) -> SkillEnvelope {
        SkillEnvelope {
            skill: SkillPayload {
                name: self.name.clone(),
                skill_type: self.kind.as_str().to_string(),
                params: self.params.clone(),
            },
        }
    }
}

/// `{"skill": {...}}` request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillEnvelope {
    pub skill: SkillPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub skill_type: String,
    pub params: Map<String, JsonValue>,
}
