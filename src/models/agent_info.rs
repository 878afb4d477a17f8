use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::skill_info::{SkillInfo, SkillKind};
use crate::error::Result;
use crate::materialize::{
    coerce_string, json_object, required_string, split_unknown, FieldSource, Materialize,
};

/// Agent as returned by `/api/projects/{project}/agents`
#[derive(Debug, Clone, PartialEq)]
pub struct AgentInfo {
    pub name: String,
    pub model_name: Option<String>,
    pub provider: Option<String>,
    pub skills: Vec<SkillInfo>,
    pub params: Map<String, JsonValue>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub extra: Map<String, JsonValue>,
}

impl Materialize for AgentInfo {
    const KNOWN_FIELDS: &'static [&'static str] = &[
        "name",
        "model_name",
        "provider",
        "skills",
        "params",
        "created_at",
        "updated_at",
    ];

    fn materialize(source: &dyn FieldSource) -> Result<Self> {
        let skills = match source.field("skills") {
            Some(JsonValue::Array(items)) => items
                .iter()
                .map(|item| match item {
                    // Some server versions list skills by name only
                    JsonValue::String(name) => Ok(SkillInfo::new(
                        name.clone(),
                        SkillKind::Other(String::new()),
                        Map::new(),
                    )),
                    other => SkillInfo::from_json(other),
                })
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };

        Ok(Self {
            name: required_string(source, "name")?,
            model_name: coerce_string(source.field("model_name")),
            provider: coerce_string(source.field("provider")),
            skills,
            params: json_object(source.field("params")),
            created_at: coerce_string(source.field("created_at")),
            updated_at: coerce_string(source.field("updated_at")),
            extra: split_unknown(source, Self::KNOWN_FIELDS),
        })
    }
}

impl AgentInfo {
    pub fn skill_names(&self) -> Vec<String> {
        self.skills.iter().map(|s| s.name.clone()).collect()
    }

    /// Body for `POST .../agents`
    pub fn to_create_request(&self) -> AgentEnvelope {
        AgentEnvelope {
            agent: AgentPayload {
                name: self.name.clone(),
                model_name: self.model_name.clone(),
                provider: self.provider.clone(),
                skills: Some(self.skill_names()),
                skills_to_add: None,
                skills_to_remove: None,
                params: Some(self.params.clone()),
            },
        }
    }

    /// Body for `PUT .../agents/{name}`, expressing skill changes against `previous`
    pub fn to_update_request(&self, previous: &AgentInfo) -> AgentEnvelope {
        let current = self.skill_names();
        let before = previous.skill_names();
        let skills_to_add: Vec<String> =
            current.iter().filter(|s| !before.contains(s)).cloned().collect();
        let skills_to_remove: Vec<String> =
            before.iter().filter(|s| !current.contains(s)).cloned().collect();

        AgentEnvelope {
            agent: AgentPayload {
                name: self.name.clone(),
                model_name: self.model_name.clone(),
                provider: self.provider.clone(),
                skills: None,
                skills_to_add: Some(skills_to_add),
                skills_to_remove: Some(skills_to_remove),
                params: Some(self.params.clone()),
            },
        }
    }
}

/// `{"agent": {...}}` request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentEnvelope {
    pub agent: AgentPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills_to_add: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills_to_remove: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, JsonValue>>,
}
