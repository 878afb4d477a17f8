use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One turn of an agent conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionMessage {
    pub question: String,
    /// `None` for the turn being asked
    pub answer: Option<String>,
}

impl CompletionMessage {
    pub fn question(text: impl Into<String>) -> Self {
        Self {
            question: text.into(),
            answer: None,
        }
    }
}

/// Body for `POST .../agents/{name}/completions`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<CompletionMessage>,
}

/// Response of an agent completion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionResponse {
    pub message: AgentCompletion,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentCompletion {
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<JsonValue>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}
