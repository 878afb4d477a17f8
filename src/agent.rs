//! Agent handle for conversations.

use crate::error::Result;
use crate::models::{AgentCompletion, AgentInfo, CompletionMessage};
use crate::transport::Transport;

/// An agent of a project, as of the last fetch
#[derive(Debug, Clone)]
pub struct Agent {
    transport: Transport,
    project: String,
    info: AgentInfo,
}

impl Agent {
    pub(crate) fn new(transport: Transport, project: &str, info: AgentInfo) -> Self {
        Self {
            transport,
            project: project.to_string(),
            info,
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn info(&self) -> &AgentInfo {
        &self.info
    }

    /// Continue a conversation. The last message is the one being asked.
    pub fn completion(&self, messages: Vec<CompletionMessage>) -> Result<AgentCompletion> {
        self.transport
            .agent_completion(&self.project, &self.info.name, messages)
    }

    /// Ask a single question with no history
    pub fn ask(&self, question: impl Into<String>) -> Result<String> {
        let completion = self.completion(vec![CompletionMessage::question(question)])?;
        Ok(completion.content)
    }

    /// Re-read the agent from the server
    pub fn refresh(&self) -> Result<Agent> {
        let info = self.transport.get_agent(&self.project, &self.info.name)?;
        Ok(Self {
            info,
            ..self.clone()
        })
    }
}
