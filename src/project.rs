//! Project handle: views, models, knowledge bases, agents and skills.

use log::{debug, warn};

use crate::agent::Agent;
use crate::ddl::{self, KnowledgeBaseSpec, ModelSpec};
use crate::error::{MindsLinkError, Result};
use crate::knowledge_base::KnowledgeBase;
use crate::materialize::Materialize;
use crate::model::{list_model_rows, pick_current, Model};
use crate::models::{AgentInfo, ModelInfo, SkillInfo, TableInfo, TabularResult};
use crate::query::{SelectBuilder, TableRef};
use crate::statement::Statement;
use crate::table::Table;
use crate::transport::Transport;

/// A MindsDB project. Obtained from [`Server::project`](crate::Server::project)
/// or [`Server::get_project`](crate::Server::get_project).
#[derive(Debug, Clone)]
pub struct Project {
    transport: Transport,
    name: String,
}

impl Project {
    pub(crate) fn new(transport: Transport, name: &str) -> Self {
        Self {
            transport,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Run SQL with this project as the default schema
    pub fn query(&self, sql: impl Into<String>) -> Result<TabularResult> {
        self.transport
            .fetch(&Statement::new(sql).with_schema(&self.name))
    }

    // ── Views ────────────────────────────────────────────────────────────────

    pub fn list_views(&self) -> Result<Vec<Table>> {
        let statement =
            Statement::new(format!("SHOW FULL TABLES FROM {};", self.name)).with_schema(&self.name);
        let result = self.transport.fetch(&statement)?;
        let mut views = Vec::new();
        for row in result.rows() {
            let info = TableInfo::from_listing_row(&row)?;
            if info.is_view() {
                views.push(Table::new(self.transport.clone(), &self.name, &info.name));
            }
        }
        Ok(views)
    }

    pub fn get_view(&self, name: &str) -> Result<Table> {
        self.list_views()?
            .into_iter()
            .find(|view| view.name() == name)
            .ok_or_else(|| MindsLinkError::not_found("View doesn't exist"))
    }

    /// Create a view over `source`. With `database` set the query is passed
    /// through to that data source unchanged.
    pub fn create_view(
        &self,
        name: &str,
        source: &Statement,
        database: Option<&str>,
    ) -> Result<Table> {
        let statement = ddl::create_view(&self.name, name, database, source)?;
        self.transport.execute(&statement.with_schema(&self.name))?;
        Ok(Table::new(self.transport.clone(), &self.name, name))
    }

    pub fn drop_view(&self, name: &str) -> Result<()> {
        let statement = ddl::drop_view(&self.name, name)?;
        self.transport.execute(&statement.with_schema(&self.name))?;
        Ok(())
    }

    // ── Models ───────────────────────────────────────────────────────────────

    /// Current version of every model, in listing order
    pub fn list_models(&self) -> Result<Vec<Model>> {
        let rows = list_model_rows(&self.transport, &self.name, None)?;
        let mut grouped: Vec<(String, Vec<ModelInfo>)> = Vec::new();
        for info in rows {
            match grouped.iter_mut().find(|(name, _)| *name == info.name) {
                Some((_, versions)) => versions.push(info),
                None => grouped.push((info.name.clone(), vec![info])),
            }
        }
        Ok(grouped
            .into_iter()
            .filter_map(|(_, versions)| pick_current(versions))
            .map(|info| Model::new(self.transport.clone(), &self.name, info))
            .collect())
    }

    pub fn get_model(&self, name: &str) -> Result<Model> {
        let versions = list_model_rows(&self.transport, &self.name, Some(name))?;
        let info = pick_current(versions)
            .ok_or_else(|| MindsLinkError::not_found("Model doesn't exist"))?;
        Ok(Model::new(self.transport.clone(), &self.name, info))
    }

    /// One specific version of a model
    pub fn get_model_version(&self, name: &str, version: i64) -> Result<Model> {
        let versions = list_model_rows(&self.transport, &self.name, Some(name))?;
        let info = versions
            .into_iter()
            .find(|m| m.version == Some(version))
            .ok_or_else(|| MindsLinkError::not_found("Model doesn't exist"))?;
        Ok(Model::new(self.transport.clone(), &self.name, info).pinned())
    }

    /// Start training; the returned snapshot is usually still `generating`
    pub fn create_model(&self, spec: &ModelSpec) -> Result<Model> {
        let statement = ddl::create_model(&self.name, spec)?;
        let result = self.transport.execute(&statement.with_schema(&self.name))?;

        // CREATE MODEL answers with the new models row
        if let Some(row) = result.as_ref().and_then(|r| r.row(0)) {
            match ModelInfo::from_row(&row) {
                Ok(info) => return Ok(Model::new(self.transport.clone(), &self.name, info)),
                Err(e) => warn!(
                    "[MINDS_MODEL] Unreadable CREATE MODEL row for {}.{}: {}; looking it up",
                    self.name, spec.name, e
                ),
            }
        }
        self.get_model(&spec.name)
    }

    pub fn drop_model(&self, name: &str) -> Result<()> {
        let statement = ddl::drop_model(&self.name, name)?;
        self.transport.execute(&statement.with_schema(&self.name))?;
        Ok(())
    }

    // ── Knowledge bases ──────────────────────────────────────────────────────

    fn knowledge_base_listing(&self) -> Result<SelectBuilder<TableRef>> {
        SelectBuilder::new(TableRef::new("information_schema", "knowledge_bases"))
            .filter(&[&format!("project={}", self.name)])
    }

    pub fn list_knowledge_bases(&self) -> Result<Vec<KnowledgeBase>> {
        let result = self
            .transport
            .fetch(&self.knowledge_base_listing()?.to_statement())?;
        result
            .rows()
            .map(|row| KnowledgeBase::from_row(self.transport.clone(), &self.name, &row))
            .collect()
    }

    pub fn get_knowledge_base(&self, name: &str) -> Result<KnowledgeBase> {
        let builder = self
            .knowledge_base_listing()?
            .filter(&[&format!("name={}", name)])?;
        let result = self.transport.fetch(&builder.to_statement())?;
        let row = result
            .row(0)
            .ok_or_else(|| MindsLinkError::not_found("Knowledge base doesn't exist"))?;
        KnowledgeBase::from_row(self.transport.clone(), &self.name, &row)
    }

    pub fn create_knowledge_base(&self, spec: &KnowledgeBaseSpec) -> Result<KnowledgeBase> {
        let statement = ddl::create_knowledge_base(&self.name, spec)?;
        self.transport.execute(&statement.with_schema(&self.name))?;
        self.get_knowledge_base(&spec.name)
    }

    pub fn drop_knowledge_base(&self, name: &str) -> Result<()> {
        let statement = ddl::drop_knowledge_base(&self.name, name)?;
        self.transport.execute(&statement.with_schema(&self.name))?;
        Ok(())
    }

    // ── Agents ───────────────────────────────────────────────────────────────

    pub fn list_agents(&self) -> Result<Vec<Agent>> {
        Ok(self
            .transport
            .list_agents(&self.name)?
            .into_iter()
            .map(|info| Agent::new(self.transport.clone(), &self.name, info))
            .collect())
    }

    pub fn get_agent(&self, name: &str) -> Result<Agent> {
        let info = self.transport.get_agent(&self.name, name)?;
        Ok(Agent::new(self.transport.clone(), &self.name, info))
    }

    pub fn create_agent(&self, agent: &AgentInfo) -> Result<Agent> {
        let info = self.transport.create_agent(&self.name, agent)?;
        Ok(Agent::new(self.transport.clone(), &self.name, info))
    }

    /// Replace the agent stored under `agent.name`. Skill membership is sent
    /// as additions and removals against the server's current copy.
    pub fn update_agent(&self, agent: &AgentInfo) -> Result<Agent> {
        let previous = self.transport.get_agent(&self.name, &agent.name)?;
        let update = agent.to_update_request(&previous);
        debug!(
            "[MINDS_REST] Updating agent {}.{} (+{:?} -{:?})",
            self.name, agent.name, update.agent.skills_to_add, update.agent.skills_to_remove
        );
        let info = self.transport.update_agent(&self.name, &agent.name, &update)?;
        Ok(Agent::new(self.transport.clone(), &self.name, info))
    }

    pub fn delete_agent(&self, name: &str) -> Result<()> {
        self.transport.delete_agent(&self.name, name)
    }

    // ── Skills ───────────────────────────────────────────────────────────────

    pub fn list_skills(&self) -> Result<Vec<SkillInfo>> {
        self.transport.list_skills(&self.name)
    }

    pub fn get_skill(&self, name: &str) -> Result<SkillInfo> {
        self.transport.get_skill(&self.name, name)
    }

    pub fn create_skill(&self, skill: &SkillInfo) -> Result<SkillInfo> {
        self.transport.create_skill(&self.name, skill)
    }

    pub fn update_skill(&self, skill: &SkillInfo) -> Result<SkillInfo> {
        self.transport.update_skill(&self.name, &skill.name, skill)
    }

    pub fn delete_skill(&self, name: &str) -> Result<()> {
        self.transport.delete_skill(&self.name, name)
    }
}
