//! Trained model handle.

use serde_json::{Map, Value as JsonValue};
use std::time::{Duration, Instant};

use crate::ddl::{self, TrainingData};
use crate::error::{MindsLinkError, Result};
use crate::materialize::Materialize;
use crate::models::{ModelInfo, TabularResult};
use crate::query::render_literal;
use crate::query::{SelectBuilder, TableRef};
use crate::statement::Statement;
use crate::transport::Transport;

/// Input rows for a prediction
#[derive(Debug, Clone, PartialEq)]
pub enum PredictInput {
    /// Join the model against another statement's rows
    Query(Statement),

    /// A single row of feature values
    Row(Map<String, JsonValue>),
}

impl From<Statement> for PredictInput {
    fn from(statement: Statement) -> Self {
        Self::Query(statement)
    }
}

impl From<Map<String, JsonValue>> for PredictInput {
    fn from(row: Map<String, JsonValue>) -> Self {
        Self::Row(row)
    }
}

/// A model of a project, as of the last fetch.
///
/// The snapshot does not follow training progress on the server; call
/// [`refresh`](Self::refresh) or [`wait_complete`](Self::wait_complete).
#[derive(Debug, Clone)]
pub struct Model {
    transport: Transport,
    project: String,
    info: ModelInfo,
    pinned_version: Option<i64>,
}

impl Model {
    pub(crate) fn new(transport: Transport, project: &str, info: ModelInfo) -> Self {
        Self {
            transport,
            project: project.to_string(),
            info,
            pinned_version: None,
        }
    }

    /// Handle bound to one specific version
    pub(crate) fn pinned(mut self) -> Self {
        self.pinned_version = self.info.version;
        self
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    pub fn version(&self) -> Option<i64> {
        self.info.version
    }

    pub fn status(&self) -> Option<&str> {
        self.info.status.as_deref()
    }

    /// `project.model` or `project.model.version` for pinned handles
    pub fn identifier(&self) -> String {
        match self.pinned_version {
            Some(version) => format!("{}.{}.{}", self.project, self.info.name, version),
            None => format!("{}.{}", self.project, self.info.name),
        }
    }

    /// Render a prediction statement without running it
    pub fn predict_statement(
        &self,
        input: &PredictInput,
        params: &Map<String, JsonValue>,
    ) -> Result<Statement> {
        let using = ddl::render_using(params);
        let sql = match input {
            PredictInput::Row(row) => {
                if row.is_empty() {
                    return Err(MindsLinkError::validation(
                        "Prediction input requires at least one column",
                    ));
                }
                let clauses: Vec<String> = row
                    .iter()
                    .map(|(column, value)| format!("{} = {}", column, render_literal(value)))
                    .collect();
                format!(
                    "SELECT * FROM {} WHERE {}{};",
                    self.identifier(),
                    clauses.join(" AND "),
                    using
                )
            },
            PredictInput::Query(source) => format!(
                "SELECT m.* FROM ({}) AS t JOIN {} AS m{};",
                source.as_subquery(),
                self.identifier(),
                using
            ),
        };
        Ok(Statement::new(sql).with_schema(&self.project))
    }

    pub fn predict(&self, input: impl Into<PredictInput>) -> Result<TabularResult> {
        self.predict_with(input, &Map::new())
    }

    /// Predict with `USING` parameters
    pub fn predict_with(
        &self,
        input: impl Into<PredictInput>,
        params: &Map<String, JsonValue>,
    ) -> Result<TabularResult> {
        let statement = self.predict_statement(&input.into(), params)?;
        self.transport.fetch(&statement)
    }

    /// `DESCRIBE` the model or one of its attributes
    pub fn describe(&self, attribute: Option<&str>) -> Result<TabularResult> {
        let statement = ddl::describe_model(&self.project, &self.info.name, attribute)?;
        self.transport.fetch(&statement.with_schema(&self.project))
    }

    /// Train a new version, optionally on new data; returns the new snapshot
    pub fn retrain(
        &self,
        data: Option<&TrainingData>,
        options: &Map<String, JsonValue>,
    ) -> Result<Model> {
        let statement = ddl::retrain_model(&self.project, &self.info.name, false, data, options)?;
        self.transport.execute(&statement)?;
        self.latest()
    }

    /// Continue training on `data`; returns the new snapshot
    pub fn finetune(&self, data: &TrainingData, options: &Map<String, JsonValue>) -> Result<Model> {
        let statement =
            ddl::retrain_model(&self.project, &self.info.name, true, Some(data), options)?;
        self.transport.execute(&statement)?;
        self.latest()
    }

    /// Re-read this model (same version when pinned)
    pub fn refresh(&self) -> Result<Model> {
        let versions = list_model_rows(&self.transport, &self.project, Some(&self.info.name))?;
        let found = match self.pinned_version {
            Some(version) => versions.into_iter().find(|m| m.version == Some(version)),
            None => pick_current(versions),
        };
        let info = found.ok_or_else(|| MindsLinkError::not_found("Model doesn't exist"))?;
        Ok(Self {
            info,
            ..self.clone()
        })
    }

    /// Highest-numbered version
    fn latest(&self) -> Result<Model> {
        let versions = list_model_rows(&self.transport, &self.project, Some(&self.info.name))?;
        let info = versions
            .into_iter()
            .max_by_key(|m| m.version.unwrap_or(i64::MIN))
            .ok_or_else(|| MindsLinkError::not_found("Model doesn't exist"))?;
        Ok(Model::new(self.transport.clone(), &self.project, info))
    }

    /// All versions of this model
    pub fn list_versions(&self) -> Result<Vec<Model>> {
        let versions = list_model_rows(&self.transport, &self.project, Some(&self.info.name))?;
        Ok(versions
            .into_iter()
            .map(|info| Model::new(self.transport.clone(), &self.project, info).pinned())
            .collect())
    }

    /// Make `version` the one unversioned references resolve to
    pub fn set_active_version(&self, version: i64) -> Result<()> {
        let statement = Statement::new(format!(
            "UPDATE {}.models SET active = 1 WHERE name = '{}' AND version = {};",
            self.project, self.info.name, version
        ))
        .with_schema(&self.project);
        self.transport.execute(&statement)?;
        Ok(())
    }

    /// Block until training leaves the in-progress states.
    ///
    /// Polls every `interval`; fails with [`MindsLinkError::QueryError`] when
    /// training errors and with [`MindsLinkError::TransportError`] when
    /// `timeout` passes first.
    pub fn wait_complete(&self, interval: Duration, timeout: Duration) -> Result<Model> {
        let start = Instant::now();
        let mut current = self.refresh()?;
        loop {
            if current.info.is_complete() {
                return Ok(current);
            }
            if current.info.is_error() {
                return Err(MindsLinkError::QueryError(format!(
                    "Model training failed: {}",
                    current.info.error.clone().unwrap_or_default()
                )));
            }
            if start.elapsed() >= timeout {
                return Err(MindsLinkError::TransportError(format!(
                    "Model '{}' still '{}' after {:?}",
                    current.name(),
                    current.status().unwrap_or("unknown"),
                    timeout
                )));
            }
            log::debug!(
                "[MINDS_MODEL] Waiting for {} (status={:?})",
                current.identifier(),
                current.status()
            );
            std::thread::sleep(interval);
            current = current.refresh()?;
        }
    }
}

/// Rows of `project.models`, optionally for one model name
pub(crate) fn list_model_rows(
    transport: &Transport,
    project: &str,
    name: Option<&str>,
) -> Result<Vec<ModelInfo>> {
    let mut builder = SelectBuilder::new(TableRef::new(project, "models"));
    if let Some(name) = name {
        builder = builder.filter(&[&format!("name={}", name)])?;
    }
    let result = transport.fetch(&builder.to_statement())?;
    result
        .rows()
        .map(|row| ModelInfo::from_row(&row))
        .collect()
}

/// Active version if flagged, else the highest version
pub(crate) fn pick_current(versions: Vec<ModelInfo>) -> Option<ModelInfo> {
    if let Some(active) = versions.iter().find(|m| m.active) {
        return Some(active.clone());
    }
    versions
        .into_iter()
        .max_by_key(|m| m.version.unwrap_or(i64::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info(name: &str, version: i64, active: bool) -> ModelInfo {
        ModelInfo::from_json(&json!({"name": name, "version": version, "active": active})).unwrap()
    }

    fn model() -> Model {
        let transport = Transport::builder().build().unwrap();
        Model::new(transport, "proj", info("rentals", 2, true))
    }

    #[test]
    fn test_identifier() {
        let m = model();
        assert_eq!(m.identifier(), "proj.rentals");
        assert_eq!(m.pinned().identifier(), "proj.rentals.2");
    }

    #[test]
    fn test_predict_single_row() {
        let row = json!({"sqft": 900, "location": "good"}).as_object().cloned().unwrap();
        let stmt = model().predict_statement(&PredictInput::Row(row), &Map::new()).unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT * FROM proj.rentals WHERE sqft = 900 AND location = 'good';"
        );
        assert_eq!(stmt.schema(), Some("proj"));
    }

    #[test]
    fn test_predict_from_query_with_params() {
        let params = json!({"max_tokens": 100}).as_object().cloned().unwrap();
        let input = PredictInput::Query(Statement::new("SELECT * FROM pg.houses;"));
        let stmt = model().predict_statement(&input, &params).unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT m.* FROM (SELECT * FROM pg.houses) AS t JOIN proj.rentals AS m USING max_tokens = 100;"
        );
    }

    #[test]
    fn test_predict_empty_row_rejected() {
        let err = model()
            .predict_statement(&PredictInput::Row(Map::new()), &Map::new())
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_pick_current_prefers_active() {
        let picked = pick_current(vec![info("m", 1, true), info("m", 3, false)]).unwrap();
        assert_eq!(picked.version, Some(1));

        let picked = pick_current(vec![info("m", 1, false), info("m", 3, false)]).unwrap();
        assert_eq!(picked.version, Some(3));

        assert!(pick_current(vec![]).is_none());
    }
}
