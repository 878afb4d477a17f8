//! Data models for mindsdb-link.
//!
//! Wire request/response bodies plus the typed catalog snapshots produced by
//! [`Materialize`](crate::materialize::Materialize).

pub mod agent_info;
pub mod completion;
pub mod database_info;
pub mod handler_info;
pub mod ingest_request;
pub mod login_request;
pub mod ml_engine_info;
pub mod model_info;
pub mod query_request;
pub mod query_response;
pub mod skill_info;
pub mod status_response;
pub mod tabular_result;


pub use agent_info::{AgentEnvelope, AgentInfo, AgentPayload};
pub use completion::{AgentCompletion, CompletionMessage, CompletionRequest, CompletionResponse};
pub use database_info::{DatabaseInfo, TableInfo};
pub use handler_info::{HandlerInfo, HandlerKind};
pub use ingest_request::{IngestEnvelope, IngestRequest};
pub use login_request::LoginRequest;
pub use ml_engine_info::MlEngineInfo;
pub use model_info::ModelInfo;
pub use query_request::{QueryContext, QueryRequest, DEFAULT_SCHEMA};
pub use query_response::{QueryOutcome, QueryResponse};
pub use skill_info::{SkillEnvelope, SkillInfo, SkillKind, SkillPayload};
pub use status_response::StatusResponse;
pub use tabular_result::{Row, TabularResult};
