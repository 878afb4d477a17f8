//! # mindsdb-link: MindsDB Client Library
//!
//! Blocking client for MindsDB servers. Builds SQL through immutable fluent
//! builders, executes it over an authenticated HTTP session and turns the
//! tabular responses into typed catalog entities.
//!
//! ## Features
//!
//! - **Query Builders**: copy-on-write `SELECT`/`INSERT`/`UPDATE`/`DELETE` rendering
//! - **Authentication**: cloud and managed login (with cloud → managed fallback) or API key
//! - **Knowledge Bases**: semantic search plus file and webpage ingestion
//! - **Catalog Entities**: projects, databases, tables, views, models, agents, skills
//! - **Configuration**: TOML file with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mindsdb_link::{Server, Transport};
//!
//! fn main() -> mindsdb_link::Result<()> {
//!     let server = Server::connect(
//!         Transport::builder()
//!             .base_url("http://127.0.0.1:47334")
//!             .login("mindsdb", "secret")
//!             .managed(true),
//!     )?;
//!
//!     let db = server.get_database("example_db")?;
//!     let rows = db
//!         .table("home_rentals")
//!         .filter(&["location=great"])?
//!         .limit(5)
//!         .fetch()?;
//!
//!     for row in rows.rows() {
//!         println!("{:?}", row.get("rental_price"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! ```rust,no_run
//! use mindsdb_link::Transport;
//!
//! # fn example() -> mindsdb_link::Result<()> {
//! // Cloud login; falls back to the managed endpoint when the server lacks it
//! let transport = Transport::builder().login("me@example.com", "pw").connect()?;
//!
//! // API key, no login round-trip
//! let transport = Transport::builder()
//!     .base_url("https://mindsdb.example.com")
//!     .api_key("your-api-key")
//!     .connect()?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod auth;
pub mod config;
pub mod database;
pub mod ddl;
pub mod error;
pub mod knowledge_base;
pub mod materialize;
pub mod model;
pub mod models;
pub mod project;
pub mod query;
pub mod server;
pub mod statement;
pub mod table;
pub mod timeouts;
pub mod transport;

// Re-export main types for convenience
pub use agent::Agent;
pub use auth::{Credentials, LoginMode};
pub use config::LinkConfig;
pub use database::Database;
pub use ddl::{KnowledgeBaseSpec, ModelSpec, TimeseriesOptions, TrainingData};
pub use error::{MindsLinkError, Result};
pub use knowledge_base::KnowledgeBase;
pub use materialize::{normalize_bool, FieldSource, Materialize};
pub use model::{Model, PredictInput};
pub use models::{
    AgentCompletion, AgentInfo, CompletionMessage, DatabaseInfo, HandlerInfo, HandlerKind,
    MlEngineInfo, ModelInfo, Row, SkillInfo, SkillKind, StatusResponse, TableInfo, TabularResult,
};
pub use project::Project;
pub use query::{Filter, InsertSource, RawTarget, SelectBuilder, TableRef, Target};
pub use server::Server;
pub use statement::Statement;
pub use table::Table;
pub use timeouts::LinkTimeouts;
pub use transport::{Transport, TransportBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
