//! Authenticated HTTP transport.
//!
//! [`Transport`] owns the session (a blocking `reqwest` client with a cookie
//! store), the credentials and the base URL. It executes statements against
//! `/api/sql/query` and performs the handful of REST operations the server
//! does not expose through SQL (agents, skills, knowledge base ingestion,
//! file upload, status).

use crate::{
    auth::{Credentials, LoginMode, MANAGED_LOGIN_PATH},
    error::{MindsLinkError, Result},
    models::{
        AgentCompletion, AgentEnvelope, AgentInfo, CompletionMessage, CompletionRequest,
        CompletionResponse, IngestEnvelope, QueryOutcome, QueryRequest, QueryResponse, SkillInfo,
        StatusResponse, TabularResult,
    },
    materialize::Materialize,
    statement::Statement,
    timeouts::LinkTimeouts,
};
use log::{debug, warn};
use reqwest::{
    blocking::{multipart, Client, RequestBuilder, Response},
    header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT},
    Method, Url,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use std::time::Instant;

/// Base URL used when none is configured and a login is given
pub const CLOUD_URL: &str = "https://cloud.mindsdb.com";

/// Base URL used when none is configured and no login is given
pub const LOCAL_URL: &str = "http://127.0.0.1:47334";

const QUERY_PATH: &str = "/api/sql/query";

/// Client identifier sent with every request unless the caller overrides it
pub fn default_user_agent() -> String {
    format!("mindsdb-link-rust/{}", crate::VERSION)
}

/// One logical connection to a MindsDB server.
///
/// Cloning is cheap and clones share the cookie store, so a login performed
/// through one clone is visible to all of them. The session is meant for one
/// logical caller at a time; every call blocks until the round-trip ends.
///
/// # Examples
///
/// ```rust,no_run
/// use mindsdb_link::{Credentials, Statement, Transport};
///
/// # fn example() -> mindsdb_link::Result<()> {
/// let transport = Transport::builder()
///     .base_url("http://127.0.0.1:47334")
///     .credentials(Credentials::user_password("mindsdb", "secret"))
///     .managed(true)
///     .connect()?;
///
/// let rows = transport.fetch(&Statement::new("SELECT * FROM models;"))?;
/// println!("{} models", rows.row_count());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Transport {
    base_url: Url,
    http_client: Client,
    credentials: Credentials,
    login_mode: LoginMode,
    timeouts: LinkTimeouts,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .field("login_mode", &self.login_mode)
            .finish()
    }
}

impl Transport {
    pub fn builder() -> TransportBuilder {
        TransportBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn login_mode(&self) -> LoginMode {
        self.login_mode
    }

    pub fn timeouts(&self) -> &LinkTimeouts {
        &self.timeouts
    }

    /// Establish the session.
    ///
    /// API-key and anonymous modes make no network call. Password logins post
    /// to the endpoint of the configured [`LoginMode`]; a cloud login answered
    /// with 404 or 405 is retried once against the managed endpoint with the
    /// same credentials.
    pub fn authenticate(&self) -> Result<()> {
        let (login, password) = match &self.credentials {
            Credentials::ApiKey(_) => {
                debug!("[MINDS_AUTH] Using API key header, no login request");
                return Ok(());
            },
            Credentials::None => {
                debug!("[MINDS_AUTH] No credentials configured");
                return Ok(());
            },
            Credentials::UserPassword { login, password } => (login, password),
        };

        let start = Instant::now();
        let mut response = self.post_login(self.login_mode, login, password)?;

        if self.login_mode.should_fall_back(response.status()) {
            debug!(
                "[MINDS_AUTH] Cloud login answered {}, retrying at {}",
                response.status(),
                MANAGED_LOGIN_PATH
            );
            response = self.post_login(LoginMode::Managed, login, password)?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            warn!("[MINDS_AUTH] Login failed: status={} body=\"{}\"", status, body);
            return Err(MindsLinkError::AuthenticationError {
                status_code: status.as_u16(),
                message: body,
            });
        }

        debug!(
            "[MINDS_AUTH] Authenticated '{}' in {:?}",
            login,
            start.elapsed()
        );
        Ok(())
    }

    fn post_login(&self, mode: LoginMode, login: &str, password: &str) -> Result<Response> {
        let url = self.endpoint(&[mode.login_path()])?;
        debug!("[MINDS_AUTH] POST {} as '{}'", url, login);
        let response = self
            .http_client
            .post(url)
            .json(&mode.login_request(login, password))
            .send()?;
        Ok(response)
    }

    /// Execute a statement.
    ///
    /// Returns `Some` for `"table"` responses and `None` for statements that
    /// produce no rows. A server-side error surfaces as
    /// [`MindsLinkError::QueryError`] with the server's message; HTTP and
    /// decoding problems surface as transport errors. Nothing is retried.
    pub fn execute(&self, statement: &Statement) -> Result<Option<TabularResult>> {
        let request = QueryRequest::new(statement.sql(), statement.schema());
        debug!(
            "[MINDS_QUERY] Starting query: \"{}\" db={}",
            statement.preview(),
            request.context.db
        );

        let overall_start = Instant::now();
        let url = self.endpoint(&[QUERY_PATH])?;
        let response = self.dispatch(self.request(Method::POST, url).json(&request))?;

        let body = response.text()?;
        let parsed: QueryResponse = serde_json::from_str(&body).map_err(|e| {
            MindsLinkError::TransportError(format!("Malformed query response: {}", e))
        })?;

        let outcome = parsed.into_outcome();
        debug!(
            "[MINDS_QUERY] Finished in {}ms",
            overall_start.elapsed().as_millis()
        );

        match outcome {
            Ok(QueryOutcome::Table(table)) => Ok(Some(table)),
            Ok(QueryOutcome::NoRows(kind)) => {
                debug!("[MINDS_QUERY] No rows (type={})", kind);
                Ok(None)
            },
            Err(err) => {
                warn!("[MINDS_QUERY] {}", err);
                Err(err)
            },
        }
    }

    /// Execute and treat "no rows" as an empty result
    pub fn fetch(&self, statement: &Statement) -> Result<TabularResult> {
        Ok(self.execute(statement)?.unwrap_or_else(TabularResult::empty))
    }

    /// Like [`fetch`](Self::fetch) with every column name lowercased
    pub fn fetch_lowercase(&self, statement: &Statement) -> Result<TabularResult> {
        self.fetch(statement)?.to_lowercase_columns()
    }

    // ── Agents ───────────────────────────────────────────────────────────────

    pub fn list_agents(&self, project: &str) -> Result<Vec<AgentInfo>> {
        let items: Vec<JsonValue> =
            self.get_json(&["api", "projects", project, "agents"])?;
        items.iter().map(AgentInfo::from_json).collect()
    }

    pub fn get_agent(&self, project: &str, name: &str) -> Result<AgentInfo> {
        let body: JsonValue = self.get_json(&["api", "projects", project, "agents", name])?;
        AgentInfo::from_json(&body)
    }

    pub fn create_agent(&self, project: &str, agent: &AgentInfo) -> Result<AgentInfo> {
        let body: JsonValue = self.send_json(
            Method::POST,
            &["api", "projects", project, "agents"],
            &agent.to_create_request(),
        )?;
        AgentInfo::from_json(&body)
    }

    pub fn update_agent(
        &self,
        project: &str,
        name: &str,
        update: &AgentEnvelope,
    ) -> Result<AgentInfo> {
        let body: JsonValue =
            self.send_json(Method::PUT, &["api", "projects", project, "agents", name], update)?;
        AgentInfo::from_json(&body)
    }

    pub fn delete_agent(&self, project: &str, name: &str) -> Result<()> {
        self.delete(&["api", "projects", project, "agents", name])
    }

    pub fn agent_completion(
        &self,
        project: &str,
        name: &str,
        messages: Vec<CompletionMessage>,
    ) -> Result<AgentCompletion> {
        let response: CompletionResponse = self.send_json(
            Method::POST,
            &["api", "projects", project, "agents", name, "completions"],
            &CompletionRequest { messages },
        )?;
        Ok(response.message)
    }

    // ── Skills ───────────────────────────────────────────────────────────────

    pub fn list_skills(&self, project: &str) -> Result<Vec<SkillInfo>> {
        let items: Vec<JsonValue> = self.get_json(&["api", "projects", project, "skills"])?;
        items.iter().map(SkillInfo::from_json).collect()
    }

    pub fn get_skill(&self, project: &str, name: &str) -> Result<SkillInfo> {
        let body: JsonValue = self.get_json(&["api", "projects", project, "skills", name])?;
        SkillInfo::from_json(&body)
    }

    pub fn create_skill(&self, project: &str, skill: &SkillInfo) -> Result<SkillInfo> {
        let body: JsonValue = self.send_json(
            Method::POST,
            &["api", "projects", project, "skills"],
            &skill.to_request(),
        )?;
        SkillInfo::from_json(&body)
    }

    /// Replace the skill stored under `name` with `skill`
    pub fn update_skill(&self, project: &str, name: &str, skill: &SkillInfo) -> Result<SkillInfo> {
        let body: JsonValue = self.send_json(
            Method::PUT,
            &["api", "projects", project, "skills", name],
            &skill.to_request(),
        )?;
        SkillInfo::from_json(&body)
    }

    pub fn delete_skill(&self, project: &str, name: &str) -> Result<()> {
        self.delete(&["api", "projects", project, "skills", name])
    }

    // ── Knowledge base ingestion and files ──────────────────────────────────

    pub fn insert_files_into_knowledge_base(
        &self,
        project: &str,
        knowledge_base: &str,
        files: Vec<String>,
    ) -> Result<()> {
        self.put_knowledge_base(project, knowledge_base, &IngestEnvelope::files(files))
    }

    pub fn insert_webpages_into_knowledge_base(
        &self,
        project: &str,
        knowledge_base: &str,
        urls: Vec<String>,
        crawl_depth: u32,
        filters: Vec<String>,
    ) -> Result<()> {
        self.put_knowledge_base(
            project,
            knowledge_base,
            &IngestEnvelope::webpages(urls, crawl_depth, filters),
        )
    }

    fn put_knowledge_base(&self, project: &str, name: &str, body: &IngestEnvelope) -> Result<()> {
        let url = self.endpoint(&["api", "projects", project, "knowledge_bases", name])?;
        self.dispatch(self.request(Method::PUT, url).json(body))?;
        Ok(())
    }

    /// Upload raw file content under `name` (multipart `PUT /api/files/{name}`)
    pub fn upload_file(&self, name: &str, file_name: &str, content: Vec<u8>) -> Result<()> {
        let part = multipart::Part::bytes(content).file_name(file_name.to_string());
        let form = multipart::Form::new()
            .text("original_file_name", file_name.to_string())
            .text("name", name.to_string())
            .text("source_type", "file")
            .part("file", part);

        let url = self.endpoint(&["api", "files", name])?;
        self.dispatch(self.request(Method::PUT, url).multipart(form))?;
        Ok(())
    }

    /// Server status and version
    pub fn status(&self) -> Result<StatusResponse> {
        self.get_json(&["api", "status"])
    }

    /// Drop this handle. Clones held by projects, tables, models and other
    /// handles share the session and keep it open until they are dropped too.
    pub fn close(self) {
        debug!("[MINDS_HTTP] Dropping session handle for {}", self.base_url);
    }

    // ── Plumbing ─────────────────────────────────────────────────────────────

    /// Join path segments onto the base URL, percent-encoding each one.
    /// A segment with leading `/` is split on `/` first.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                MindsLinkError::ConfigurationError(format!(
                    "Base URL cannot carry a path: {}",
                    self.base_url
                ))
            })?;
            path.pop_if_empty();
            for segment in segments {
                if segment.starts_with('/') {
                    path.extend(segment.split('/').filter(|s| !s.is_empty()));
                } else {
                    path.push(segment);
                }
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.credentials
            .apply_to_request(self.http_client.request(method, url))
    }

    /// Send and turn non-2xx into [`MindsLinkError::ServerError`]
    fn dispatch(&self, builder: RequestBuilder) -> Result<Response> {
        let start = Instant::now();
        let response = builder.send().map_err(|e| {
            warn!("[MINDS_HTTP] Request failed: {} duration_ms={}", e, start.elapsed().as_millis());
            MindsLinkError::from(e)
        })?;

        let status = response.status();
        debug!(
            "[MINDS_HTTP] {} {} duration_ms={}",
            status,
            response.url().path(),
            start.elapsed().as_millis()
        );

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().unwrap_or_else(|_| "Unknown error".to_string());
        let message = format!(
            "{}: {}",
            status.canonical_reason().unwrap_or("HTTP error"),
            text
        );
        warn!("[MINDS_HTTP] Server error: status={} message=\"{}\"", status, message);
        Err(MindsLinkError::ServerError {
            status_code: status.as_u16(),
            message,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        debug!("[MINDS_REST] GET {}", url.path());
        let response = self.dispatch(self.request(Method::GET, url))?;
        Ok(response.json::<T>()?)
    }

    fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        debug!("[MINDS_REST] {} {}", method, url.path());
        let response = self.dispatch(self.request(method, url).json(body))?;
        Ok(response.json::<T>()?)
    }

    fn delete(&self, segments: &[&str]) -> Result<()> {
        let url = self.endpoint(segments)?;
        debug!("[MINDS_REST] DELETE {}", url.path());
        self.dispatch(self.request(Method::DELETE, url))?;
        Ok(())
    }
}

/// Builder for configuring [`Transport`] instances.
pub struct TransportBuilder {
    base_url: Option<String>,
    credentials: Credentials,
    login_mode: LoginMode,
    headers: Vec<(String, String)>,
    timeouts: LinkTimeouts,
}

impl TransportBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            credentials: Credentials::None,
            login_mode: LoginMode::default(),
            headers: Vec::new(),
            timeouts: LinkTimeouts::default(),
        }
    }

    /// Server URL; defaults to the cloud service when a login is configured,
    /// otherwise to a local instance
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Shorthand for username/password credentials
    pub fn login(self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials(Credentials::user_password(login, password))
    }

    pub fn api_key(self, key: impl Into<String>) -> Self {
        self.credentials(Credentials::api_key(key))
    }

    /// `true` selects the managed login dialect
    pub fn managed(mut self, is_managed: bool) -> Self {
        self.login_mode = LoginMode::from_managed(is_managed);
        self
    }

    pub fn login_mode(mut self, mode: LoginMode) -> Self {
        self.login_mode = mode;
        self
    }

    /// Extra header sent with every request; wins over built-in defaults
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn timeouts(mut self, timeouts: LinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Build without contacting the server
    pub fn build(self) -> Result<Transport> {
        let raw_url = match self.base_url {
            Some(url) => url,
            None if matches!(self.credentials, Credentials::UserPassword { .. }) => {
                CLOUD_URL.to_string()
            },
            None => LOCAL_URL.to_string(),
        };
        let base_url = Url::parse(raw_url.trim_end_matches('/')).map_err(|e| {
            MindsLinkError::ConfigurationError(format!("Invalid base URL '{}': {}", raw_url, e))
        })?;

        let mut default_headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&default_user_agent())
            .map_err(|e| MindsLinkError::ConfigurationError(e.to_string()))?;
        default_headers.insert(USER_AGENT, agent);

        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                MindsLinkError::ConfigurationError(format!("Invalid header name '{}': {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                MindsLinkError::ConfigurationError(format!(
                    "Invalid value for header '{}': {}",
                    name, e
                ))
            })?;
            default_headers.insert(name, value);
        }

        let http_client = Client::builder()
            .cookie_store(true)
            .default_headers(default_headers)
            .connect_timeout(self.timeouts.connection_timeout)
            .timeout(self.timeouts.request_timeout)
            .build()
            .map_err(|e| MindsLinkError::ConfigurationError(e.to_string()))?;

        debug!(
            "[MINDS_HTTP] Transport ready for {} (mode={:?}, authenticated={})",
            base_url,
            self.login_mode,
            self.credentials.is_authenticated()
        );

        Ok(Transport {
            base_url,
            http_client,
            credentials: self.credentials,
            login_mode: self.login_mode,
            timeouts: self.timeouts,
        })
    }

    /// Build and authenticate
    pub fn connect(self) -> Result<Transport> {
        let transport = self.build()?;
        transport.authenticate()?;
        Ok(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url_without_login_is_local() {
        let transport = Transport::builder().build().unwrap();
        assert_eq!(transport.base_url(), LOCAL_URL);
    }

    #[test]
    fn test_default_url_with_login_is_cloud() {
        let transport = Transport::builder().login("a@b.c", "pw").build().unwrap();
        assert_eq!(transport.base_url(), CLOUD_URL);
        assert_eq!(transport.login_mode(), LoginMode::Cloud);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let transport = Transport::builder()
            .base_url("http://localhost:47334/")
            .build()
            .unwrap();
        assert_eq!(transport.base_url(), "http://localhost:47334");
        let url = transport.endpoint(&[QUERY_PATH]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:47334/api/sql/query");
    }

    #[test]
    fn test_endpoint_encodes_names() {
        let transport = Transport::builder()
            .base_url("http://localhost:47334/prefix")
            .build()
            .unwrap();
        let url = transport
            .endpoint(&["api", "projects", "my proj", "agents"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:47334/prefix/api/projects/my%20proj/agents");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = Transport::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, MindsLinkError::ConfigurationError(_)));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let err = Transport::builder()
            .header("bad header", "x")
            .build()
            .unwrap_err();
        assert!(matches!(err, MindsLinkError::ConfigurationError(_)));
    }

    #[test]
    fn test_api_key_authenticate_is_offline() {
        // Port 9 (discard) is never contacted in API-key mode
        let transport = Transport::builder()
            .base_url("http://127.0.0.1:9")
            .api_key("mdb_key")
            .build()
            .unwrap();
        assert!(transport.authenticate().is_ok());
    }

    #[test]
    fn test_debug_hides_password() {
        let transport = Transport::builder().login("alice", "hunter2").build().unwrap();
        assert!(!format!("{:?}", transport).contains("hunter2"));
    }
}
