//! Connection settings file
//!
//! # Configuration Format
//!
//! ```toml
//! [server]
//! url = "http://127.0.0.1:47334"  # omit for cloud (with login) or local (without)
//! timeout = 120                   # request timeout in seconds
//! managed = false                 # true for the managed login dialect
//!
//! [auth]
//! login = "user@example.com"
//! password = "secret"
//! # api_key = "..."              # used instead of login/password when set
//!
//! [headers]
//! X-Team = "analytics"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::Credentials;
use crate::error::{MindsLinkError, Result};
use crate::server::Server;
use crate::timeouts::LinkTimeouts;
use crate::transport::TransportBuilder;

pub const ENV_URL: &str = "MINDSDB_URL";
pub const ENV_LOGIN: &str = "MINDSDB_LOGIN";
pub const ENV_PASSWORD: &str = "MINDSDB_PASSWORD";
pub const ENV_API_KEY: &str = "MINDSDB_API_KEY";

/// Settings loaded from a TOML file and/or the environment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkConfig {
    pub server: Option<ServerConfig>,

    pub auth: Option<AuthConfig>,

    /// Extra headers sent with every request
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub managed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    pub login: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
}

fn default_timeout() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: default_timeout(),
            managed: false,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            server: Some(ServerConfig::default()),
            auth: None,
            headers: BTreeMap::new(),
        }
    }
}

pub fn expand_config_path(path: &Path) -> PathBuf {
    let path_str = path.to_str().unwrap_or("~/.mindsdb/link.toml");
    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(rest);
        }
    }
    path.to_path_buf()
}

pub fn default_config_path() -> PathBuf {
    expand_config_path(Path::new("~/.mindsdb/link.toml"))
}

impl LinkConfig {
    /// Load configuration from file
    ///
    /// Returns the default configuration if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        let path = expand_config_path(path);
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            MindsLinkError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let path = expand_config_path(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| {
            MindsLinkError::ConfigurationError(format!("Failed to serialize: {}", e))
        })?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Overlay `MINDSDB_URL`, `MINDSDB_LOGIN`, `MINDSDB_PASSWORD` and
    /// `MINDSDB_API_KEY` from the process environment
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`; empty values are ignored
    pub fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(url) = get(ENV_URL) {
            self.server.get_or_insert_with(ServerConfig::default).url = Some(url);
        }
        let auth = self.auth.get_or_insert_with(AuthConfig::default);
        if let Some(login) = get(ENV_LOGIN) {
            auth.login = Some(login);
        }
        if let Some(password) = get(ENV_PASSWORD) {
            auth.password = Some(password);
        }
        if let Some(key) = get(ENV_API_KEY) {
            auth.api_key = Some(key);
        }
        if *auth == AuthConfig::default() {
            self.auth = None;
        }
        self
    }

    pub fn resolved_server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// Credentials implied by `[auth]`; an API key wins over a login
    pub fn credentials(&self) -> Result<Credentials> {
        let Some(auth) = &self.auth else {
            return Ok(Credentials::None);
        };
        if let Some(key) = &auth.api_key {
            return Ok(Credentials::api_key(key.clone()));
        }
        match (&auth.login, &auth.password) {
            (Some(login), Some(password)) => {
                Ok(Credentials::user_password(login.clone(), password.clone()))
            },
            (Some(_), None) => Err(MindsLinkError::ConfigurationError(
                "auth.login is set but auth.password is missing".into(),
            )),
            _ => Ok(Credentials::None),
        }
    }

    /// Transport builder carrying every setting of this configuration
    pub fn to_transport_builder(&self) -> Result<TransportBuilder> {
        let server = self.resolved_server();
        let timeouts = LinkTimeouts::builder()
            .request_timeout(Duration::from_secs(server.timeout))
            .build();

        let mut builder = crate::transport::Transport::builder()
            .credentials(self.credentials()?)
            .managed(server.managed)
            .timeouts(timeouts)
            .headers(self.headers.clone());
        if let Some(url) = server.url {
            builder = builder.base_url(url);
        }
        Ok(builder)
    }

    /// Build, authenticate and wrap in a [`Server`]
    pub fn connect(&self) -> Result<Server> {
        Server::connect(self.to_transport_builder()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LoginMode;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = LinkConfig::default();
        let server = config.server.as_ref().unwrap();
        assert_eq!(server.url, None);
        assert_eq!(server.timeout, 120);
        assert!(!server.managed);
        assert!(config.auth.is_none());
    }

    #[test]
    fn test_parse_full_file() {
        let config = LinkConfig::from_toml_str(
            r#"
            [server]
            url = "http://db.internal:47334"
            timeout = 30
            managed = true

            [auth]
            login = "mindsdb"
            password = "pw"

            [headers]
            X-Team = "analytics"
            "#,
        )
        .unwrap();

        let server = config.resolved_server();
        assert_eq!(server.url.as_deref(), Some("http://db.internal:47334"));
        assert_eq!(server.timeout, 30);
        assert!(server.managed);
        assert_eq!(config.headers.get("X-Team").map(String::as_str), Some("analytics"));

        let transport = config.to_transport_builder().unwrap().build().unwrap();
        assert_eq!(transport.base_url(), "http://db.internal:47334");
        assert_eq!(transport.login_mode(), LoginMode::Managed);
        assert_eq!(transport.timeouts().request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = LinkConfig::from_toml_str("[server]\n").unwrap();
        assert_eq!(config.resolved_server().timeout, 120);
        assert!(config.headers.is_empty());
        assert!(matches!(config.credentials().unwrap(), Credentials::None));
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let err = LinkConfig::from_toml_str("[server\nurl = ").unwrap_err();
        assert!(matches!(err, MindsLinkError::ConfigurationError(_)));
    }

    #[test]
    fn test_api_key_wins_over_login() {
        let config = LinkConfig {
            auth: Some(AuthConfig {
                login: Some("a".into()),
                password: Some("b".into()),
                api_key: Some("k".into()),
            }),
            ..Default::default()
        };
        assert!(matches!(config.credentials().unwrap(), Credentials::ApiKey(k) if k == "k"));
    }

    #[test]
    fn test_login_without_password_rejected() {
        let config = LinkConfig {
            auth: Some(AuthConfig {
                login: Some("a".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.credentials().unwrap_err(),
            MindsLinkError::ConfigurationError(_)
        ));
    }

    #[test]
    fn test_apply_vars_overlays() {
        let vars: HashMap<&str, &str> = [
            (ENV_URL, "https://example.test"),
            (ENV_LOGIN, "user@example.test"),
            (ENV_PASSWORD, "pw"),
            (ENV_API_KEY, ""),
        ]
        .into_iter()
        .collect();

        let config = LinkConfig::default().apply_vars(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.resolved_server().url.as_deref(), Some("https://example.test"));
        let auth = config.auth.as_ref().unwrap();
        assert_eq!(auth.login.as_deref(), Some("user@example.test"));
        // empty values are ignored
        assert_eq!(auth.api_key, None);
    }

    #[test]
    fn test_apply_vars_without_values_leaves_auth_empty() {
        let config = LinkConfig::default().apply_vars(|_| None);
        assert!(config.auth.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("link.toml");

        let mut config = LinkConfig::default();
        config.headers.insert("X-Team".into(), "ml".into());
        config.save(&path).unwrap();

        let loaded = LinkConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = LinkConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, LinkConfig::default());
    }
}
