//! Authentication settings for a MindsDB connection.
//!
//! Exactly one [`Credentials`] mode is active per [`Transport`](crate::Transport)
//! and it never changes after construction. API keys travel as a header on
//! every request; username/password credentials are exchanged once for a
//! session cookie held by the transport's cookie store.

use crate::models::LoginRequest;

/// Header carrying the API key in API-key mode
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Login endpoint for self-hosted ("managed") instances
pub const MANAGED_LOGIN_PATH: &str = "/api/login";

/// Login endpoint for the cloud service
pub const CLOUD_LOGIN_PATH: &str = "/cloud/login";

/// Authentication credentials for a MindsDB server.
///
/// # Examples
///
/// ```rust
/// use mindsdb_link::Credentials;
///
/// let creds = Credentials::user_password("alice@example.com", "secret");
/// let creds = Credentials::api_key("mdb_...");
/// let creds = Credentials::none();
/// ```
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Login (username or email) and password
    UserPassword { login: String, password: String },

    /// Static API key sent as `X-Api-Key`
    ApiKey(String),

    /// No authentication (local instance)
    None,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserPassword { login, .. } => f
                .debug_struct("UserPassword")
                .field("login", login)
                .field("password", &"***")
                .finish(),
            Self::ApiKey(_) => f.debug_tuple("ApiKey").field(&"***").finish(),
            Self::None => write!(f, "None"),
        }
    }
}

impl Credentials {
    pub fn user_password(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self::UserPassword {
            login: login.into(),
            password: password.into(),
        }
    }

    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(key.into())
    }

    pub fn none() -> Self {
        Self::None
    }

    /// Check if any credentials are configured
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Attach per-request authentication headers.
    ///
    /// Only API-key mode adds a header; password logins rely on the session
    /// cookie set during [`Transport::authenticate`](crate::Transport::authenticate).
    pub(crate) fn apply_to_request(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match self {
            Self::ApiKey(key) => request.header(API_KEY_HEADER, key),
            Self::UserPassword { .. } | Self::None => request,
        }
    }
}

/// Which login dialect a password login speaks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMode {
    /// Self-hosted instance: `POST /api/login` with `username`
    Managed,

    /// Cloud service: `POST /cloud/login` with `email`, falling back to the
    /// managed endpoint on 404/405
    #[default]
    Cloud,
}

impl LoginMode {
    pub fn from_managed(is_managed: bool) -> Self {
        if is_managed {
            Self::Managed
        } else {
            Self::Cloud
        }
    }

    pub fn login_path(&self) -> &'static str {
        match self {
            Self::Managed => MANAGED_LOGIN_PATH,
            Self::Cloud => CLOUD_LOGIN_PATH,
        }
    }

    /// Build the login body in this dialect
    pub fn login_request(&self, login: &str, password: &str) -> LoginRequest {
        match self {
            Self::Managed => LoginRequest::Managed {
                username: login.to_string(),
                password: password.to_string(),
            },
            Self::Cloud => LoginRequest::Cloud {
                email: login.to_string(),
                password: password.to_string(),
            },
        }
    }

    /// Status codes that send a cloud login to the managed endpoint instead
    pub(crate) fn should_fall_back(&self, status: reqwest::StatusCode) -> bool {
        matches!(self, Self::Cloud)
            && matches!(
                status,
                reqwest::StatusCode::NOT_FOUND | reqwest::StatusCode::METHOD_NOT_ALLOWED
            )
    }
}
