//! Error types for mindsdb-link.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants
//! separate client-side validation problems from server-side statement errors
//! and from transport/connectivity failures, so callers can tell a bad SQL
//! statement apart from a dropped connection.

use thiserror::Error;

/// Result type for mindsdb-link operations
pub type Result<T> = std::result::Result<T, MindsLinkError>;

/// Errors raised by the client library
#[derive(Error, Debug)]
pub enum MindsLinkError {
    /// A login attempt (including the cloud → managed fallback) was rejected
    #[error("Authentication failed ({status_code}): {message}")]
    AuthenticationError { status_code: u16, message: String },

    /// Network-level failure or a response body that could not be understood
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The server answered with a non-2xx HTTP status
    #[error("Server error ({status_code}): {message}")]
    ServerError { status_code: u16, message: String },

    /// The server executed the statement and reported `type: "error"`
    #[error("Query error: {0}")]
    QueryError(String),

    /// Client-side input rejected before any network call
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A named lookup produced no match
    #[error("{0}")]
    NotFound(String),

    /// Invalid client or config file settings
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// JSON encode/decode failure on a value the caller supplied
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl MindsLinkError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// True for failures caused by connectivity or HTTP status rather than
    /// by the statement itself.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportError(_) | Self::ServerError { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// HTTP status carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::AuthenticationError { status_code, .. }
            | Self::ServerError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MindsLinkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::TransportError(format!("Malformed response body: {}", err))
        } else {
            Self::TransportError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MindsLinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for MindsLinkError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigurationError(format!("TOML parse error: {}", err))
    }
}

impl From<std::io::Error> for MindsLinkError {
    fn from(err: std::io::Error) -> Self {
        Self::ConfigurationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MindsLinkError::QueryError("Table 't' not found".into());
        assert_eq!(err.to_string(), "Query error: Table 't' not found");

        let err = MindsLinkError::NotFound("Project doesn't exist".into());
        assert_eq!(err.to_string(), "Project doesn't exist");

        let err = MindsLinkError::AuthenticationError {
            status_code: 401,
            message: "bad password".into(),
        };
        assert_eq!(err.to_string(), "Authentication failed (401): bad password");
    }

    #[test]
    fn test_error_classification() {
        let server = MindsLinkError::ServerError {
            status_code: 500,
            message: "boom".into(),
        };
        assert!(server.is_transport());
        assert_eq!(server.status_code(), Some(500));

        assert!(!MindsLinkError::QueryError("x".into()).is_transport());
        assert!(MindsLinkError::validation("x").is_validation());
        assert!(MindsLinkError::not_found("x").is_not_found());
    }
}
