use serde::{Deserialize, Serialize};

/// Login request body, in one of the two login dialects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LoginRequest {
    /// `POST /api/login`
    Managed { username: String, password: String },

    /// `POST /cloud/login`
    Cloud { email: String, password: String },
}
