use thiserror::Error;

/// Failures surfaced by the login flow, the token exchange and the token manager.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization server error (status {status}): {message}")]
    AuthServer { status: u16, message: String },
    #[error("Device code expired")]
    DeviceCodeExpired,
    #[error("Access denied")]
    AccessDenied,
    #[error("GitHub credential rejected")]
    InvalidCredential,
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    /// Build an [`AuthError::AuthServer`] from a non-success HTTP status.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        Self::AuthServer {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    /// Whether the caller has to run the device flow again before retrying.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::InvalidCredential | Self::Unauthenticated)
    }

    /// Message suitable for printing to the person driving the login.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthServer { status, message } if message.is_empty() => {
                format!("Authorization server returned status {status}.")
            }
            Self::AuthServer { message, .. } => message.clone(),
            Self::DeviceCodeExpired => "Device code expired. Please try again.".to_string(),
            Self::AccessDenied => "Access denied by user.".to_string(),
            Self::InvalidCredential => {
                "GitHub token is invalid or expired. Please login again.".to_string()
            }
            Self::Unauthenticated => {
                "Not authenticated. Please run the login flow first or provide a GitHub token."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for AuthError {
    fn from(error: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(error.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderName> for AuthError {
    fn from(error: reqwest::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(error.to_string())
    }
}
