use serde_json::Value;
use thiserror::Error;

use crate::auth::CredentialError;

/// Errors surfaced by the client. Transport failures are mapped into these
/// variants at the boundary so the classifier can match on them directly.
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("request timed out: {message}")]
    Timeout { message: String },

    #[error("request aborted: {message}")]
    Aborted { message: String },

    #[error("HTTP error {status}: {}", .status_text.as_deref().unwrap_or("unknown status"))]
    Http {
        status: u16,
        status_text: Option<String>,
        body: Option<Value>,
    },

    #[error("rate limit exceeded for {key}: {message}")]
    RateLimited { key: String, message: String },

    #[error("failed to deserialize response: {0}")]
    Deserialization(String),

    #[error("failed to serialize request body: {0}")]
    Serialization(String),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("{0}")]
    Unknown(String),
}

impl ClientError {
    /// HTTP status carried by the error, if any. Rate limiting is reported as 429.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Response body the server sent along with an HTTP error.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ClientError::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Message of the underlying failure without the variant prefix.
    pub fn raw_message(&self) -> String {
        match self {
            ClientError::Network { message }
            | ClientError::Timeout { message }
            | ClientError::Aborted { message }
            | ClientError::RateLimited { message, .. } => message.clone(),
            ClientError::Deserialization(message)
            | ClientError::Serialization(message)
            | ClientError::Unknown(message) => message.clone(),
            ClientError::Http { .. } | ClientError::Credentials(_) => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            ClientError::Timeout { message }
        } else if err.is_connect() || err.is_request() {
            ClientError::Network { message }
        } else if err.is_decode() {
            ClientError::Deserialization(message)
        } else if let Some(status) = err.status() {
            ClientError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().map(str::to_string),
                body: None,
            }
        } else {
            ClientError::Unknown(message)
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
