//! Classify transport failures into retry categories.

use serde::Serialize;
use strum_macros::Display;

use crate::error::ClientError;

/// Status codes worth retrying: request timeout, throttling and transient
/// upstream failures.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

const NETWORK_MESSAGE: &str = "network connection failed";
const TIMEOUT_MESSAGE: &str = "request timed out";
const ABORT_MESSAGE: &str = "request was aborted";
const HTTP_FALLBACK_MESSAGE: &str = "request failed";
const UNKNOWN_FALLBACK_MESSAGE: &str = "an unexpected error occurred";

#[derive(Serialize, Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransportErrorKind {
    Network,
    Http,
    Timeout,
    Abort,
    Unknown,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TransportErrorInfo {
    #[serde(rename = "type")]
    pub kind: TransportErrorKind,
    pub message: String,
    pub status_code: Option<u16>,
    pub is_retryable: bool,
}

impl TransportErrorInfo {
    fn new(kind: TransportErrorKind, message: impl Into<String>, is_retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            is_retryable,
        }
    }
}

pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Assign a transport category to an error. Rules are checked in order and
/// the first match wins: network, timeout, abort, HTTP status, unknown.
pub fn classify(err: &ClientError) -> TransportErrorInfo {
    // status-bearing errors are classified by their code, not their text
    let text = match err {
        ClientError::Http { .. } | ClientError::RateLimited { .. } => String::new(),
        _ => err.raw_message().to_lowercase(),
    };

    let network = matches!(err, ClientError::Network { .. })
        || text.contains("failed to fetch")
        || text.contains("network request failed");
    if network {
        return TransportErrorInfo::new(TransportErrorKind::Network, NETWORK_MESSAGE, true);
    }

    if matches!(err, ClientError::Timeout { .. }) || text.contains("timeout") {
        return TransportErrorInfo::new(TransportErrorKind::Timeout, TIMEOUT_MESSAGE, true);
    }

    if matches!(err, ClientError::Aborted { .. }) || text.contains("aborted") {
        return TransportErrorInfo::new(TransportErrorKind::Abort, ABORT_MESSAGE, false);
    }

    if let Some(status) = err.status() {
        let message = http_message(err).unwrap_or_else(|| HTTP_FALLBACK_MESSAGE.to_string());
        return TransportErrorInfo {
            kind: TransportErrorKind::Http,
            message,
            status_code: Some(status),
            is_retryable: is_retryable_status(status),
        };
    }

    let message = err.raw_message();
    let message = if message.trim().is_empty() {
        UNKNOWN_FALLBACK_MESSAGE.to_string()
    } else {
        message
    };
    TransportErrorInfo::new(TransportErrorKind::Unknown, message, false)
}

// server message from the body first, then the status text
fn http_message(err: &ClientError) -> Option<String> {
    match err {
        ClientError::Http {
            status_text, body, ..
        } => body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| status_text.clone().filter(|s| !s.is_empty())),
        ClientError::RateLimited { message, .. } => Some(message.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn http(status: u16) -> ClientError {
        ClientError::Http {
            status,
            status_text: None,
            body: None,
        }
    }

    #[test]
    fn test_failed_to_fetch_is_network() {
        let info = classify(&ClientError::Unknown("TypeError: Failed to fetch".to_string()));
        assert_eq!(info.kind, TransportErrorKind::Network);
        assert!(info.is_retryable);

        let info = classify(&ClientError::Network {
            message: "connection refused".to_string(),
        });
        assert_eq!(info.kind, TransportErrorKind::Network);
        assert!(info.is_retryable);
    }

    #[test]
    fn test_network_request_failed_is_network() {
        let info = classify(&ClientError::Unknown("Network request failed".to_string()));
        assert_eq!(info.kind, TransportErrorKind::Network);
    }

    #[test]
    fn test_timeout() {
        let info = classify(&ClientError::Timeout {
            message: "operation timed out".to_string(),
        });
        assert_eq!(info.kind, TransportErrorKind::Timeout);
        assert!(info.is_retryable);

        let info = classify(&ClientError::Unknown("gateway timeout".to_string()));
        assert_eq!(info.kind, TransportErrorKind::Timeout);
    }

    #[test]
    fn test_abort_not_retryable() {
        let info = classify(&ClientError::Aborted {
            message: "user navigated away".to_string(),
        });
        assert_eq!(info.kind, TransportErrorKind::Abort);
        assert!(!info.is_retryable);

        let info = classify(&ClientError::Unknown("The operation was aborted".to_string()));
        assert_eq!(info.kind, TransportErrorKind::Abort);
    }

    #[test]
    fn test_retryable_statuses() {
        for status in [408, 429, 500, 502, 503, 504] {
            let info = classify(&http(status));
            assert_eq!(info.kind, TransportErrorKind::Http);
            assert_eq!(info.status_code, Some(status));
            assert!(info.is_retryable, "{status} should be retryable");
        }
    }

    #[test]
    fn test_client_statuses_not_retryable() {
        for status in [400, 401, 403, 404, 422, 501] {
            let info = classify(&http(status));
            assert_eq!(info.kind, TransportErrorKind::Http);
            assert!(!info.is_retryable, "{status} should not be retryable");
        }
    }

    #[test]
    fn test_http_message_precedence() {
        let err = ClientError::Http {
            status: 422,
            status_text: Some("Unprocessable Content".to_string()),
            body: Some(json!({"message": "email is taken"})),
        };
        assert_eq!(classify(&err).message, "email is taken");

        let err = ClientError::Http {
            status: 422,
            status_text: Some("Unprocessable Content".to_string()),
            body: Some(json!({"errors": {}})),
        };
        assert_eq!(classify(&err).message, "Unprocessable Content");

        assert_eq!(classify(&http(418)).message, HTTP_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_gateway_timeout_stays_http() {
        let err = ClientError::Http {
            status: 504,
            status_text: Some("Gateway Timeout".to_string()),
            body: None,
        };
        let info = classify(&err);
        assert_eq!(info.kind, TransportErrorKind::Http);
        assert_eq!(info.message, "Gateway Timeout");
        assert!(info.is_retryable);
    }

    #[test]
    fn test_rate_limited_is_http_429() {
        let info = classify(&ClientError::RateLimited {
            key: "api_/admin/users".to_string(),
            message: "too many requests".to_string(),
        });
        assert_eq!(info.kind, TransportErrorKind::Http);
        assert_eq!(info.status_code, Some(429));
        assert!(info.is_retryable);
    }

    #[test]
    fn test_unknown_fallback() {
        let info = classify(&ClientError::Unknown(String::new()));
        assert_eq!(info.kind, TransportErrorKind::Unknown);
        assert_eq!(info.message, UNKNOWN_FALLBACK_MESSAGE);
        assert!(!info.is_retryable);

        let info = classify(&ClientError::Deserialization("expected value".to_string()));
        assert_eq!(info.kind, TransportErrorKind::Unknown);
        assert_eq!(info.message, "expected value");
    }

    #[test]
    fn test_info_serializes_kind_as_type() {
        let info = classify(&http(503));
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({
                "type": "http",
                "message": "request failed",
                "status_code": 503,
                "is_retryable": true
            })
        );
    }
}
