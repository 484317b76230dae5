use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::message::{normalize_backend_message, pick_toast_type, ToastVariant};

/// A transient, user facing message handed to the display layer.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub lines: Vec<String>,
    pub variant: ToastVariant,
    pub timeout: Duration,
}

impl Notification {
    pub fn new(lines: Vec<String>, variant: ToastVariant) -> Self {
        Self {
            lines,
            variant,
            timeout: variant.default_timeout(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(vec![message.into()], ToastVariant::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(vec![message.into()], ToastVariant::Error)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(vec![message.into()], ToastVariant::Warning)
    }

    /// Normalize a response payload and pick the variant from its status.
    pub fn from_response(payload: &Value, status: Option<u16>) -> Self {
        let normalized = normalize_backend_message(payload);
        Self::new(normalized.lines, pick_toast_type(status))
    }
}

pub trait NotificationSink: Send + Sync + Debug {
    fn notify(&self, notification: Notification);
}

pub type DynNotificationSink = Arc<dyn NotificationSink>;

/// Writes notifications to the log. Used when no display layer is attached.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        let text = notification.lines.join("; ");
        match notification.variant {
            ToastVariant::Error | ToastVariant::Warning => {
                warn!(variant = %notification.variant, "{}", text)
            }
            ToastVariant::Success | ToastVariant::Info => {
                info!(variant = %notification.variant, "{}", text)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_response() {
        let n = Notification::from_response(&json!({"errors": {"email": ["taken"]}}), Some(422));
        assert_eq!(n.lines, vec!["errors.email: taken"]);
        assert_eq!(n.variant, ToastVariant::Error);
        assert_eq!(n.timeout, Duration::from_millis(6000));

        let n = Notification::from_response(&json!({"msg": "saved"}), Some(201));
        assert_eq!(n.variant, ToastVariant::Success);
    }

    #[test]
    fn test_shortcuts() {
        let n = Notification::warning("careful");
        assert_eq!(n.lines, vec!["careful"]);
        assert_eq!(n.timeout, Duration::from_millis(5000));
    }
}
