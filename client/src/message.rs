//! Turn arbitrary API payloads into display lines.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use strum_macros::Display;

pub const FALLBACK_LINE: &str = "operation completed";

/// Well-known fields that carry a human readable message, by priority.
const CANDIDATE_KEYS: [&str; 10] = [
    "msg",
    "message",
    "error",
    "errors",
    "detail",
    "details",
    "info",
    "data",
    "status",
    "statusText",
];

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ToastVariant {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastVariant {
    /// How long a notification of this variant stays visible.
    pub fn default_timeout(&self) -> Duration {
        match self {
            ToastVariant::Success | ToastVariant::Info => Duration::from_millis(4000),
            ToastVariant::Warning => Duration::from_millis(5000),
            ToastVariant::Error => Duration::from_millis(6000),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NormalizedMessage {
    pub lines: Vec<String>,
}

impl NormalizedMessage {
    fn fallback() -> Self {
        Self {
            lines: vec![FALLBACK_LINE.to_string()],
        }
    }
}

/// 2xx is a success, 4xx and 5xx are errors, everything else is informational.
pub fn pick_toast_type(status: Option<u16>) -> ToastVariant {
    match status {
        Some(200..=299) => ToastVariant::Success,
        Some(400..=599) => ToastVariant::Error,
        _ => ToastVariant::Info,
    }
}

/// Normalize a backend payload into display lines.
///
/// The first non-null well-known field is used (a bare primitive payload is
/// used as is). Objects are flattened to `path.to.leaf: value` lines under
/// the field's name, arrays give one line per element.
pub fn normalize_backend_message(payload: &Value) -> NormalizedMessage {
    let Some((key, raw)) = pick_raw_value(payload) else {
        return NormalizedMessage::fallback();
    };

    match raw {
        Value::Array(items) => NormalizedMessage {
            lines: items.iter().map(display_value).collect(),
        },
        Value::Object(map) => {
            let lines = flatten_object_to_lines(map, key.unwrap_or_default());
            if lines.is_empty() {
                NormalizedMessage::fallback()
            } else {
                NormalizedMessage { lines }
            }
        }
        Value::Null => NormalizedMessage::fallback(),
        primitive => NormalizedMessage {
            lines: vec![display_value(primitive)],
        },
    }
}

fn pick_raw_value(payload: &Value) -> Option<(Option<&'static str>, &Value)> {
    match payload {
        Value::Object(map) => CANDIDATE_KEYS.iter().find_map(|key| {
            map.get(*key)
                .filter(|v| !v.is_null())
                .map(|v| (Some(*key), v))
        }),
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Some((None, payload)),
        _ => None,
    }
}

/// Flatten nested objects into `dotted.path: value` lines, keeping the
/// payload's key order. Objects inside arrays continue the array's path;
/// nulls and nested arrays are skipped.
pub fn flatten_object_to_lines(obj: &Map<String, Value>, parent: &str) -> Vec<String> {
    let mut lines = Vec::new();

    for (key, value) in obj {
        let full_key = if parent.is_empty() {
            key.clone()
        } else {
            format!("{parent}.{key}")
        };

        match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                lines.push(format!("{full_key}: {}", display_value(value)));
            }
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                            lines.push(format!("{full_key}: {}", display_value(item)));
                        }
                        Value::Object(nested) => {
                            lines.extend(flatten_object_to_lines(nested, &full_key));
                        }
                        _ => {}
                    }
                }
            }
            Value::Object(nested) => lines.extend(flatten_object_to_lines(nested, &full_key)),
            Value::Null => {}
        }
    }

    lines
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
