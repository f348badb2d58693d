//! Error taxonomy for Data Gateway calls.
//!
//! Every failed call ends up as one [`GatewayError`]. The REST gateway builds
//! them from the HTTP status and body via [`GatewayError::from_response`]; the
//! in-memory gateway constructs them directly.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// Key the server uses for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Boxed transport error carried by [`GatewayError::Connectivity`].
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when talking to the Data Gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The session is missing or expired (HTTP 401).
    #[error("authentication required")]
    Unauthorized,

    /// The server rejected one or more fields.
    #[error("{0}")]
    Field(FieldErrors),

    /// A cross-field or business-rule rejection, e.g. insufficient stock.
    #[error("{0}")]
    NonField(String),

    /// The referenced resource does not exist (HTTP 404).
    #[error("not found{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    NotFound { message: Option<String> },

    /// The server failed (HTTP 5xx).
    #[error("server error (HTTP {status})")]
    Server { status: u16 },

    /// No response was received.
    #[error("unable to reach server: {0}")]
    Connectivity(#[source] TransportError),

    /// A response that fits none of the other categories.
    #[error("unexpected response (HTTP {status}): {message}")]
    Unexpected { status: u16, message: String },

    /// A successful response whose body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// An endpoint path did not resolve against the base URL.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

impl GatewayError {
    /// Classifies a non-success HTTP response.
    ///
    /// - 401 becomes [`GatewayError::Unauthorized`]
    /// - 404 becomes [`GatewayError::NotFound`], keeping the server's `error`
    ///   string if it sent one
    /// - 5xx becomes [`GatewayError::Server`]
    /// - anything else is classified from the body (see [`classify_body`])
    pub fn from_response(status: u16, body: &str) -> Self {
        match status {
            401 => Self::Unauthorized,
            404 => Self::NotFound {
                message: serde_json::from_str::<Value>(body)
                    .ok()
                    .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string)),
            },
            s if s >= 500 => Self::Server { status: s },
            s => classify_body(s, body),
        }
    }

    /// Wraps a transport failure where no response was received.
    pub fn connectivity(source: impl Into<TransportError>) -> Self {
        Self::Connectivity(source.into())
    }

    /// Shorthand for a single-field rejection.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(field, message);
        Self::Field(errors)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Classifies a 4xx body into field, non-field or unexpected errors.
///
/// Recognized shapes, in order of precedence:
/// - `{"success": false, "errors": {..}}` (account endpoints): the inner map
///   is classified instead
/// - `{"error": "..."}`
/// - `{"detail": "..."}`
/// - a map of field name to message(s); `non_field_errors` entries are kept as
///   non-field messages
/// - a bare JSON string, or a plain-text body
pub fn classify_body(status: u16, body: &str) -> GatewayError {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return GatewayError::Unexpected {
            status,
            message: "empty response body".to_string(),
        };
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => classify_value(status, value),
        Err(_) => GatewayError::NonField(trimmed.to_string()),
    }
}

fn classify_value(status: u16, value: Value) -> GatewayError {
    match value {
        Value::String(message) => GatewayError::NonField(message),
        items @ Value::Array(_) => GatewayError::NonField(messages_of(&items).join(", ")),
        Value::Object(map) => {
            if let Some(inner @ Value::Object(_)) = map.get("errors") {
                return classify_value(status, inner.clone());
            }
            if let Some(Value::String(message)) = map.get("error") {
                return GatewayError::NonField(message.clone());
            }
            if map.len() == 1 {
                if let Some(Value::String(detail)) = map.get("detail") {
                    return GatewayError::NonField(detail.clone());
                }
            }

            let mut errors = FieldErrors::new();
            for (key, value) in &map {
                for message in messages_of(value) {
                    errors.push(key, message);
                }
            }

            if errors.is_empty() {
                GatewayError::Unexpected {
                    status,
                    message: Value::Object(map).to_string(),
                }
            } else if !errors.has_field_errors() {
                GatewayError::NonField(errors.non_field().join(", "))
            } else {
                GatewayError::Field(errors)
            }
        }
        other => GatewayError::Unexpected {
            status,
            message: other.to_string(),
        },
    }
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(messages_of).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// Field name -> messages, in the order the server reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(IndexMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Field-level entries, excluding `non_field_errors`.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .filter(|(k, _)| k.as_str() != NON_FIELD_ERRORS)
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn non_field(&self) -> &[String] {
        self.get(NON_FIELD_ERRORS).unwrap_or(&[])
    }

    pub fn has_field_errors(&self) -> bool {
        self.fields().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Renders `"Field name: m1, m2; Other: m3"`, with non-field messages joined
/// by `", "` in their reported position.
impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(key, messages)| {
                let joined = messages.join(", ");
                if key == NON_FIELD_ERRORS {
                    joined
                } else {
                    format!("{}: {joined}", humanize_field(key))
                }
            })
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// `"branch_name"` -> `"Branch name"`.
pub fn humanize_field(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.map(|c| if c == '_' { ' ' } else { c }))
            .collect(),
        None => String::new(),
    }
}
