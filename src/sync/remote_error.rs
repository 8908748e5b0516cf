//! Known shapes of a failed tracker call and how each renders for the caller.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Rendered when a failure carries no usable text at all.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// A failed tracker call, classified by the information it carries.
///
/// Variants are listed in extraction precedence order: a structured
/// description beats a message list, which beats the transport text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// `errors.description` from a Jira error body.
    StructuredDescription(String),
    /// `errorMessages` from a Jira error body.
    MessageList(Vec<String>),
    /// Network failure, timeout, or an error status with an unhelpful body.
    TransportFailure(String),
    Unknown,
}

/// Jira's error envelope, e.g.
/// `{"errorMessages": ["..."], "errors": {"summary": "..."}}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: serde_json::Map<String, serde_json::Value>,
}

impl RemoteError {
    /// Classify an error status and its response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: JiraErrorBody = serde_json::from_str(body).unwrap_or_default();

        if let Some(description) = parsed
            .errors
            .get("description")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
        {
            return Self::StructuredDescription(description.to_string());
        }

        let messages: Vec<String> = parsed
            .error_messages
            .into_iter()
            .filter(|m| !m.is_empty())
            .collect();
        if !messages.is_empty() {
            return Self::MessageList(messages);
        }

        Self::TransportFailure(format!("Request failed with status code {}", status))
    }

    /// Classify a failure that never produced a response.
    pub fn from_transport(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return Self::TransportFailure(format!(
                "Tracker request timed out after {}ms",
                timeout.as_millis()
            ));
        }
        let msg = err.to_string();
        if msg.is_empty() {
            Self::Unknown
        } else {
            Self::TransportFailure(msg)
        }
    }

    /// Human-readable message, falling back to [`UNKNOWN_ERROR`].
    pub fn message(&self) -> String {
        let text = match self {
            Self::StructuredDescription(s) | Self::TransportFailure(s) => s.clone(),
            Self::MessageList(messages) => messages.join(", "),
            Self::Unknown => String::new(),
        };
        if text.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            text
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
