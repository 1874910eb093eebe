#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Login failed with status {status}: {body}")]
    Auth { status: u16, body: String },

    #[error("Login request failed: {0}")]
    LoginRequest(String),

    #[error("Chat request failed: {0}")]
    ChatRequest(String),

    #[error("Chat returned status {status}: {body}")]
    ChatStatus { status: u16, body: String },

    #[error("Failed to write report to {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Renders a response body for error messages. Bare JSON strings are
/// unquoted, anything else is kept as compact JSON.
pub fn body_text(body: &Value) -> String {
    if let Some(text) = body.as_str() {
        return text.to_string();
    }

    return body.to_string();
}
