#[cfg(test)]
#[path = "chat_result_test.rs"]
mod tests;

use chrono::Local;
use chrono::SecondsFormat;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::HarnessError;

pub const PREVIEW_LENGTH: usize = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatResult {
    pub sequence: usize,
    pub message: String,
    pub success: bool,
    /// Missing when the request never got a response.
    pub status_code: Option<u16>,
    /// Milliseconds from request start to response receipt.
    pub response_time: f64,
    pub response: String,
    pub response_length: usize,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub final_check: bool,
}

fn now() -> String {
    return Local::now().to_rfc3339_opts(SecondsFormat::Millis, false);
}

impl ChatResult {
    pub fn success(
        sequence: usize,
        message: &str,
        response_time: f64,
        content: &str,
        final_check: bool,
    ) -> ChatResult {
        return ChatResult {
            sequence,
            message: message.to_string(),
            success: true,
            status_code: Some(200),
            response_time,
            response: content.to_string(),
            response_length: content.chars().count(),
            timestamp: now(),
            error: None,
            final_check,
        };
    }

    pub fn failure(
        sequence: usize,
        message: &str,
        response_time: f64,
        err: &HarnessError,
        final_check: bool,
    ) -> ChatResult {
        let status_code = match err {
            HarnessError::ChatStatus { status, .. } => Some(*status),
            _ => None,
        };

        return ChatResult {
            sequence,
            message: message.to_string(),
            success: false,
            status_code,
            response_time,
            response: "".to_string(),
            response_length: 0,
            timestamp: now(),
            error: Some(err.to_string()),
            final_check,
        };
    }

    /// Response text shortened for terminal output.
    pub fn preview(&self, max_chars: usize) -> String {
        if self.response.chars().count() <= max_chars {
            return self.response.to_string();
        }

        let truncated = self.response.chars().take(max_chars).collect::<String>();
        return format!("{truncated}...");
    }
}
