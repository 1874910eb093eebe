#[cfg(test)]
#[path = "harness_test.rs"]
mod tests;

use std::time::Duration;
use std::time::Instant;

use serde_json::json;
use serde_json::Value;
use tokio::time;

use crate::domain::models::body_text;
use crate::domain::models::ChatResult;
use crate::domain::models::Credentials;
use crate::domain::models::HarnessError;
use crate::domain::models::HttpMethod;
use crate::domain::models::LoginResponse;
use crate::domain::models::Report;
use crate::domain::models::ReporterBox;
use crate::domain::models::Session;
use crate::domain::models::TransportBox;
use crate::domain::models::FINAL_CHECK_MESSAGE;

pub const LOGIN_PATH: &str = "/api/login";
pub const CHAT_PATH: &str = "/api/chat";

#[derive(Clone, Debug)]
pub struct HarnessOptions {
    pub credentials: Credentials,
    /// Pause between scripted messages.
    pub message_delay: Duration,
    /// Pause before the trailing final check.
    pub final_check_delay: Duration,
    /// Keep sending messages after a failed login. Targets running in demo
    /// mode accept unauthenticated chat traffic.
    pub allow_login_failure: bool,
}

impl Default for HarnessOptions {
    fn default() -> HarnessOptions {
        return HarnessOptions {
            credentials: Credentials::new("admin", "admin"),
            message_delay: Duration::from_secs(2),
            final_check_delay: Duration::from_secs(3),
            allow_login_failure: true,
        };
    }
}

pub struct ChatHarness {
    transport: TransportBox,
    reporter: ReporterBox,
    options: HarnessOptions,
    session: Option<Session>,
    results: Vec<ChatResult>,
}

fn elapsed_ms(start: Instant) -> f64 {
    return start.elapsed().as_secs_f64() * 1000.0;
}

fn chat_error_text(body: &Value) -> String {
    if let Some(message) = body.get("message").and_then(|e| return e.as_str()) {
        return message.to_string();
    }

    return body_text(body);
}

impl ChatHarness {
    pub fn new(transport: TransportBox, reporter: ReporterBox, options: HarnessOptions) -> ChatHarness {
        return ChatHarness {
            transport,
            reporter,
            options,
            session: None,
            results: vec![],
        };
    }

    pub fn base_url(&self) -> &str {
        return self.transport.base_url();
    }

    pub fn reporter(&self) -> &ReporterBox {
        return &self.reporter;
    }

    pub fn session(&self) -> Option<&Session> {
        return self.session.as_ref();
    }

    /// Results collected so far, in send order.
    pub fn results(&self) -> &[ChatResult] {
        return &self.results;
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Session, HarnessError> {
        let body = serde_json::to_value(credentials)
            .map_err(|err| return HarnessError::LoginRequest(err.to_string()))?;

        let res = self
            .transport
            .request(HttpMethod::Post, LOGIN_PATH, Some(body), None)
            .await
            .map_err(|err| return HarnessError::LoginRequest(err.to_string()))?;

        if !res.is_ok() {
            tracing::error!(status = res.status, "Login failed");
            return Err(HarnessError::Auth {
                status: res.status,
                body: body_text(&res.body),
            });
        }

        let login: LoginResponse = serde_json::from_value(res.body).unwrap_or_default();
        let session = Session::new(&res.set_cookies, login);
        if session.cookie().is_none() {
            tracing::warn!("Login succeeded without a session cookie");
        }

        tracing::info!(username = %session.username, role = ?session.role, "Logged in");
        return Ok(session);
    }

    /// Logs in with the configured credentials and keeps the session. A
    /// failure only stops the run when login failures aren't allowed.
    pub async fn authenticate(&mut self) -> Result<(), HarnessError> {
        let credentials = self.options.credentials.clone();
        match self.login(&credentials).await {
            Ok(session) => {
                self.reporter.login_succeeded(&session);
                self.session = Some(session);
            }
            Err(err) => {
                let fatal = !self.options.allow_login_failure;
                self.reporter.login_failed(&err, fatal);
                if fatal {
                    return Err(err);
                }
                tracing::warn!(error = %err, "Continuing without a session");
            }
        }

        return Ok(());
    }

    async fn exchange(&mut self, text: &str, context: Option<&str>, final_check: bool) -> ChatResult {
        let sequence = self.results.len() + 1;
        let mut body = json!({ "message": text });
        if let Some(context) = context {
            body["context"] = json!(context);
        }

        let cookie = self
            .session
            .as_ref()
            .and_then(|session| return session.cookie())
            .map(|cookie| return cookie.to_string());

        let start = Instant::now();
        let res = self
            .transport
            .request(HttpMethod::Post, CHAT_PATH, Some(body), cookie.as_deref())
            .await;
        let response_time = elapsed_ms(start);

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(sequence, error = %err, "Chat request failed");
                let err = HarnessError::ChatRequest(err.to_string());
                return ChatResult::failure(sequence, text, response_time, &err, final_check);
            }
        };

        if let Some(session) = self.session.as_mut() {
            if session.refresh(&res.set_cookies) {
                tracing::debug!(sequence, "Session cookie rotated");
            }
        }

        if !res.is_ok() {
            tracing::error!(sequence, status = res.status, "Chat returned an error status");
            let err = HarnessError::ChatStatus {
                status: res.status,
                body: chat_error_text(&res.body),
            };
            return ChatResult::failure(sequence, text, response_time, &err, final_check);
        }

        let content = res
            .body
            .get("message")
            .and_then(|message| return message.get("content"))
            .and_then(|content| return content.as_str())
            .unwrap_or_default();

        let result = ChatResult::success(sequence, text, response_time, content, final_check);
        tracing::debug!(sequence, response_time, length = result.response_length, "Chat reply received");
        return result;
    }

    /// Sends one message with the current session. Never fails: transport
    /// errors and non-200 statuses come back as failed results.
    pub async fn send_message(&mut self, text: &str, context: Option<&str>) -> ChatResult {
        return self.exchange(text, context, false).await;
    }

    pub async fn run_sequence(&mut self, messages: &[String], delay: Duration) -> Report {
        let total = messages.len();

        for (idx, text) in messages.iter().enumerate() {
            let sequence = idx + 1;
            self.reporter.message_sending(sequence, total, text);

            let context = format!("Automated test - message {sequence}");
            let result = self.send_message(text, Some(context.as_str())).await;
            self.reporter.message_completed(&result);
            self.results.push(result);

            if sequence < total && !delay.is_zero() {
                self.reporter.waiting(delay);
                time::sleep(delay).await;
            }
        }

        self.reporter.final_check_started();
        if !self.options.final_check_delay.is_zero() {
            time::sleep(self.options.final_check_delay).await;
        }

        let result = self.exchange(FINAL_CHECK_MESSAGE, None, true).await;
        self.reporter.final_check_completed(&result);
        self.results.push(result);

        let report = Report::build(self.base_url(), &self.results);
        tracing::info!(
            total = report.total_messages,
            successful = report.successful_messages,
            failed = report.failed_messages,
            "Run finished"
        );
        self.reporter.report_ready(&report);

        return report;
    }

    /// Full run: login followed by the message sequence.
    pub async fn run(&mut self, messages: &[String]) -> Result<Report, HarnessError> {
        self.reporter.run_started(
            self.transport.base_url(),
            &self.options.credentials.username,
            messages.len(),
        );

        self.authenticate().await?;

        let delay = self.options.message_delay;
        return Ok(self.run_sequence(messages, delay).await);
    }
}
