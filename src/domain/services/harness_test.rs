use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use serde_json::Value;

use super::ChatHarness;
use super::HarnessOptions;
use crate::domain::models::ChatResult;
use crate::domain::models::HarnessError;
use crate::domain::models::HttpMethod;
use crate::domain::models::HttpResponse;
use crate::domain::models::Report;
use crate::domain::models::Reporter;
use crate::domain::models::ReporterName;
use crate::domain::models::Transport;
use crate::domain::models::FINAL_CHECK_MESSAGE;

#[derive(Clone, Debug)]
struct Call {
    path: String,
    body: Option<Value>,
    cookie: Option<String>,
}

/// In-process transport answering from a queue. Once the queue is empty every
/// chat request gets a 200 reply echoing the message.
#[derive(Default)]
struct FakeTransport {
    queue: Mutex<VecDeque<Result<HttpResponse>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    delay: Duration,
}

impl FakeTransport {
    fn push(&self, res: Result<HttpResponse>) {
        self.queue.lock().unwrap().push_back(res);
    }

    fn calls(&self) -> Arc<Mutex<Vec<Call>>> {
        return self.calls.clone();
    }
}

fn response(status: u16, body: Value, set_cookies: &[&str]) -> HttpResponse {
    return HttpResponse {
        status,
        body,
        set_cookies: set_cookies.iter().map(|e| return e.to_string()).collect(),
    };
}

fn login_ok() -> HttpResponse {
    return response(
        200,
        json!({"username": "admin", "role": "ADMIN"}),
        &["connect.sid=abc; Path=/; HttpOnly"],
    );
}

#[async_trait]
impl Transport for FakeTransport {
    fn base_url(&self) -> &str {
        return "http://fake";
    }

    #[allow(clippy::implicit_return)]
    async fn request(
        &self,
        _method: HttpMethod,
        path: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(Call {
            path: path.to_string(),
            body: body.clone(),
            cookie: cookie.map(|e| return e.to_string()),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(res) = self.queue.lock().unwrap().pop_front() {
            return res;
        }

        let text = body
            .as_ref()
            .and_then(|e| return e.get("message"))
            .and_then(|e| return e.as_str())
            .unwrap_or_default()
            .to_string();

        return Ok(response(
            200,
            json!({"message": {"content": format!("Reply to {text}")}}),
            &[],
        ));
    }
}

#[derive(Default)]
struct RecordingReporter {
    events: Arc<Mutex<Vec<String>>>,
}

impl Reporter for RecordingReporter {
    fn name(&self) -> ReporterName {
        return ReporterName::Silent;
    }

    fn login_failed(&self, err: &HarnessError, fatal: bool) {
        self.events
            .lock()
            .unwrap()
            .push(format!("login_failed:{fatal}:{err}"));
    }

    fn message_completed(&self, result: &ChatResult) {
        self.events
            .lock()
            .unwrap()
            .push(format!("completed:{}", result.sequence));
    }

    fn waiting(&self, delay: Duration) {
        self.events
            .lock()
            .unwrap()
            .push(format!("waiting:{}", delay.as_millis()));
    }

    fn final_check_completed(&self, result: &ChatResult) {
        self.events
            .lock()
            .unwrap()
            .push(format!("final:{}", result.success));
    }

    fn report_ready(&self, report: &Report) {
        self.events
            .lock()
            .unwrap()
            .push(format!("report:{}", report.total_messages));
    }
}

fn fast_options() -> HarnessOptions {
    return HarnessOptions {
        message_delay: Duration::ZERO,
        final_check_delay: Duration::ZERO,
        ..HarnessOptions::default()
    };
}

fn harness(transport: FakeTransport, options: HarnessOptions) -> (ChatHarness, Arc<Mutex<Vec<String>>>) {
    let reporter = RecordingReporter::default();
    let events = reporter.events.clone();
    return (
        ChatHarness::new(Box::new(transport), Box::new(reporter), options),
        events,
    );
}

fn messages(count: usize) -> Vec<String> {
    return (1..=count).map(|i| return format!("Message {i}")).collect();
}

#[tokio::test]
async fn it_logs_in_and_keeps_the_session_cookie() -> Result<()> {
    let transport = FakeTransport::default();
    transport.push(Ok(login_ok()));
    let calls = transport.calls();

    let (mut harness, _) = harness(transport, fast_options());
    harness.authenticate().await?;

    let session = harness.session().unwrap();
    assert_eq!(session.cookie(), Some("connect.sid=abc"));
    assert_eq!(session.username, "admin");
    assert_eq!(session.role, Some("ADMIN".to_string()));

    let calls = calls.lock().unwrap();
    assert_eq!(calls[0].path, "/api/login");
    assert_eq!(
        calls[0].body,
        Some(json!({"username": "admin", "password": "admin"}))
    );
    assert_eq!(calls[0].cookie, None);
    return Ok(());
}

#[tokio::test]
async fn it_returns_auth_errors_for_non_200_logins() -> Result<()> {
    let transport = FakeTransport::default();
    transport.push(Ok(response(401, json!({"message": "Invalid"}), &[])));

    let (harness, _) = harness(transport, fast_options());
    let err = harness
        .login(&harness.options.credentials.clone())
        .await
        .unwrap_err();

    match &err {
        HarnessError::Auth { status, body } => {
            assert_eq!(*status, 401);
            assert_eq!(body, r#"{"message":"Invalid"}"#);
        }
        _ => bail!("Expected an auth error, got {err}"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_sends_n_plus_one_successful_messages() -> Result<()> {
    let transport = FakeTransport::default();
    transport.push(Ok(login_ok()));
    let calls = transport.calls();

    let (mut harness, _) = harness(transport, fast_options());
    let report = harness.run(&messages(5)).await?;

    assert_eq!(report.total_messages, 6);
    assert_eq!(report.successful_messages, 6);
    assert_eq!(report.failed_messages, 0);
    assert_eq!(report.success_rate, 100.0);
    assert!(report.final_check_passed);
    assert_eq!(report.base_url, "http://fake");

    let sequences = report
        .results
        .iter()
        .map(|res| return res.sequence)
        .collect::<Vec<usize>>();
    assert_eq!(sequences, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(report.results[0].response, "Reply to Message 1");
    assert_eq!(report.results[5].message, FINAL_CHECK_MESSAGE);
    assert!(report.results[5].final_check);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 7);
    for call in calls.iter().skip(1) {
        assert_eq!(call.path, "/api/chat");
        assert_eq!(call.cookie, Some("connect.sid=abc".to_string()));
    }
    assert_eq!(
        calls[2].body,
        Some(json!({"message": "Message 2", "context": "Automated test - message 2"}))
    );
    assert_eq!(calls[6].body, Some(json!({"message": FINAL_CHECK_MESSAGE})));
    return Ok(());
}

#[tokio::test]
async fn it_isolates_a_single_failed_message() -> Result<()> {
    let transport = FakeTransport::default();
    transport.push(Ok(login_ok()));
    transport.push(Ok(response(200, json!({"message": {"content": "one"}}), &[])));
    transport.push(Ok(response(200, json!({"message": {"content": "two"}}), &[])));
    transport.push(Ok(response(
        503,
        json!({"message": "Assistant unavailable"}),
        &[],
    )));

    let (mut harness, _) = harness(transport, fast_options());
    let report = harness.run(&messages(4)).await?;

    assert_eq!(report.total_messages, 5);
    assert_eq!(report.failed_messages, 1);
    assert_eq!(report.successful_messages, 4);

    let failed = &report.results[2];
    assert!(!failed.success);
    assert_eq!(failed.status_code, Some(503));
    insta::assert_snapshot!(failed.error.clone().unwrap(), @"Chat returned status 503: Assistant unavailable");

    for (idx, res) in report.results.iter().enumerate() {
        if idx != 2 {
            assert!(res.success, "result {idx} should have succeeded");
        }
    }
    return Ok(());
}

#[tokio::test]
async fn it_records_transport_failures_and_keeps_going() -> Result<()> {
    let transport = FakeTransport::default();
    transport.push(Ok(login_ok()));
    transport.push(Err(anyhow::anyhow!("operation timed out")));

    let (mut harness, _) = harness(transport, fast_options());
    let report = harness.run(&messages(2)).await?;

    assert_eq!(report.total_messages, 3);
    assert_eq!(report.failed_messages, 1);
    assert_eq!(report.results[0].status_code, None);
    assert_eq!(
        report.results[0].error,
        Some("Chat request failed: operation timed out".to_string())
    );
    assert!(report.results[1].success);
    return Ok(());
}

#[tokio::test]
async fn it_defaults_missing_content_to_empty() -> Result<()> {
    let transport = FakeTransport::default();
    transport.push(Ok(response(200, json!({"ok": true}), &[])));

    let (mut harness, _) = harness(transport, fast_options());
    let res = harness.send_message("Hi", None).await;

    assert!(res.success);
    assert_eq!(res.response, "");
    assert_eq!(res.response_length, 0);
    return Ok(());
}

#[tokio::test]
async fn it_measures_latency_as_a_lower_bound() -> Result<()> {
    let transport = FakeTransport {
        delay: Duration::from_millis(50),
        ..FakeTransport::default()
    };

    let (mut harness, _) = harness(transport, fast_options());
    let res = harness.send_message("Hi", None).await;

    assert!(res.success);
    assert!(res.response_time >= 50.0, "latency {}", res.response_time);
    return Ok(());
}

#[tokio::test]
async fn it_continues_after_login_failure_when_allowed() -> Result<()> {
    let transport = FakeTransport::default();
    transport.push(Ok(response(500, json!({"message": "boom"}), &[])));
    let calls = transport.calls();

    let (mut harness, events) = harness(transport, fast_options());
    let report = harness.run(&messages(3)).await?;

    assert!(harness.session().is_none());
    assert_eq!(report.total_messages, 4);
    assert_eq!(report.successful_messages, 4);
    assert!(events
        .lock()
        .unwrap()
        .contains(&"login_failed:false:Login failed with status 500: {\"message\":\"boom\"}".to_string()));

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 5);
    assert!(calls.iter().skip(1).all(|call| return call.cookie.is_none()));
    return Ok(());
}

#[tokio::test]
async fn it_stops_after_login_failure_when_not_allowed() -> Result<()> {
    let transport = FakeTransport::default();
    transport.push(Ok(response(500, json!("Internal Server Error"), &[])));
    let calls = transport.calls();

    let options = HarnessOptions {
        allow_login_failure: false,
        ..fast_options()
    };
    let (mut harness, events) = harness(transport, options);
    let err = harness.run(&messages(3)).await.unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"Login failed with status 500: Internal Server Error");
    assert!(harness.results().is_empty());
    assert_eq!(calls.lock().unwrap().len(), 1);
    assert_eq!(
        events.lock().unwrap().clone(),
        vec!["login_failed:true:Login failed with status 500: Internal Server Error"]
    );
    return Ok(());
}

#[tokio::test]
async fn it_uses_rotated_session_cookies() -> Result<()> {
    let transport = FakeTransport::default();
    transport.push(Ok(login_ok()));
    transport.push(Ok(response(
        200,
        json!({"message": {"content": "one"}}),
        &["connect.sid=rotated; Path=/"],
    )));
    let calls = transport.calls();

    let (mut harness, _) = harness(transport, fast_options());
    harness.run(&messages(2)).await?;

    let calls = calls.lock().unwrap();
    assert_eq!(calls[1].cookie, Some("connect.sid=abc".to_string()));
    assert_eq!(calls[2].cookie, Some("connect.sid=rotated".to_string()));
    return Ok(());
}

#[tokio::test]
async fn it_waits_between_messages_but_not_after_the_last() -> Result<()> {
    let transport = FakeTransport::default();
    transport.push(Ok(login_ok()));

    let options = HarnessOptions {
        message_delay: Duration::from_millis(1),
        ..fast_options()
    };
    let (mut harness, events) = harness(transport, options);
    harness.run(&messages(3)).await?;

    assert_eq!(
        events.lock().unwrap().clone(),
        vec![
            "completed:1",
            "waiting:1",
            "completed:2",
            "waiting:1",
            "completed:3",
            "final:true",
            "report:4",
        ]
    );
    return Ok(());
}

#[tokio::test]
async fn it_still_reports_when_everything_fails() -> Result<()> {
    let transport = FakeTransport::default();
    for _ in 0..4 {
        transport.push(Err(anyhow::anyhow!("connection refused")));
    }

    let (mut harness, _) = harness(transport, fast_options());
    let report = harness.run(&messages(2)).await?;

    assert_eq!(report.total_messages, 3);
    assert_eq!(report.failed_messages, 3);
    assert_eq!(report.success_rate, 0.0);
    assert_eq!(report.avg_response_time, 0.0);
    assert!(!report.final_check_passed);
    return Ok(());
}

#[tokio::test]
async fn it_counts_reply_length_in_characters() -> Result<()> {
    let transport = FakeTransport::default();
    transport.push(Ok(response(
        200,
        json!({"message": {"content": "Grüße 👋"}}),
        &[],
    )));

    let (mut harness, _) = harness(transport, fast_options());
    let res = harness.send_message("Hi", None).await;

    assert!(res.success);
    assert_eq!(res.response, "Grüße 👋");
    assert_eq!(res.response_length, 7);
    return Ok(());
}
