#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::header::SET_COOKIE;
use reqwest::Method;
use serde_json::Value;

use crate::domain::models::HttpMethod;
use crate::domain::models::HttpResponse;
use crate::domain::models::Transport;

/// Transport backed by a reqwest client. The timeout covers the whole request,
/// from connect until the body is read.
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(url: &str, timeout: Duration) -> Result<HttpTransport> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        return Ok(HttpTransport {
            url: url.trim_end_matches('/').to_string(),
            client,
        });
    }
}

fn parse_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }

    return serde_json::from_str(&text).unwrap_or_else(|_| return Value::String(text));
}

#[async_trait]
impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        return &self.url;
    }

    #[allow(clippy::implicit_return)]
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> Result<HttpResponse> {
        let method = match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        let mut req = self
            .client
            .request(method.clone(), format!("{url}{path}", url = self.url));
        if let Some(body) = body {
            req = req.json(&body);
        }
        if let Some(cookie) = cookie {
            req = req.header(COOKIE, cookie);
        }

        let res = req.send().await?;
        let status = res.status().as_u16();
        let set_cookies = res
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|val| return val.to_str().ok())
            .map(|val| return val.to_string())
            .collect::<Vec<String>>();

        let body = parse_body(res.text().await?);
        tracing::debug!(%method, path, status, "HTTP request complete");

        return Ok(HttpResponse {
            status,
            body,
            set_cookies,
        });
    }
}
