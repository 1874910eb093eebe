use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Parsed JSON body. Bodies that aren't JSON are kept as a JSON string.
    pub body: Value,
    /// Raw `Set-Cookie` header values, in the order received.
    pub set_cookies: Vec<String>,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        return self.status == 200;
    }
}

#[async_trait]
pub trait Transport {
    /// Base URL every request path is resolved against.
    fn base_url(&self) -> &str;

    /// Issues a single request. Any response that arrives, whatever its
    /// status, is `Ok`. Only transport failures such as refused connections
    /// or timeouts are returned as errors.
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> Result<HttpResponse>;
}

pub type TransportBox = Box<dyn Transport + Send + Sync>;
