use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Parsed JSON body; `Null` when the body is empty, a JSON string when
    /// the body is not JSON.
    pub body: Value,
}

/// Performs a single HTTP exchange. Non-2xx responses are errors.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

pub type DynTransport = Arc<dyn Transport>;

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        debug!(method = %request.method, url = request.url, "send request");

        let mut builder = self
            .http
            .request(request.method, &request.url)
            .headers(request.headers)
            .timeout(request.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.body.filter(|b| !b.is_null()) {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        trace!(status = status.as_u16(), bytes = text.len(), "received response");

        let body = parse_body(text);
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().map(str::to_string),
                body: Some(body).filter(|b| !b.is_null()),
            });
        }

        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn parse_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}
