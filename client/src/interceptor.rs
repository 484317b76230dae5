//! Middleware hooks registered on a client instance.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::warn;

use crate::error::{ClientError, Result};
use crate::notify::{DynNotificationSink, Notification};
use crate::pipeline::RequestOptions;
use crate::rate_limit::{RateLimitRule, RateLimiter};
use crate::transport::{TransportRequest, TransportResponse};

const INSUFFICIENT_PERMISSIONS: &str = "insufficient permissions";
const NOT_FOUND: &str = "resource not found";
const SERVER_ERROR: &str = "server error, please try again later";

/// What an interceptor knows about the call in flight.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub endpoint: String,
    /// Retries performed so far; 0 on the first attempt.
    pub attempt: u32,
    pub options: RequestOptions,
}

/// `before` runs on every attempt and may reject the call; `on_success`
/// and `on_error` run once when the call settles.
#[async_trait]
pub trait Interceptor: Send + Sync + Debug {
    async fn before(&self, _ctx: &RequestContext, _request: &mut TransportRequest) -> Result<()> {
        Ok(())
    }

    async fn on_success(&self, _ctx: &RequestContext, _response: &TransportResponse) {}

    async fn on_error(&self, _ctx: &RequestContext, _err: &ClientError) {}
}

pub type DynInterceptor = Arc<dyn Interceptor>;

/// Shows notifications for settled calls: an optional success toast, and an
/// error toast per status class unless the call is marked silent.
#[derive(Debug, Clone)]
pub struct ToastInterceptor {
    sink: DynNotificationSink,
}

impl ToastInterceptor {
    pub fn new(sink: DynNotificationSink) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Interceptor for ToastInterceptor {
    async fn on_success(&self, ctx: &RequestContext, response: &TransportResponse) {
        if !ctx.options.show_success_toast {
            return;
        }
        let notification = match &ctx.options.success_message {
            Some(message) => Notification::success(message.clone()),
            None => Notification::from_response(&response.body, Some(response.status)),
        };
        self.sink.notify(notification);
    }

    async fn on_error(&self, ctx: &RequestContext, err: &ClientError) {
        if ctx.options.silent {
            return;
        }

        let status = err.status().unwrap_or(500);
        let notification = match status {
            401 => {
                warn!(endpoint = ctx.endpoint, "unauthorized request");
                return;
            }
            403 => Notification::error(INSUFFICIENT_PERMISSIONS),
            404 => Notification::error(NOT_FOUND),
            500.. => Notification::error(SERVER_ERROR),
            _ => Notification::from_response(&error_payload(err), Some(status)),
        };
        self.sink.notify(notification);
    }
}

/// Body of the failed response, or the error text wrapped as a message.
pub(crate) fn error_payload(err: &ClientError) -> Value {
    err.body()
        .cloned()
        .unwrap_or_else(|| json!({ "message": err.raw_message() }))
}

/// Rejects calls once an endpoint exceeds its budget.
#[derive(Debug, Clone)]
pub struct RateLimitInterceptor {
    limiter: Arc<RateLimiter>,
    rule: RateLimitRule,
}

impl RateLimitInterceptor {
    pub fn new(limiter: Arc<RateLimiter>, rule: RateLimitRule) -> Self {
        Self { limiter, rule }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}

#[async_trait]
impl Interceptor for RateLimitInterceptor {
    async fn before(&self, ctx: &RequestContext, _request: &mut TransportRequest) -> Result<()> {
        // retries of an admitted call are not counted again
        if ctx.attempt > 0 {
            return Ok(());
        }
        let key = format!("api_{}", ctx.endpoint);
        let status = self.limiter.check(&key, &self.rule);
        if status.allowed {
            return Ok(());
        }
        Err(ClientError::RateLimited {
            key,
            message: status
                .message
                .unwrap_or_else(|| "rate limit exceeded".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ToastVariant;
    use crate::notify::testing::RecordingSink;
    use reqwest::header::HeaderMap;
    use std::time::Duration;

    fn ctx(options: RequestOptions) -> RequestContext {
        RequestContext {
            method: Method::GET,
            endpoint: "/admin/users".to_string(),
            attempt: 0,
            options,
        }
    }

    fn transport_request() -> TransportRequest {
        TransportRequest {
            method: Method::GET,
            url: "http://localhost/admin/users".to_string(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            timeout: Duration::from_secs(1),
        }
    }

    fn http(status: u16, body: Option<Value>) -> ClientError {
        ClientError::Http {
            status,
            status_text: None,
            body,
        }
    }

    #[tokio::test]
    async fn test_toast_error_by_status() {
        let sink = Arc::new(RecordingSink::default());
        let toast = ToastInterceptor::new(sink.clone());
        let c = ctx(RequestOptions::default());

        toast.on_error(&c, &http(401, None)).await;
        toast.on_error(&c, &http(403, None)).await;
        toast.on_error(&c, &http(404, None)).await;
        toast
            .on_error(&c, &http(422, Some(json!({"errors": {"name": ["required"]}}))))
            .await;
        toast.on_error(&c, &http(503, None)).await;
        toast
            .on_error(&c, &ClientError::Unknown("boom".to_string()))
            .await;

        let lines: Vec<_> = sink
            .notifications()
            .into_iter()
            .map(|n| n.lines.join("|"))
            .collect();
        assert_eq!(
            lines,
            vec![
                INSUFFICIENT_PERMISSIONS,
                NOT_FOUND,
                "errors.name: required",
                SERVER_ERROR,
                SERVER_ERROR,
            ]
        );
    }

    #[tokio::test]
    async fn test_toast_silent() {
        let sink = Arc::new(RecordingSink::default());
        let toast = ToastInterceptor::new(sink.clone());
        let c = ctx(RequestOptions::default().silent());
        toast.on_error(&c, &http(500, None)).await;
        assert!(sink.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_toast_success_opt_in() {
        let sink = Arc::new(RecordingSink::default());
        let toast = ToastInterceptor::new(sink.clone());
        let response = TransportResponse {
            status: 201,
            body: json!({"message": "user created"}),
        };

        toast
            .on_success(&ctx(RequestOptions::default()), &response)
            .await;
        assert!(sink.notifications().is_empty());

        toast
            .on_success(&ctx(RequestOptions::default().success_toast(None)), &response)
            .await;
        toast
            .on_success(
                &ctx(RequestOptions::default().success_toast(Some("saved".to_string()))),
                &response,
            )
            .await;

        let seen = sink.notifications();
        assert_eq!(seen[0].lines, vec!["user created"]);
        assert_eq!(seen[0].variant, ToastVariant::Success);
        assert_eq!(seen[1].lines, vec!["saved"]);
    }

    #[tokio::test]
    async fn test_rate_limit_rejects_first_attempts_only() {
        let limiter = Arc::new(RateLimiter::new());
        let interceptor =
            RateLimitInterceptor::new(limiter.clone(), RateLimitRule::new(1, Duration::from_secs(60)));
        let mut request = transport_request();

        let first = ctx(RequestOptions::default());
        assert!(interceptor.before(&first, &mut request).await.is_ok());

        let mut retry = ctx(RequestOptions::default());
        retry.attempt = 1;
        assert!(interceptor.before(&retry, &mut request).await.is_ok());

        let err = interceptor.before(&first, &mut request).await.unwrap_err();
        match err {
            ClientError::RateLimited { key, .. } => assert_eq!(key, "api_/admin/users"),
            other => panic!("Expected RateLimited error, got {other:?}"),
        }
        assert_eq!(limiter.state("api_/admin/users").unwrap().requests, 2);
    }
}
