//! One logical API call: auth headers, interceptors, transport, retries
//! with backoff and centralized failure handling.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use strum_macros::Display;
use tracing::{debug, trace, warn};

use crate::auth::AuthSession;
use crate::classify::classify;
use crate::config::RetrySettings;
use crate::error::{ClientError, Result};
use crate::handler::DynErrorHandler;
use crate::interceptor::{error_payload, DynInterceptor, RequestContext};
use crate::metrics::Metrics;
use crate::notify::{DynNotificationSink, Notification};
use crate::transport::{DynTransport, TransportRequest, TransportResponse};

/// Per-call switches.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Send no `Authorization` header and show no failure notification.
    pub skip_auth: bool,
    /// Show no failure notification.
    pub silent: bool,
    pub show_success_toast: bool,
    pub success_message: Option<String>,
    pub query: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn success_toast(mut self, message: Option<String>) -> Self {
        self.show_success_toast = true;
        self.success_message = message;
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RequestState {
    Attempting,
    Retrying,
    Failed,
    Succeeded,
}

enum AttemptError {
    /// An interceptor refused the call before it reached the transport.
    Rejected(ClientError),
    Transport(ClientError),
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    pub(crate) base_url: String,
    pub(crate) transport: DynTransport,
    pub(crate) session: Arc<AuthSession>,
    pub(crate) handler: DynErrorHandler,
    pub(crate) sink: DynNotificationSink,
    pub(crate) interceptors: Vec<DynInterceptor>,
    pub(crate) retry: RetrySettings,
    pub(crate) timeout: Duration,
    pub(crate) metrics: Metrics,
}

impl Pipeline {
    pub fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn retry_settings(&self) -> &RetrySettings {
        &self.retry
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> Result<T> {
        self.request(Method::GET, endpoint, None, options).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B, options: RequestOptions) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = to_body(body)?;
        self.request(Method::POST, endpoint, body, options).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B, options: RequestOptions) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = to_body(body)?;
        self.request(Method::PUT, endpoint, body, options).await
    }

    pub async fn patch<T, B>(&self, endpoint: &str, body: &B, options: RequestOptions) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = to_body(body)?;
        self.request(Method::PATCH, endpoint, body, options).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> Result<T> {
        self.request(Method::DELETE, endpoint, None, options).await
    }

    /// Perform the call, retrying transient failures up to the configured
    /// budget. On a terminal failure the system error handler runs once and
    /// the error is returned.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<T> {
        let url = self.url(endpoint);
        let mut ctx = RequestContext {
            method,
            endpoint: endpoint.to_string(),
            attempt: 0,
            options,
        };

        loop {
            enter(RequestState::Attempting, &ctx);
            let result = self.attempt(&ctx, &url, body.as_ref()).await;
            let response = match result {
                Ok(response) => response,
                Err(AttemptError::Rejected(err)) => return self.fail(&ctx, err).await,
                Err(AttemptError::Transport(err)) => {
                    let info = classify(&err);
                    if !info.is_retryable || ctx.attempt >= self.retry.max_retries {
                        return self.fail(&ctx, err).await;
                    }

                    enter(RequestState::Retrying, &ctx);
                    ctx.attempt += 1;
                    let delay = self.retry.delay_for(ctx.attempt);
                    warn!(
                        endpoint = ctx.endpoint,
                        kind = %info.kind,
                        error = %err,
                        "retry {}/{} after {}ms",
                        ctx.attempt,
                        self.retry.max_retries,
                        delay.as_millis()
                    );
                    self.metrics.record_retry(&info.kind.to_string());
                    tokio::time::sleep(delay).await;
                    continue;
                }
            };

            let value = match T::deserialize(&response.body) {
                Ok(value) => value,
                Err(e) => {
                    return self
                        .fail(&ctx, ClientError::Deserialization(e.to_string()))
                        .await
                }
            };
            for interceptor in &self.interceptors {
                interceptor.on_success(&ctx, &response).await;
            }
            enter(RequestState::Succeeded, &ctx);
            self.metrics.record_request(ctx.method.as_str(), "success");
            return Ok(value);
        }
    }

    async fn attempt(
        &self,
        ctx: &RequestContext,
        url: &str,
        body: Option<&Value>,
    ) -> std::result::Result<TransportResponse, AttemptError> {
        let mut request = TransportRequest {
            method: ctx.method.clone(),
            url: url.to_string(),
            headers: self.session.headers(ctx.options.skip_auth),
            query: ctx.options.query.clone(),
            body: body.cloned(),
            timeout: ctx.options.timeout.unwrap_or(self.timeout),
        };

        for interceptor in &self.interceptors {
            interceptor
                .before(ctx, &mut request)
                .await
                .map_err(AttemptError::Rejected)?;
        }

        self.transport
            .send(request)
            .await
            .map_err(AttemptError::Transport)
    }

    async fn fail<T>(&self, ctx: &RequestContext, err: ClientError) -> Result<T> {
        enter(RequestState::Failed, ctx);

        let outcome = self.handler.handle(&err).await;
        debug!(
            endpoint = ctx.endpoint,
            should_retry = outcome.should_retry,
            "system error handler finished"
        );

        for interceptor in &self.interceptors {
            interceptor.on_error(ctx, &err).await;
        }

        if !ctx.options.skip_auth && !ctx.options.silent {
            let status = err.status().unwrap_or(500);
            self.sink
                .notify(Notification::from_response(&error_payload(&err), Some(status)));
        }

        self.metrics.record_request(ctx.method.as_str(), "failure");
        Err(err)
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

fn enter(state: RequestState, ctx: &RequestContext) {
    trace!(
        state = %state,
        method = %ctx.method,
        endpoint = ctx.endpoint,
        attempt = ctx.attempt,
        "request state"
    );
}

// `()` and other null-serializing values mean "no body"
fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Option<Value>> {
    let value =
        serde_json::to_value(body).map_err(|e| ClientError::Serialization(e.to_string()))?;
    Ok(Some(value).filter(|v| !v.is_null()))
}
