pub mod api;
pub mod auth;
pub mod backoff;
pub mod classify;
pub mod config;
mod error;
pub mod handler;
pub mod interceptor;
pub mod message;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod rate_limit;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub use api::{AuthApi, PermissionsApi, UsersApi};
pub use auth::{AuthSession, CredentialError, CredentialStore, MemoryCredentialStore};
pub use classify::{classify, TransportErrorInfo, TransportErrorKind};
pub use config::{ClientConfig, ConfigError, RateLimitSettings, RetrySettings};
pub use error::{ClientError, Result};
pub use handler::{DefaultErrorHandler, HandlerOutcome, Navigator, SystemErrorHandler};
pub use message::{normalize_backend_message, pick_toast_type, NormalizedMessage, ToastVariant};
pub use notify::{Notification, NotificationSink, TracingSink};
pub use pipeline::{Pipeline, RequestOptions};

use auth::DynCredentialStore;
use handler::{DynErrorHandler, DynNavigator, NoopNavigator};
use interceptor::{DynInterceptor, RateLimitInterceptor};
use metrics::Metrics;
use notify::DynNotificationSink;
use rate_limit::RateLimiter;
use transport::{DynTransport, ReqwestTransport};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the back-office admin API.
#[derive(Debug, Clone)]
pub struct Client {
    pipeline: Arc<Pipeline>,
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    pub fn from_config(config: &ClientConfig) -> ClientBuilder {
        let builder = ClientBuilder::new(config.base_url())
            .retry(config.retry)
            .timeout(config.timeout());
        match config.rate_limit {
            Some(limit) => builder.rate_limit(limit),
            None => builder,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn session(&self) -> &Arc<AuthSession> {
        self.pipeline.session()
    }

    pub fn metrics(&self) -> &Metrics {
        self.pipeline.metrics()
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.pipeline)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(&self.pipeline)
    }

    pub fn permissions(&self) -> PermissionsApi<'_> {
        PermissionsApi::new(&self.pipeline)
    }
}

/// Assembles a [`Client`]. Every collaborator has a headless default: the
/// reqwest transport, in-memory credentials, log-only notifications and a
/// navigator that goes nowhere.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    transport: Option<DynTransport>,
    credentials: Option<DynCredentialStore>,
    navigator: Option<DynNavigator>,
    sink: Option<DynNotificationSink>,
    handler: Option<DynErrorHandler>,
    interceptors: Vec<DynInterceptor>,
    retry: RetrySettings,
    timeout: Duration,
    rate_limit: Option<RateLimitSettings>,
}

impl ClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            transport: None,
            credentials: None,
            navigator: None,
            sink: None,
            handler: None,
            interceptors: Vec::new(),
            retry: RetrySettings::default(),
            timeout: DEFAULT_TIMEOUT,
            rate_limit: None,
        }
    }

    pub fn transport(mut self, transport: DynTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn credentials(mut self, store: DynCredentialStore) -> Self {
        self.credentials = Some(store);
        self
    }

    pub fn navigator(mut self, navigator: DynNavigator) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn sink(mut self, sink: DynNotificationSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replace the default system error handler.
    pub fn handler(mut self, handler: DynErrorHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Interceptors run in registration order.
    pub fn interceptor(mut self, interceptor: DynInterceptor) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn retry(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn rate_limit(mut self, limit: RateLimitSettings) -> Self {
        self.rate_limit = Some(limit);
        self
    }

    pub fn build(self) -> Client {
        debug!(base_url = self.base_url, "build api client");

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));
        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));
        let session = Arc::new(AuthSession::new(credentials));
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator));
        let handler = self.handler.unwrap_or_else(|| {
            Arc::new(DefaultErrorHandler::new(
                session.clone(),
                navigator,
                sink.clone(),
            ))
        });

        let mut interceptors = self.interceptors;
        if let Some(limit) = self.rate_limit {
            interceptors.insert(
                0,
                Arc::new(RateLimitInterceptor::new(
                    Arc::new(RateLimiter::new()),
                    limit.rule(),
                )),
            );
        }

        let pipeline = Pipeline {
            base_url: self.base_url,
            transport,
            session,
            handler,
            sink,
            interceptors,
            retry: self.retry,
            timeout: self.timeout,
            metrics: Metrics::new(),
        };

        Client {
            pipeline: Arc::new(pipeline),
        }
    }
}
