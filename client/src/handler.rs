//! Centralized handling of terminal request failures.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{AuthSession, LOGIN_PATH, UNAUTHORIZED_PATH};
use crate::classify::{classify, TransportErrorKind};
use crate::error::ClientError;
use crate::notify::{DynNotificationSink, Notification};

const SESSION_EXPIRED: &str = "session expired, please log in";
const ACCESS_DENIED: &str = "access denied";
const SERVER_ERROR: &str = "server error, please try again later";
const CHECK_CONNECTION: &str = "check your internet connection";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerOutcome {
    pub should_retry: bool,
}

/// Runs once per failed call after retries are over.
#[async_trait]
pub trait SystemErrorHandler: Send + Sync + Debug {
    async fn handle(&self, err: &ClientError) -> HandlerOutcome;
}

pub type DynErrorHandler = Arc<dyn SystemErrorHandler>;

/// Where the application currently is and how to move elsewhere.
#[async_trait]
pub trait Navigator: Send + Sync + Debug {
    fn current_location(&self) -> Option<String>;
    async fn navigate_to(&self, path: &str);
}

pub type DynNavigator = Arc<dyn Navigator>;

/// Navigator for headless use: remembers nothing, goes nowhere.
#[derive(Debug, Default, Clone)]
pub struct NoopNavigator;

#[async_trait]
impl Navigator for NoopNavigator {
    fn current_location(&self) -> Option<String> {
        None
    }

    async fn navigate_to(&self, path: &str) {
        debug!(path = path, "navigation requested");
    }
}

/// Handles the cross-cutting statuses: 401 ends the session (once, however
/// many requests fail together), 403 leads to the unauthorized page, 5xx and
/// connectivity failures get a generic notification.
#[derive(Debug, Clone)]
pub struct DefaultErrorHandler {
    session: Arc<AuthSession>,
    navigator: DynNavigator,
    sink: DynNotificationSink,
}

impl DefaultErrorHandler {
    pub fn new(session: Arc<AuthSession>, navigator: DynNavigator, sink: DynNotificationSink) -> Self {
        Self {
            session,
            navigator,
            sink,
        }
    }

    async fn end_session(&self) {
        let Some(_guard) = self.session.try_begin_expiry() else {
            return;
        };

        if let Some(location) = self.navigator.current_location() {
            self.session.remember_redirect(&location);
        }
        if let Err(e) = self.session.store().clear() {
            warn!(error = %e, "fail clear stored credentials");
        }
        self.sink.notify(Notification::warning(SESSION_EXPIRED));
        self.navigator.navigate_to(LOGIN_PATH).await;
    }
}

#[async_trait]
impl SystemErrorHandler for DefaultErrorHandler {
    async fn handle(&self, err: &ClientError) -> HandlerOutcome {
        match err.status() {
            Some(401) => {
                self.end_session().await;
                return HandlerOutcome::default();
            }
            Some(403) => {
                let message = err
                    .body()
                    .and_then(|b| b.get("message"))
                    .and_then(|m| m.as_str())
                    .unwrap_or(ACCESS_DENIED);
                self.sink.notify(Notification::error(message));
                self.navigator.navigate_to(UNAUTHORIZED_PATH).await;
                return HandlerOutcome::default();
            }
            Some(status) if status >= 500 => {
                self.sink.notify(Notification::error(SERVER_ERROR));
                return HandlerOutcome::default();
            }
            _ => {}
        }

        let info = classify(err);
        match info.kind {
            TransportErrorKind::Network | TransportErrorKind::Timeout => {
                self.sink.notify(Notification::error(CHECK_CONNECTION));
                HandlerOutcome {
                    should_retry: info.is_retryable,
                }
            }
            TransportErrorKind::Unknown => {
                self.sink.notify(Notification::error(info.message));
                HandlerOutcome::default()
            }
            TransportErrorKind::Http | TransportErrorKind::Abort => HandlerOutcome::default(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Navigator that records visits and takes a little while to navigate.
    #[derive(Debug, Default)]
    pub struct RecordingNavigator {
        pub location: Option<String>,
        pub visits: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        pub fn at(location: &str) -> Self {
            Self {
                location: Some(location.to_string()),
                visits: Mutex::new(Vec::new()),
            }
        }

        pub fn visits(&self) -> Vec<String> {
            self.visits.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Navigator for RecordingNavigator {
        fn current_location(&self) -> Option<String> {
            self.location.clone()
        }

        async fn navigate_to(&self, path: &str) {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.visits.lock().unwrap().push(path.to_string());
        }
    }
}
