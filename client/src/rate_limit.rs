//! Client side fixed-window rate limiting.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRule {
    pub max_requests: u32,
    pub window: Duration,
    pub message: Option<String>,
}

impl RateLimitRule {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn login() -> Self {
        Self::new(5, Duration::from_secs(300))
            .with_message("too many login attempts, try again in 5 minutes")
    }

    pub fn api() -> Self {
        Self::new(60, Duration::from_secs(60))
            .with_message("too many requests, try again in a minute")
    }

    pub fn search() -> Self {
        Self::new(20, Duration::from_secs(60))
            .with_message("too many searches, try again in a minute")
    }

    pub fn upload() -> Self {
        Self::new(10, Duration::from_secs(300))
            .with_message("too many uploads, try again in 5 minutes")
    }

    pub fn export() -> Self {
        Self::new(5, Duration::from_secs(300))
            .with_message("too many exports, try again in 5 minutes")
    }
}

impl Default for RateLimitRule {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(60))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: Instant,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub requests: u32,
    pub reset_at: Instant,
}

#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, WindowState>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, key: &str, rule: &RateLimitRule) -> RateLimitStatus {
        self.check_at(key, rule, Instant::now())
    }

    /// Count one request against `key`. A new window opens on the first
    /// request or once the previous window has elapsed.
    pub fn check_at(&self, key: &str, rule: &RateLimitRule, now: Instant) -> RateLimitStatus {
        let mut windows = self.windows.lock().expect("lock not poisoned");
        // keys carry ids like `/admin/users/<id>`, so drop elapsed windows
        windows.retain(|k, w| k == key || w.reset_at > now);

        let state = windows
            .entry(key.to_string())
            .or_insert(WindowState {
                requests: 0,
                reset_at: now,
            });

        if now >= state.reset_at {
            *state = WindowState {
                requests: 1,
                reset_at: now + rule.window,
            };
            return RateLimitStatus {
                allowed: true,
                remaining: rule.max_requests.saturating_sub(1),
                reset_at: state.reset_at,
                message: None,
            };
        }

        state.requests = state.requests.saturating_add(1);
        if state.requests > rule.max_requests {
            let wait = state.reset_at.saturating_duration_since(now);
            let secs = wait.as_millis().div_ceil(1000);
            debug!(key = key, retry_in_secs = secs as u64, "rate limit exceeded");
            return RateLimitStatus {
                allowed: false,
                remaining: 0,
                reset_at: state.reset_at,
                message: Some(rule.message.clone().unwrap_or_else(|| {
                    format!("too many attempts, try again in {secs} seconds")
                })),
            };
        }

        RateLimitStatus {
            allowed: true,
            remaining: rule.max_requests - state.requests,
            reset_at: state.reset_at,
            message: None,
        }
    }

    pub fn reset(&self, key: &str) {
        self.windows.lock().expect("lock not poisoned").remove(key);
    }

    pub fn clear(&self) {
        self.windows.lock().expect("lock not poisoned").clear();
    }

    pub fn state(&self, key: &str) -> Option<WindowState> {
        self.windows
            .lock()
            .expect("lock not poisoned")
            .get(key)
            .copied()
    }

    /// Run `fut` only if `key` is still within its budget.
    pub async fn with_rate_limit<F, T>(&self, key: &str, rule: &RateLimitRule, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let status = self.check(key, rule);
        if !status.allowed {
            return Err(ClientError::RateLimited {
                key: key.to_string(),
                message: status
                    .message
                    .unwrap_or_else(|| "rate limit exceeded".to_string()),
            });
        }
        fut.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_allows_up_to_max() {
        let limiter = RateLimiter::new();
        let rule = RateLimitRule::new(3, Duration::from_secs(60));
        let now = Instant::now();

        let remaining: Vec<_> = (0..3)
            .map(|_| limiter.check_at("login", &rule, now).remaining)
            .collect();
        assert_eq!(remaining, vec![2, 1, 0]);

        let denied = limiter.check_at("login", &rule, now + Duration::from_secs(10));
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(
            denied.message.as_deref(),
            Some("too many attempts, try again in 50 seconds")
        );
    }

    #[test]
    fn test_window_resets_after_elapsed() {
        let limiter = RateLimiter::new();
        let rule = RateLimitRule::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_at("k", &rule, now).allowed);
        assert!(!limiter.check_at("k", &rule, now).allowed);
        let later = now + Duration::from_secs(60);
        let status = limiter.check_at("k", &rule, later);
        assert!(status.allowed);
        assert_eq!(status.reset_at, later + Duration::from_secs(60));
    }

    #[test]
    fn test_keys_are_independent_and_resettable() {
        let limiter = RateLimiter::new();
        let rule = RateLimitRule::new(1, Duration::from_secs(60));

        assert!(limiter.check("a", &rule).allowed);
        assert!(limiter.check("b", &rule).allowed);
        assert!(!limiter.check("a", &rule).allowed);

        limiter.reset("a");
        assert!(limiter.state("a").is_none());
        assert!(limiter.check("a", &rule).allowed);
        assert_eq!(limiter.state("b").unwrap().requests, 1);

        limiter.clear();
        assert!(limiter.state("b").is_none());
    }

    #[test]
    fn test_presets() {
        assert_eq!(RateLimitRule::login().max_requests, 5);
        assert_eq!(RateLimitRule::api().window, Duration::from_secs(60));
        assert_eq!(RateLimitRule::search().max_requests, 20);
        assert_eq!(RateLimitRule::upload().max_requests, 10);
        assert_eq!(RateLimitRule::export().window, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_with_rate_limit_rejects() {
        let limiter = RateLimiter::new();
        let rule = RateLimitRule::export();

        for _ in 0..5 {
            let value = limiter
                .with_rate_limit("export", &rule, async { Ok(7) })
                .await
                .unwrap();
            assert_eq!(value, 7);
        }
        let err = limiter
            .with_rate_limit("export", &rule, async { Ok(7) })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::RateLimited { .. }));
    }

    #[test]
    fn test_elapsed_windows_are_dropped() {
        let limiter = RateLimiter::new();
        let rule = RateLimitRule::new(5, Duration::from_secs(60));
        let now = Instant::now();

        limiter.check_at("api_/admin/users/1", &rule, now);
        limiter.check_at("api_/admin/users/2", &rule, now + Duration::from_secs(30));
        limiter.check_at("api_/admin/users/3", &rule, now + Duration::from_secs(61));

        assert!(limiter.state("api_/admin/users/1").is_none());
        assert!(limiter.state("api_/admin/users/2").is_some());
        assert!(limiter.state("api_/admin/users/3").is_some());
    }
}
