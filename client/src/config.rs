use figment::{
    providers::{Env, Format, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

use crate::backoff::{backoff, backoff_with_jitter};
use crate::rate_limit::RateLimitRule;

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 500;
const DEFAULT_MAX_DELAY_MS: u64 = 5000;
const ENV_PREFIX: &str = "ROAYA_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unexpected file extension '{0}'")]
    Extension(String),
    #[error("failed to parse path")]
    Path,
    #[error(transparent)]
    Figment(#[from] figment::Error),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Unset unless a file or `ROAYA_BASE_URL` provides one; see [`ClientConfig::base_url`].
    pub base_url: Option<String>,
    pub log: Option<String>,
    #[serde(default = "timeout_default")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub retry: RetrySettings,
    pub rate_limit: Option<RateLimitSettings>,
}

fn timeout_default() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            log: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry: RetrySettings::default(),
            rate_limit: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct RetrySettings {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            jitter: false,
        }
    }
}

impl RetrySettings {
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Wait before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.jitter {
            backoff_with_jitter(attempt, self.base_delay(), self.max_delay())
        } else {
            backoff(attempt, self.base_delay(), self.max_delay())
        }
    }
}

/// Budget applied per endpoint by the rate-limit interceptor.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl RateLimitSettings {
    pub fn rule(&self) -> RateLimitRule {
        RateLimitRule::new(self.max_requests, Duration::from_secs(self.window_secs))
    }
}

impl ClientConfig {
    /// Defaults, then the optional toml/yaml file, then `ROAYA_` variables
    /// (nested keys separated by `__`, e.g. `ROAYA_RETRY__MAX_RETRIES`).
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let figment = Figment::from(Serialized::defaults(ClientConfig::default()));
        let figment = match path {
            None => figment,
            Some(path) => match path.extension().and_then(OsStr::to_str) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                Some(ext) => return Err(ConfigError::Extension(ext.to_string())),
                None => return Err(ConfigError::Path),
            },
        };

        let config: ClientConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }

    /// Configured API root, or the local development default.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn log_level(&self) -> LevelFilter {
        match self
            .log
            .to_owned()
            .unwrap_or_else(|| "INFO".to_string())
            .to_uppercase()
            .as_str()
        {
            "TRACE" => LevelFilter::TRACE,
            "DEBUG" => LevelFilter::DEBUG,
            "WARN" => LevelFilter::WARN,
            "ERROR" => LevelFilter::ERROR,
            "INFO" => LevelFilter::INFO,
            _ => LevelFilter::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = ClientConfig::load(None).expect("load defaults");
            assert_eq!(config, ClientConfig::default());
            assert!(config.base_url.is_none());
            assert_eq!(config.base_url(), DEFAULT_BASE_URL);
            assert_eq!(config.retry.max_retries, 3);
            assert_eq!(config.timeout(), Duration::from_secs(30));
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_and_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "client.toml",
                r#"
                base_url = "https://api.example.com"
                log = "debug"

                [retry]
                max_retries = 5

                [rate_limit]
                max_requests = 60
                window_secs = 60
                "#,
            )?;
            jail.set_env("ROAYA_RETRY__BASE_DELAY_MS", "250");
            jail.set_env("ROAYA_TIMEOUT_MS", "1000");

            let config = ClientConfig::load(Some(PathBuf::from("client.toml"))).expect("load");
            assert_eq!(config.base_url(), "https://api.example.com");
            assert_eq!(config.log_level(), LevelFilter::DEBUG);
            assert_eq!(config.retry.max_retries, 5);
            assert_eq!(config.retry.base_delay_ms, 250);
            assert_eq!(config.retry.max_delay_ms, DEFAULT_MAX_DELAY_MS);
            assert_eq!(config.timeout_ms, 1000);
            assert_eq!(
                config.rate_limit.unwrap().rule(),
                RateLimitRule::new(60, Duration::from_secs(60))
            );
            Ok(())
        });
    }

    #[test]
    fn test_base_url_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("ROAYA_BASE_URL", "http://10.0.0.3/api");
            let config = ClientConfig::load(None).expect("load");
            assert_eq!(config.base_url.as_deref(), Some("http://10.0.0.3/api"));
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file() {
        Jail::expect_with(|jail| {
            jail.create_file("client.yaml", "base_url: http://10.0.0.2/api\nretry:\n  jitter: true\n")?;
            let config = ClientConfig::load(Some(PathBuf::from("client.yaml"))).expect("load");
            assert_eq!(config.base_url(), "http://10.0.0.2/api");
            assert!(config.retry.jitter);
            Ok(())
        });
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let err = ClientConfig::load(Some(PathBuf::from("client.ini"))).unwrap_err();
        assert!(matches!(err, ConfigError::Extension(ext) if ext == "ini"));
        let err = ClientConfig::load(Some(PathBuf::from("client"))).unwrap_err();
        assert!(matches!(err, ConfigError::Path));
    }

    #[test]
    fn test_delay_for_follows_backoff() {
        let retry = RetrySettings::default();
        assert_eq!(retry.delay_for(1), Duration::from_millis(500));
        assert_eq!(retry.delay_for(2), Duration::from_millis(1000));
        assert_eq!(retry.delay_for(6), Duration::from_millis(5000));
    }

    #[test]
    fn test_log_level_fallback() {
        let config = ClientConfig {
            log: Some("verbose".to_string()),
            ..ClientConfig::default()
        };
        assert_eq!(config.log_level(), LevelFilter::INFO);
    }
}
