use roaya_client::{CredentialError, CredentialStore};
use tracing::warn;

use crate::config::{load_config, save_config};

/// Keeps the bearer token in the user's confy config file so it survives
/// between invocations.
#[derive(Debug, Default)]
pub struct ConfigCredentialStore;

impl ConfigCredentialStore {
    fn update(&self, token: Option<String>) -> Result<(), CredentialError> {
        let mut cfg = load_config().map_err(|e| CredentialError::Store(format!("{e:#}")))?;
        cfg.token = token;
        save_config(&cfg).map_err(|e| CredentialError::Store(format!("{e:#}")))
    }
}

impl CredentialStore for ConfigCredentialStore {
    fn token(&self) -> Option<String> {
        match load_config() {
            Ok(cfg) => cfg.token,
            Err(e) => {
                warn!(error = %e, "fail read stored token");
                None
            }
        }
    }

    fn set_token(&self, token: &str) -> Result<(), CredentialError> {
        self.update(Some(token.to_string()))
    }

    fn clear(&self) -> Result<(), CredentialError> {
        self.update(None)
    }
}
