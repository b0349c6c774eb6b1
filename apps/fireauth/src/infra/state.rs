use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::auth::keys::{ensure_key_pair, KeyPair};
use crate::config::FireAuthConfig;
use crate::error::AppError;
use crate::identity::IdentityProvider;
use crate::state::auth_state::AuthState;
use crate::state::security_config::SecurityConfig;

enum KeySource {
    Ready(SecurityConfig),
    Pair(KeyPair),
    File(PathBuf),
}

/// Builder for creating AuthState instances (used in both tests and main)
#[derive(Default)]
pub struct StateBuilder {
    keys: Option<KeySource>,
    provider: Option<Arc<dyn IdentityProvider>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.keys = Some(KeySource::Ready(security_config));
        self
    }

    pub fn with_key_pair(mut self, keys: KeyPair) -> Self {
        self.keys = Some(KeySource::Pair(keys));
        self
    }

    /// Load the key pair from `path`, generating it on first use.
    pub fn with_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.keys = Some(KeySource::File(path.into()));
        self
    }

    /// Environment keys win over the key file.
    pub fn with_config(self, config: &FireAuthConfig) -> Self {
        match &config.key_override {
            Some(keys) => self.with_key_pair(keys.clone()),
            None => self.with_key_file(config.key_file.clone()),
        }
    }

    pub fn with_identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub async fn build(self) -> Result<AuthState, AppError> {
        let provider = self
            .provider
            .ok_or_else(|| AppError::config("no identity provider configured"))?;

        let security = match self.keys {
            Some(KeySource::Ready(security)) => security,
            Some(KeySource::Pair(keys)) => {
                info!("Using key pair from environment");
                SecurityConfig::from_key_pair(keys)?
            }
            Some(KeySource::File(path)) => {
                let keys = tokio::task::spawn_blocking(move || ensure_key_pair(&path))
                    .await
                    .map_err(|e| AppError::internal(format!("key loading task failed: {e}")))??;
                SecurityConfig::from_key_pair(keys)?
            }
            None => return Err(AppError::config("no key material configured")),
        };

        Ok(AuthState::new(security, provider))
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
