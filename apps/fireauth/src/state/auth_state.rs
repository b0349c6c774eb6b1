use std::sync::Arc;

use crate::identity::IdentityProvider;
use crate::middleware::Authorize;
use crate::pipeline::{
    AuthenticationOptions, AuthenticationPipeline, AuthorizationOptions, AuthorizationPipeline,
    Step,
};

use super::security_config::SecurityConfig;

/// Entry point handed to the host application.
///
/// Holds the key material and the identity provider; every pipeline built
/// from it shares both read-only.
#[derive(Clone)]
pub struct AuthState {
    security: Arc<SecurityConfig>,
    provider: Arc<dyn IdentityProvider>,
}

impl AuthState {
    pub fn new(security: SecurityConfig, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            security: Arc::new(security),
            provider,
        }
    }

    pub fn security(&self) -> Arc<SecurityConfig> {
        Arc::clone(&self.security)
    }

    pub fn identity_provider(&self) -> Arc<dyn IdentityProvider> {
        Arc::clone(&self.provider)
    }

    /// Build a sign-up or sign-in endpoint. `steps` run after the token is
    /// issued, in order.
    pub fn authenticate_user_with_email_and_password(
        &self,
        options: AuthenticationOptions,
        steps: Vec<Arc<dyn Step>>,
    ) -> AuthenticationPipeline {
        AuthenticationPipeline::build(options, self.identity_provider(), self.security(), steps)
    }

    /// Build the guard for protected routes.
    pub fn authorize_user(&self, options: AuthorizationOptions) -> Authorize {
        Authorize::new(self.authorization_pipeline(options))
    }

    pub fn authorization_pipeline(&self, options: AuthorizationOptions) -> AuthorizationPipeline {
        AuthorizationPipeline::build(options, self.security())
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("security", &self.security)
            .finish_non_exhaustive()
    }
}
