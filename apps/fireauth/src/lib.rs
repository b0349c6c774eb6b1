#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod config;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod identity;
pub mod infra;
pub mod logging;
pub mod middleware;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod trace_ctx;

#[cfg(test)]
mod test_support;

// Re-exports for public API
pub use auth::claims::{Claim, DecodedPayload};
pub use auth::jwt::{issue_token, mint_access_token, verify_access_token, verify_token};
pub use auth::keys::{ensure_key_pair, KeyPair};
pub use config::FireAuthConfig;
pub use error::AppError;
pub use errors::ErrorCode;
pub use extractors::{AuthorizationState, Authorized};
pub use identity::{Identity, IdentityProvider, InMemoryIdentityProvider, ProviderError};
pub use infra::state::build_state;
pub use middleware::{Authorize, RequestTrace, StructuredLogger};
pub use pipeline::{
    AuthenticationOptions, AuthenticationPipeline, AuthorizationOptions, AuthorizationPipeline,
    RequestContext, Step,
};
pub use state::{AuthState, SecurityConfig};

// Prelude for test convenience
pub mod prelude {
    pub use super::auth::*;
    pub use super::error::*;
    pub use super::errors::*;
    pub use super::extractors::*;
    pub use super::identity::*;
    pub use super::infra::state::*;
    pub use super::middleware::{Authorize, RequestTrace, StructuredLogger};
    pub use super::pipeline::*;
    pub use super::state::*;
}

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    fireauth_test_support::logging::init();
}
