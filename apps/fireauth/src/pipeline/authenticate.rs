//! Authentication pipeline: credentials in, signed token out.
//!
//! Steps, in order: body parsing (framework adapter), [`ValidateCredentials`],
//! [`CallIdentityProvider`], [`IssueToken`], caller-supplied steps, then the
//! success [`ResponseStrategy`]. Any failure ends in a problem-details
//! response from the failure strategy.

use std::sync::Arc;

use actix_web::http::Method;
use actix_web::{web, HttpRequest, HttpResponse, Route};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use super::response::{ResponsePayload, ResponseStrategy};
use super::{Pipeline, RequestContext, Step};
use crate::auth::jwt::issue_token;
use crate::identity::IdentityProvider;
use crate::logging::security;
use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// Build-time options for an authentication endpoint.
#[derive(Debug, Clone, Default)]
pub struct AuthenticationOptions {
    /// Create an account instead of signing in to an existing one
    pub create_new_account: bool,
    /// Deliver the token as an HTTP-only cookie instead of a JSON body
    pub respond_with_cookie: bool,
    /// Where to send the client after the cookie is set (cookie mode only)
    pub redirect_path: Option<String>,
}

impl AuthenticationOptions {
    pub fn sign_in() -> Self {
        Self::default()
    }

    pub fn create_account() -> Self {
        Self {
            create_new_account: true,
            ..Self::default()
        }
    }

    pub fn with_cookie(mut self) -> Self {
        self.respond_with_cookie = true;
        self
    }

    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect_path = Some(path.into());
        self
    }
}

/// Requires POST with non-empty `email` and `password` body fields.
pub struct ValidateCredentials;

#[async_trait]
impl Step for ValidateCredentials {
    fn name(&self) -> &'static str {
        "validate_credentials"
    }

    async fn call(&self, ctx: &mut RequestContext) -> Result<(), AppError> {
        require_post(&ctx.method)?;
        if ctx.body_field("email").is_none() || ctx.body_field("password").is_none() {
            return Err(AppError::missing_credentials());
        }
        Ok(())
    }
}

fn require_post(method: &Method) -> Result<(), AppError> {
    if *method != Method::POST {
        return Err(AppError::post_required());
    }
    Ok(())
}

/// Creates an account or signs in through the identity provider. Provider
/// rejections are final; nothing here retries.
pub struct CallIdentityProvider {
    provider: Arc<dyn IdentityProvider>,
    create_new_account: bool,
}

impl CallIdentityProvider {
    pub fn new(provider: Arc<dyn IdentityProvider>, create_new_account: bool) -> Self {
        Self {
            provider,
            create_new_account,
        }
    }
}

#[async_trait]
impl Step for CallIdentityProvider {
    fn name(&self) -> &'static str {
        "call_identity_provider"
    }

    async fn call(&self, ctx: &mut RequestContext) -> Result<(), AppError> {
        let (email, password) = match (ctx.body_field("email"), ctx.body_field("password")) {
            (Some(email), Some(password)) => (email.to_string(), password.to_string()),
            _ => return Err(AppError::missing_credentials()),
        };

        let result = if self.create_new_account {
            self.provider.create_account(&email, &password).await
        } else {
            self.provider.sign_in(&email, &password).await
        };

        match result {
            Ok(identity) => {
                ctx.identity = Some(identity);
                Ok(())
            }
            Err(e) => {
                security::login_failed(&e.code, Some(&email));
                Err(AppError::identity_provider(e.code, e.message))
            }
        }
    }
}

/// Signs a token for the identity attached by [`CallIdentityProvider`].
pub struct IssueToken {
    security: Arc<SecurityConfig>,
}

impl IssueToken {
    pub fn new(security: Arc<SecurityConfig>) -> Self {
        Self { security }
    }
}

#[async_trait]
impl Step for IssueToken {
    fn name(&self) -> &'static str {
        "issue_token"
    }

    async fn call(&self, ctx: &mut RequestContext) -> Result<(), AppError> {
        let identity = ctx
            .identity
            .as_ref()
            .ok_or_else(|| AppError::internal("No identity on request context"))?;

        let token = issue_token(identity, Arc::clone(&self.security)).await?;
        ctx.user_id = Some(identity.uid.clone());
        ctx.token = Some(token);
        Ok(())
    }
}

/// A built authentication endpoint. Options are fixed at construction.
#[derive(Clone)]
pub struct AuthenticationPipeline {
    pipeline: Pipeline,
    on_success: ResponseStrategy,
    on_failure: ResponseStrategy,
}

impl AuthenticationPipeline {
    pub fn build(
        options: AuthenticationOptions,
        provider: Arc<dyn IdentityProvider>,
        security: Arc<SecurityConfig>,
        steps: Vec<Arc<dyn Step>>,
    ) -> Self {
        let pipeline = Pipeline::new()
            .step(ValidateCredentials)
            .step(CallIdentityProvider::new(
                provider,
                options.create_new_account,
            ))
            .step(IssueToken::new(security))
            .extend(steps);

        // Without a cookie the token must reach the client in the body, so
        // a redirect target only applies in cookie mode.
        let redirect = options
            .redirect_path
            .filter(|_| options.respond_with_cookie);

        Self {
            pipeline,
            on_success: ResponseStrategy::new(options.respond_with_cookie, redirect),
            on_failure: ResponseStrategy::body(),
        }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.pipeline.names()
    }

    pub async fn execute(&self, mut ctx: RequestContext) -> HttpResponse {
        if let Err(e) = self.pipeline.run(&mut ctx).await {
            return self.on_failure.respond(ResponsePayload::Error(e));
        }

        match ctx.token.take() {
            Some(token) => {
                info!(user_id = ctx.user_id.as_deref().unwrap_or(""), "User authenticated");
                self.on_success.respond(ResponsePayload::Token(token))
            }
            None => self.on_failure.respond(ResponsePayload::Error(AppError::internal(
                "Authentication pipeline finished without a token",
            ))),
        }
    }

    /// The method is checked before the body is parsed, so a non-POST
    /// request is always answered with `POST_REQUIRED`.
    pub async fn handle(&self, req: HttpRequest, body: Bytes) -> HttpResponse {
        if let Err(e) = require_post(req.method()) {
            return self.on_failure.respond(ResponsePayload::Error(e));
        }
        match RequestContext::from_request(&req, &body) {
            Ok(ctx) => self.execute(ctx).await,
            Err(e) => self.on_failure.respond(ResponsePayload::Error(e)),
        }
    }

    /// Mount as a route accepting every method; non-POST requests get the
    /// pipeline's own 400 rather than a router 404/405.
    pub fn into_route(self) -> Route {
        let pipeline = Arc::new(self);
        web::route().to(move |req: HttpRequest, body: web::Bytes| {
            let pipeline = Arc::clone(&pipeline);
            async move { pipeline.handle(req, body).await }
        })
    }
}
