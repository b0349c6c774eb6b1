//! Authorization pipeline: locate and verify the caller's token, then
//! either answer the request or let it through.
//!
//! Branch resolution:
//!
//! | outcome | `redirect_on_*` set | `invoke_next_on_*` | result |
//! |---------|---------------------|--------------------|--------|
//! | success | yes                 | any                | 302    |
//! | success | no                  | true               | forward |
//! | success | no                  | false              | 200 JSON payload |
//! | failure | yes                 | any                | 302    |
//! | failure | no                  | true               | forward with `err` |
//! | failure | no                  | false              | 401 problem details |

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse};
use async_trait::async_trait;

use super::locator::LocateToken;
use super::response::{ResponsePayload, ResponseStrategy};
use super::{Pipeline, RequestContext, Step};
use crate::auth::jwt::verify_token;
use crate::logging::security;
use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// Build-time options for a protected scope.
#[derive(Debug, Clone)]
pub struct AuthorizationOptions {
    pub redirect_on_success: Option<String>,
    pub redirect_on_failure: Option<String>,
    /// Forward verified requests downstream instead of answering with the
    /// decoded payload
    pub invoke_next_on_success: bool,
    /// Forward rejected requests downstream with the error attached
    /// instead of answering 401
    pub invoke_next_on_failure: bool,
}

impl Default for AuthorizationOptions {
    fn default() -> Self {
        Self {
            redirect_on_success: None,
            redirect_on_failure: None,
            invoke_next_on_success: true,
            invoke_next_on_failure: false,
        }
    }
}

impl AuthorizationOptions {
    pub fn redirect_on_success(mut self, target: impl Into<String>) -> Self {
        self.redirect_on_success = Some(target.into());
        self
    }

    pub fn redirect_on_failure(mut self, target: impl Into<String>) -> Self {
        self.redirect_on_failure = Some(target.into());
        self
    }

    pub fn invoke_next_on_success(mut self, forward: bool) -> Self {
        self.invoke_next_on_success = forward;
        self
    }

    pub fn invoke_next_on_failure(mut self, forward: bool) -> Self {
        self.invoke_next_on_failure = forward;
        self
    }
}

/// Verifies the located token and attaches `decoded_payload` and `user_id`.
pub struct VerifyToken {
    security: Arc<SecurityConfig>,
}

impl VerifyToken {
    pub fn new(security: Arc<SecurityConfig>) -> Self {
        Self { security }
    }
}

#[async_trait]
impl Step for VerifyToken {
    fn name(&self) -> &'static str {
        "verify_token"
    }

    async fn call(&self, ctx: &mut RequestContext) -> Result<(), AppError> {
        let token = ctx.token.as_deref().ok_or_else(AppError::no_access_token)?;
        let payload = verify_token(token, Arc::clone(&self.security)).await?;
        ctx.user_id = Some(payload.uid.clone());
        ctx.decoded_payload = Some(payload);
        Ok(())
    }
}

/// What the hosting middleware should do with the request.
#[derive(Debug)]
pub enum Outcome {
    /// Call the next service; the context carries the result
    Forward,
    /// Answer now
    Respond(HttpResponse),
}

#[derive(Clone)]
pub struct AuthorizationPipeline {
    pipeline: Pipeline,
    options: AuthorizationOptions,
    on_success: ResponseStrategy,
    on_failure: ResponseStrategy,
}

impl AuthorizationPipeline {
    pub fn build(options: AuthorizationOptions, security: Arc<SecurityConfig>) -> Self {
        let pipeline = Pipeline::new()
            .step(LocateToken)
            .step(VerifyToken::new(security));

        Self {
            pipeline,
            on_success: ResponseStrategy::new(false, options.redirect_on_success.clone()),
            on_failure: ResponseStrategy::new(false, options.redirect_on_failure.clone()),
            options,
        }
    }

    pub fn options(&self) -> &AuthorizationOptions {
        &self.options
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.pipeline.names()
    }

    /// Parse the request and evaluate it. The returned context is what the
    /// forward branch hands downstream.
    pub async fn execute(&self, req: &HttpRequest, body: &[u8]) -> (RequestContext, Outcome) {
        match RequestContext::from_request(req, body) {
            Ok(mut ctx) => {
                let outcome = self.evaluate(&mut ctx).await;
                (ctx, outcome)
            }
            Err(e) => self.execute_error(req, e),
        }
    }

    /// Route a failure that happened before the steps could run (for example
    /// while reading the body) through the failure branch.
    pub fn execute_error(&self, req: &HttpRequest, err: AppError) -> (RequestContext, Outcome) {
        let mut ctx = RequestContext::new(req.method().clone());
        let outcome = self.reject(&mut ctx, err);
        (ctx, outcome)
    }

    pub async fn evaluate(&self, ctx: &mut RequestContext) -> Outcome {
        match self.pipeline.run(ctx).await {
            Ok(()) => self.accept(ctx),
            Err(e) => self.reject(ctx, e),
        }
    }

    fn accept(&self, ctx: &mut RequestContext) -> Outcome {
        if self.options.redirect_on_success.is_some() || !self.options.invoke_next_on_success {
            let payload = match ctx.decoded_payload.clone() {
                Some(decoded) => ResponsePayload::Decoded(decoded),
                None => ResponsePayload::Error(AppError::internal(
                    "Authorization succeeded without a decoded payload",
                )),
            };
            return Outcome::Respond(self.on_success.respond(payload));
        }
        Outcome::Forward
    }

    fn reject(&self, ctx: &mut RequestContext, err: AppError) -> Outcome {
        let forward =
            self.options.redirect_on_failure.is_none() && self.options.invoke_next_on_failure;
        security::authorization_denied(err.code(), forward);

        if forward {
            ctx.err = Some(err);
            return Outcome::Forward;
        }
        Outcome::Respond(self.on_failure.respond(ResponsePayload::Error(err)))
    }
}
