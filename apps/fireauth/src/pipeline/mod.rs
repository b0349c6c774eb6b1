//! Request pipelines: ordered steps over one [`RequestContext`].
//!
//! Every step returns `Result<(), AppError>`. The first `Err` stops the
//! pipeline and goes to that pipeline's failure [`ResponseStrategy`]; no
//! step writes a response itself.

pub mod authenticate;
pub mod authorize;
pub mod context;
pub mod locator;
pub mod response;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::AppError;

pub use authenticate::{
    AuthenticationOptions, AuthenticationPipeline, CallIdentityProvider, IssueToken,
    ValidateCredentials,
};
pub use authorize::{AuthorizationOptions, AuthorizationPipeline, Outcome, VerifyToken};
pub use context::RequestContext;
pub use locator::{locate_token, LocateToken};
pub use response::{ResponsePayload, ResponseStrategy};

/// One unit of a pipeline.
///
/// Caller-supplied steps implement this too; they see everything earlier
/// steps attached to the context and may add to it.
#[async_trait]
pub trait Step: Send + Sync {
    fn name(&self) -> &'static str;

    async fn call(&self, ctx: &mut RequestContext) -> Result<(), AppError>;
}

/// Adapter turning a plain closure into a [`Step`].
pub struct FnStep<F> {
    name: &'static str,
    f: F,
}

pub fn step_fn<F>(name: &'static str, f: F) -> FnStep<F>
where
    F: Fn(&mut RequestContext) -> Result<(), AppError> + Send + Sync,
{
    FnStep { name, f }
}

#[async_trait]
impl<F> Step for FnStep<F>
where
    F: Fn(&mut RequestContext) -> Result<(), AppError> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn call(&self, ctx: &mut RequestContext) -> Result<(), AppError> {
        (self.f)(ctx)
    }
}

/// An ordered, immutable list of steps.
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn Step>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn extend(mut self, steps: impl IntoIterator<Item = Arc<dyn Step>>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order, stopping at the first failure.
    pub async fn run(&self, ctx: &mut RequestContext) -> Result<(), AppError> {
        for step in &self.steps {
            debug!(step = step.name(), "Running pipeline step");
            if let Err(e) = step.call(ctx).await {
                debug!(step = step.name(), code = %e.code(), "Pipeline step failed");
                return Err(e);
            }
        }
        Ok(())
    }
}
