//! Authorization middleware
//!
//! Runs an [`AuthorizationPipeline`] in front of the wrapped service. On the
//! forward branch the request continues with an [`AuthorizationState`] in
//! its extensions; otherwise the pipeline's response is returned and the
//! wrapped service never runs.

use std::rc::Rc;
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage};
use bytes::BytesMut;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use futures_util::StreamExt;

use crate::extractors::AuthorizationState;
use crate::pipeline::context::has_parsed_body;
use crate::pipeline::{AuthorizationPipeline, Outcome};
use crate::AppError;

/// JSON and form bodies beyond this go to the failure branch. Other content
/// types are not buffered and have no limit here.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

#[derive(Clone)]
pub struct Authorize {
    pipeline: Arc<AuthorizationPipeline>,
}

impl Authorize {
    pub fn new(pipeline: AuthorizationPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authorize
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthorizeMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizeMiddleware {
            service: Rc::new(service),
            pipeline: Arc::clone(&self.pipeline),
        }))
    }
}

pub struct AuthorizeMiddleware<S> {
    service: Rc<S>,
    pipeline: Arc<AuthorizationPipeline>,
}

impl<S, B> Service<ServiceRequest> for AuthorizeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let pipeline = Arc::clone(&self.pipeline);

        Box::pin(async move {
            let (ctx, outcome) = if has_parsed_body(req.content_type()) {
                match read_body(&mut req).await {
                    Ok(body) => {
                        let evaluated = pipeline.execute(req.request(), &body).await;
                        restore_body(&mut req, body);
                        evaluated
                    }
                    Err(err) => pipeline.execute_error(req.request(), err),
                }
            } else {
                // Other bodies are never inspected; the payload stays in place
                pipeline.execute(req.request(), &[]).await
            };

            match outcome {
                Outcome::Respond(response) => Ok(req.into_response(response).map_into_right_body()),
                Outcome::Forward => {
                    req.extensions_mut().insert(AuthorizationState::from(ctx));
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
            }
        })
    }
}

/// Hand the buffered body back so downstream extractors can still read it.
fn restore_body(req: &mut ServiceRequest, body: BytesMut) {
    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(body.freeze());
    req.set_payload(actix_http::Payload::from(payload));
}

async fn read_body(req: &mut ServiceRequest) -> Result<BytesMut, AppError> {
    let mut payload = req.take_payload();
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::malformed_body(e.to_string()))?;
        if body.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(AppError::malformed_body("Request body too large"));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
