use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::Error as ActixError;
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use crate::trace_ctx;

/// One `request_completed` event per request, levelled by status class.
///
/// Wrap it inside [`super::RequestTrace`] so the trace id is in scope.
pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

struct Completed {
    method: String,
    path: String,
    status: StatusCode,
    started: Instant,
}

impl Completed {
    fn emit(&self) {
        let trace_id = trace_ctx::trace_id();
        let status = self.status.as_u16();
        let duration_us = self.started.elapsed().as_micros() as u64;

        if self.status.is_server_error() {
            error!(http.method = %self.method, url.path = %self.path, http.status_code = status, duration_us, trace_id = %trace_id, "request_completed");
        } else if self.status.is_client_error() {
            warn!(http.method = %self.method, url.path = %self.path, http.status_code = status, duration_us, trace_id = %trace_id, "request_completed");
        } else {
            info!(http.method = %self.method, url.path = %self.path, http.status_code = status, duration_us, trace_id = %trace_id, "request_completed");
        }
    }
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let mut completed = Completed {
            method: req.method().to_string(),
            path: req.path().to_string(),
            status: StatusCode::OK,
            started: Instant::now(),
        };
        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;
            completed.status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            completed.emit();
            result
        })
    }
}
