use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::auth::claims::DecodedPayload;
use crate::pipeline::RequestContext;
use crate::AppError;

/// What the `Authorize` middleware learned about a forwarded request.
///
/// Present in request extensions only when the middleware chose to call the
/// next service. On the success branch `decoded_payload` and `user_id` are
/// set; on a forwarded failure `err` holds the reason.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationState {
    pub token: Option<String>,
    pub decoded_payload: Option<DecodedPayload>,
    pub user_id: Option<String>,
    pub err: Option<AppError>,
}

impl AuthorizationState {
    pub fn is_authorized(&self) -> bool {
        self.decoded_payload.is_some() && self.err.is_none()
    }
}

impl From<RequestContext> for AuthorizationState {
    fn from(ctx: RequestContext) -> Self {
        Self {
            token: ctx.token,
            decoded_payload: ctx.decoded_payload,
            user_id: ctx.user_id,
            err: ctx.err,
        }
    }
}

impl FromRequest for AuthorizationState {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.extensions().get::<AuthorizationState>().cloned();
        ready(state.ok_or_else(|| {
            AppError::internal("AuthorizationState missing; is the Authorize middleware installed?")
        }))
    }
}

/// A verified caller. Fails with the forwarded error, or `UNAUTHORIZED` if
/// there is none, so handlers behind an `invoke_next_on_failure` guard can
/// still insist on a valid token.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub user_id: String,
    pub payload: DecodedPayload,
}

impl TryFrom<AuthorizationState> for Authorized {
    type Error = AppError;

    fn try_from(state: AuthorizationState) -> Result<Self, Self::Error> {
        match (state.decoded_payload, state.err) {
            (_, Some(err)) => Err(err),
            (Some(payload), None) => Ok(Self {
                user_id: state.user_id.unwrap_or_else(|| payload.uid.clone()),
                payload,
            }),
            (None, None) => Err(AppError::unauthorized()),
        }
    }
}

impl FromRequest for Authorized {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.extensions().get::<AuthorizationState>().cloned();
        ready(match state {
            Some(state) => Authorized::try_from(state),
            None => Err(AppError::unauthorized()),
        })
    }
}
