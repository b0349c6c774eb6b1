//! Terminal step of every pipeline branch.

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{HttpResponse, ResponseError};
use time::OffsetDateTime;

use super::locator::TOKEN_FIELD;
use crate::auth::claims::DecodedPayload;
use crate::AppError;

/// Lifetime of the `token` cookie; matches the token's own validity.
pub const COOKIE_TTL: time::Duration = time::Duration::days(30);

/// What a branch hands to its strategy.
#[derive(Debug)]
pub enum ResponsePayload {
    Token(String),
    Decoded(DecodedPayload),
    Error(AppError),
}

/// Decides how a pipeline branch ends the request.
///
/// - cookie mode with a token: `Set-Cookie: token=...; HttpOnly`, then a
///   302 to the redirect target if one is set, else an empty 200
/// - otherwise, with a redirect target: a 302 and nothing else
/// - otherwise: the payload as the body (JSON token string, JSON decoded
///   payload, or problem details for errors)
#[derive(Debug, Clone, Default)]
pub struct ResponseStrategy {
    respond_with_cookie: bool,
    redirect: Option<String>,
}

impl ResponseStrategy {
    pub fn new(respond_with_cookie: bool, redirect: Option<String>) -> Self {
        Self {
            respond_with_cookie,
            redirect,
        }
    }

    /// Plain body responses, no cookie and no redirect.
    pub fn body() -> Self {
        Self::default()
    }

    pub fn redirect_to(target: impl Into<String>) -> Self {
        Self::new(false, Some(target.into()))
    }

    pub fn respond(&self, payload: ResponsePayload) -> HttpResponse {
        match payload {
            ResponsePayload::Token(token) if self.respond_with_cookie => {
                let cookie = token_cookie(&token, OffsetDateTime::now_utc());
                match &self.redirect {
                    Some(target) => HttpResponse::Found()
                        .cookie(cookie)
                        .insert_header((header::LOCATION, target.as_str()))
                        .finish(),
                    None => HttpResponse::Ok().cookie(cookie).finish(),
                }
            }
            payload => match &self.redirect {
                Some(target) => redirect(target),
                None => body(payload),
            },
        }
    }
}

/// Persistent, HTTP-only `token` cookie expiring [`COOKIE_TTL`] after `now`.
pub fn token_cookie(token: &str, now: OffsetDateTime) -> Cookie<'static> {
    Cookie::build(TOKEN_FIELD, token.to_string())
        .path("/")
        .http_only(true)
        .expires(now + COOKIE_TTL)
        .finish()
}

fn redirect(target: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, target))
        .finish()
}

fn body(payload: ResponsePayload) -> HttpResponse {
    match payload {
        ResponsePayload::Token(token) => HttpResponse::Ok().json(token),
        ResponsePayload::Decoded(decoded) => HttpResponse::Ok().json(decoded),
        ResponsePayload::Error(err) => err.error_response(),
    }
}
