use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use actix_web::web;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Header, Validation};
use serde::Serialize;
use thiserror::Error;

use crate::auth::claims::DecodedPayload;
use crate::identity::Identity;
use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// Issuer stamped into every token.
pub const ISSUER: &str = "fireauth";

/// Token validity: 30 days. Governs both `exp` at signing and the max-age
/// check at verification.
pub const TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Why a token was rejected.
///
/// The messages match what clients of the classic JWT libraries expect.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("jwt malformed")]
    Malformed,
    #[error("invalid signature")]
    BadSignature,
    #[error("jwt expired")]
    Expired,
    #[error("jwt issuer invalid")]
    IssuerMismatch,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            // A token whose header names another algorithm is treated as a
            // signature we refuse to check, never as a fallback.
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
            ErrorKind::InvalidIssuer => TokenError::IssuerMismatch,
            _ => TokenError::Malformed,
        }
    }
}

#[derive(Serialize)]
struct SignedClaims<'a> {
    uid: &'a str,
    iss: &'a str,
    sub: &'a str,
    iat: i64,
    exp: i64,
}

fn unix_seconds(t: SystemTime) -> Result<i64, AppError> {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .map_err(|_| AppError::internal("System clock is before the Unix epoch"))
}

/// Mint an RS256 access token for `subject_id`, with `email` as the JWT
/// subject. Deterministic for identical inputs and `now`.
pub fn mint_access_token(
    subject_id: &str,
    email: &str,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = unix_seconds(now)?;
    let exp = iat + security.token_ttl().as_secs() as i64;

    let claims = SignedClaims {
        uid: subject_id,
        iss: security.issuer(),
        sub: email,
        iat,
        exp,
    };

    encode(
        &Header::new(security.algorithm()),
        &claims,
        security.encoding_key(),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
}

/// Verify a token's signature, issuer, expiry and age.
///
/// Only the configured algorithm is accepted, whatever the token header
/// claims.
pub fn verify_access_token(
    token: &str,
    security: &SecurityConfig,
) -> Result<DecodedPayload, TokenError> {
    let mut validation = Validation::new(security.algorithm());
    validation.set_issuer(&[security.issuer()]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.leeway = 0;

    let payload = decode::<DecodedPayload>(token, security.decoding_key(), &validation)?.claims;

    let now = unix_seconds(SystemTime::now()).map_err(|_| TokenError::Malformed)?;
    let age = now - payload.iat;
    if age < 0 {
        return Err(TokenError::Malformed);
    }
    if age > security.token_ttl().as_secs() as i64 {
        return Err(TokenError::Expired);
    }

    Ok(payload)
}

/// Issue a token for a freshly authenticated identity without blocking the
/// reactor.
pub async fn issue_token(
    identity: &Identity,
    security: Arc<SecurityConfig>,
) -> Result<String, AppError> {
    let uid = identity.uid.clone();
    let email = identity.email.clone();
    web::block(move || mint_access_token(&uid, &email, SystemTime::now(), &security)).await?
}

/// Verify a token on the blocking pool. Failures come back as 401-class
/// [`AppError`]s carrying the [`TokenError`] classification in their code.
pub async fn verify_token(
    token: &str,
    security: Arc<SecurityConfig>,
) -> Result<DecodedPayload, AppError> {
    let token = token.to_string();
    let result = web::block(move || verify_access_token(&token, &security)).await?;
    result.map_err(AppError::from)
}
