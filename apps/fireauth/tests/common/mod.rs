#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::{CONTENT_TYPE, WWW_AUTHENTICATE};
use actix_web::http::StatusCode;
use actix_web::test;
use fireauth::auth::keys::KeyPair;
use fireauth::identity::InMemoryIdentityProvider;
use fireauth::infra::state::build_state;
use fireauth::state::AuthState;
use fireauth_test_support::problem_details::{
    assert_problem_details_from_parts, ProblemDetailsLike,
};

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    fireauth_test_support::logging::init();
}

pub const EMAIL: &str = "a@b.com";
pub const PASSWORD: &str = "x";
pub const UID: &str = "uid-a";

pub fn primary_keys() -> KeyPair {
    KeyPair::new(
        include_str!("../fixtures/primary_public.pem"),
        include_str!("../fixtures/primary_private.pem"),
    )
}

pub fn secondary_keys() -> KeyPair {
    KeyPair::new(
        include_str!("../fixtures/secondary_public.pem"),
        include_str!("../fixtures/secondary_private.pem"),
    )
}

/// State signing with the primary fixture keys and one seeded account.
pub async fn auth_state() -> AuthState {
    auth_state_with(primary_keys()).await
}

pub async fn auth_state_with(keys: KeyPair) -> AuthState {
    let provider = InMemoryIdentityProvider::new().with_account(UID, EMAIL, PASSWORD);
    build_state()
        .with_key_pair(keys)
        .with_identity_provider(Arc::new(provider))
        .build()
        .await
        .expect("build auth state from fixture keys")
}

/// Validate that a response follows the ProblemDetails structure and that
/// the body trace_id matches the x-trace-id header.
pub async fn assert_problem_details_structure<B>(
    resp: ServiceResponse<B>,
    expected_status: u16,
    expected_code: &str,
    expected_detail: &str,
) -> ProblemDetailsLike
where
    B: MessageBody,
{
    let status = resp.status();
    let headers = resp.headers().clone();

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("application/problem+json"),
        "Content-Type must be application/problem+json (got {content_type})"
    );

    // 401 advertises the Bearer scheme; nothing else does
    assert_eq!(
        headers.contains_key(WWW_AUTHENTICATE),
        expected_status == 401,
        "WWW-Authenticate presence mismatch for status {expected_status}"
    );

    let body = test::read_body(resp).await;
    let expected_status =
        StatusCode::from_u16(expected_status).expect("expected status should be valid");
    assert_problem_details_from_parts(
        status,
        &headers,
        &body,
        expected_status,
        expected_code,
        expected_detail,
    )
}
