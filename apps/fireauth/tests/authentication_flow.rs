mod common;
use common::{assert_problem_details_structure, auth_state, EMAIL, PASSWORD, UID};

use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use fireauth::auth::jwt::verify_access_token;
use fireauth::middleware::RequestTrace;
use fireauth::pipeline::{step_fn, AuthenticationOptions, Step};
use fireauth::AppError;
use serde_json::json;

macro_rules! auth_app {
    ($state:expr, $path:expr, $options:expr) => {
        auth_app!($state, $path, $options, Vec::new())
    };
    ($state:expr, $path:expr, $options:expr, $steps:expr) => {
        test::init_service(
            App::new().wrap(RequestTrace).route(
                $path,
                $state
                    .authenticate_user_with_email_and_password($options, $steps)
                    .into_route(),
            ),
        )
        .await
    };
}

#[actix_web::test]
async fn sign_in_with_cookie_sets_cookie_and_empty_body() {
    let state = auth_state().await;
    let app = auth_app!(state, "/signin", AuthenticationOptions::sign_in().with_cookie());

    let req = test::TestRequest::post()
        .uri("/signin")
        .set_json(json!({ "email": EMAIL, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("Set-Cookie header")
        .to_string();
    assert!(set_cookie.starts_with("token="), "got {set_cookie}");
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Expires="));

    let body = test::read_body(resp).await;
    assert!(body.is_empty());

    let token = set_cookie
        .trim_start_matches("token=")
        .split(';')
        .next()
        .unwrap_or_default();
    let payload = verify_access_token(token, &state.security()).unwrap();
    assert_eq!(payload.uid, UID);
    assert_eq!(payload.sub, EMAIL);
}

#[actix_web::test]
async fn sign_in_with_cookie_and_redirect() {
    let state = auth_state().await;
    let app = auth_app!(
        state,
        "/signin",
        AuthenticationOptions::sign_in().with_cookie().redirect_to("/home")
    );

    let req = test::TestRequest::post()
        .uri("/signin")
        .set_form([("email", EMAIL), ("password", PASSWORD)])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/home");
    assert!(resp.headers().contains_key(header::SET_COOKIE));
}

#[actix_web::test]
async fn sign_in_without_cookie_returns_token_body() {
    let state = auth_state().await;
    let app = auth_app!(state, "/signin", AuthenticationOptions::sign_in());

    let req = test::TestRequest::post()
        .uri("/signin")
        .set_json(json!({ "email": EMAIL, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!resp.headers().contains_key(header::SET_COOKIE));
    let token: String = test::read_body_json(resp).await;
    assert_eq!(verify_access_token(&token, &state.security()).unwrap().uid, UID);
}

#[actix_web::test]
async fn sign_up_then_sign_in() {
    let state = auth_state().await;
    let app = test::init_service(
        App::new()
            .wrap(RequestTrace)
            .route(
                "/signup",
                state
                    .authenticate_user_with_email_and_password(
                        AuthenticationOptions::create_account(),
                        Vec::new(),
                    )
                    .into_route(),
            )
            .route(
                "/signin",
                state
                    .authenticate_user_with_email_and_password(
                        AuthenticationOptions::sign_in(),
                        Vec::new(),
                    )
                    .into_route(),
            ),
    )
    .await;

    let creds = json!({ "email": "new@b.com", "password": "pw" });

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/signup").set_json(&creds).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: String = test::read_body_json(resp).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/signin").set_json(&creds).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let signed_in: String = test::read_body_json(resp).await;

    let security = state.security();
    let a = verify_access_token(&created, &security).unwrap();
    let b = verify_access_token(&signed_in, &security).unwrap();
    assert_eq!(a.uid, b.uid);

    // Second sign-up with the same email is a provider rejection
    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/signup").set_json(&creds).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "IDENTITY_PROVIDER_REJECTED");
    assert_eq!(body["provider_code"], "auth/email-already-in-use");
}

#[actix_web::test]
async fn get_request_requires_post() {
    let state = auth_state().await;
    let app = auth_app!(state, "/signin", AuthenticationOptions::sign_in().with_cookie());

    let req = test::TestRequest::get().uri("/signin").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(!resp.headers().contains_key(header::SET_COOKIE));
    assert_problem_details_structure(resp, 400, "POST_REQUIRED", "POST request method expected")
        .await;
}

#[actix_web::test]
async fn empty_password_is_missing_credentials() {
    let state = auth_state().await;
    let app = auth_app!(state, "/signin", AuthenticationOptions::sign_in());

    let req = test::TestRequest::post()
        .uri("/signin")
        .set_json(json!({ "email": EMAIL, "password": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_problem_details_structure(
        resp,
        400,
        "MISSING_CREDENTIALS",
        "non-empty email and password expected",
    )
    .await;
}

#[actix_web::test]
async fn malformed_json_is_rejected() {
    let state = auth_state().await;
    let app = auth_app!(state, "/signin", AuthenticationOptions::sign_in());

    let req = test::TestRequest::post()
        .uri("/signin")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"email\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "MALFORMED_BODY");
}

#[actix_web::test]
async fn wrong_password_is_401_without_cookie() {
    let state = auth_state().await;
    let app = auth_app!(state, "/signin", AuthenticationOptions::sign_in().with_cookie());

    let req = test::TestRequest::post()
        .uri("/signin")
        .set_json(json!({ "email": EMAIL, "password": "nope" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(!resp.headers().contains_key(header::SET_COOKIE));
}

#[actix_web::test]
async fn caller_steps_see_token_and_can_fail() {
    let state = auth_state().await;
    let steps: Vec<Arc<dyn Step>> = vec![
        Arc::new(step_fn("require_token", |ctx| {
            assert!(ctx.token.is_some());
            assert_eq!(ctx.user_id.as_deref(), Some(UID));
            Ok(())
        })),
        Arc::new(step_fn("deny", |_ctx| Err(AppError::unauthorized()))),
    ];
    let app = auth_app!(state, "/signin", AuthenticationOptions::sign_in().with_cookie(), steps);

    let req = test::TestRequest::post()
        .uri("/signin")
        .set_json(json!({ "email": EMAIL, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(!resp.headers().contains_key(header::SET_COOKIE));
    assert_problem_details_structure(resp, 401, "UNAUTHORIZED", "Authentication required").await;
}
