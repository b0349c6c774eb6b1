//! Finding the token a client sent.
//!
//! Carriers are checked in a fixed order and the first non-empty one wins:
//! `Authorization` header, body `token`, cookie `token`, query `token`.

use async_trait::async_trait;
use lazy_regex::regex_captures;

use super::{RequestContext, Step};
use crate::AppError;

/// Name of the body field, cookie and query parameter carrying the token.
pub const TOKEN_FIELD: &str = "token";

/// Strip a `Bearer ` prefix when the header is exactly `Bearer <token>`.
/// Anything else is returned untouched and left for verification to reject.
pub fn strip_bearer(value: &str) -> &str {
    match regex_captures!(r"^Bearer (\S+)$", value) {
        Some((_, token)) => token,
        None => value,
    }
}

pub fn locate_token(ctx: &RequestContext) -> Option<String> {
    if let Some(header) = ctx.authorization.as_deref().filter(|h| !h.is_empty()) {
        return Some(strip_bearer(header).to_string());
    }

    ctx.body_field(TOKEN_FIELD)
        .or_else(|| ctx.cookie(TOKEN_FIELD))
        .or_else(|| ctx.query_param(TOKEN_FIELD))
        .map(str::to_string)
}

/// Attaches the located token, or fails with "No Access token provided!".
pub struct LocateToken;

#[async_trait]
impl Step for LocateToken {
    fn name(&self) -> &'static str {
        "locate_token"
    }

    async fn call(&self, ctx: &mut RequestContext) -> Result<(), AppError> {
        let token = locate_token(ctx).ok_or_else(AppError::no_access_token)?;
        ctx.token = Some(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn all_carriers() -> RequestContext {
        RequestContext::default()
            .with_authorization("Bearer header-token")
            .with_body_field("token", "body-token")
            .with_cookie("token", "cookie-token")
            .with_query_param("token", "query-token")
    }

    #[test]
    fn header_wins_over_everything() {
        assert_eq!(locate_token(&all_carriers()).as_deref(), Some("header-token"));
    }

    #[test]
    fn body_wins_over_cookie_and_query() {
        let mut ctx = all_carriers();
        ctx.authorization = None;
        assert_eq!(locate_token(&ctx).as_deref(), Some("body-token"));
    }

    #[test]
    fn cookie_wins_over_query() {
        let ctx = RequestContext::default()
            .with_cookie("token", "cookie-token")
            .with_query_param("token", "query-token");
        assert_eq!(locate_token(&ctx).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn query_is_the_last_resort() {
        let ctx = RequestContext::default().with_query_param("token", "query-token");
        assert_eq!(locate_token(&ctx).as_deref(), Some("query-token"));
    }

    #[test]
    fn nothing_anywhere_is_absent() {
        assert_eq!(locate_token(&RequestContext::default()), None);
    }

    #[test]
    fn empty_values_fall_through() {
        let ctx = RequestContext::default()
            .with_body_field("token", "")
            .with_cookie("token", "cookie-token");
        assert_eq!(locate_token(&ctx).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn bearer_prefix_needs_an_exact_match() {
        assert_eq!(strip_bearer("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer("abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer("bearer abc"), "bearer abc");
        assert_eq!(strip_bearer("Bearer  abc"), "Bearer  abc");
        assert_eq!(strip_bearer("Bearer abc def"), "Bearer abc def");
        assert_eq!(strip_bearer("xBearer abc"), "xBearer abc");
    }

    #[actix_web::test]
    async fn step_fails_with_no_access_token() {
        let err = LocateToken
            .call(&mut RequestContext::default())
            .await
            .unwrap_err();
        assert_eq!(err, AppError::no_access_token());
    }

    fn carrier_value() -> impl Strategy<Value = Option<String>> {
        prop::option::of("[A-Za-z0-9_.-]{1,24}")
    }

    proptest! {
        #[test]
        fn first_present_carrier_wins(
            header in carrier_value(),
            body in carrier_value(),
            cookie in carrier_value(),
            query in carrier_value(),
        ) {
            let mut ctx = RequestContext::default();
            if let Some(v) = &header {
                ctx = ctx.with_authorization(&format!("Bearer {v}"));
            }
            if let Some(v) = &body {
                ctx = ctx.with_body_field("token", v);
            }
            if let Some(v) = &cookie {
                ctx = ctx.with_cookie("token", v);
            }
            if let Some(v) = &query {
                ctx = ctx.with_query_param("token", v);
            }

            let expected = header.or(body).or(cookie).or(query);
            prop_assert_eq!(locate_token(&ctx), expected);
        }
    }
}
