use std::collections::HashMap;

use actix_web::http::{header, Method};
use actix_web::{web, HttpMessage, HttpRequest};

use crate::auth::claims::DecodedPayload;
use crate::identity::Identity;
use crate::AppError;

/// Per-request state threaded through every step.
///
/// The inputs (`method` through `authorization`) are filled once by
/// [`RequestContext::from_request`]; the outputs start empty and are
/// attached by steps as the pipeline progresses.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub method: Method,
    /// String-valued top-level fields of a JSON or form body
    pub body: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub query: HashMap<String, String>,
    /// Raw `Authorization` header value
    pub authorization: Option<String>,

    pub identity: Option<Identity>,
    pub token: Option<String>,
    pub decoded_payload: Option<DecodedPayload>,
    pub user_id: Option<String>,
    pub err: Option<AppError>,
}

impl RequestContext {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Parse everything the pipelines read out of an actix request.
    ///
    /// A body that declares JSON or form encoding but does not parse is a
    /// client error; any other content type is ignored.
    pub fn from_request(req: &HttpRequest, body: &[u8]) -> Result<Self, AppError> {
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let cookies = req
            .cookies()
            .map(|jar| {
                jar.iter()
                    .map(|c| (c.name().to_string(), c.value().to_string()))
                    .collect()
            })
            .unwrap_or_default();

        let query = web::Query::<HashMap<String, String>>::from_query(req.query_string())
            .map(web::Query::into_inner)
            .unwrap_or_default();

        Ok(Self {
            method: req.method().clone(),
            body: parse_body(req.content_type(), body)?,
            cookies,
            query,
            authorization,
            ..Self::default()
        })
    }

    pub fn with_body_field(mut self, name: &str, value: &str) -> Self {
        self.body.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_query_param(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_authorization(mut self, value: &str) -> Self {
        self.authorization = Some(value.to_string());
        self
    }

    /// A body field, treating empty strings as absent.
    pub fn body_field(&self, name: &str) -> Option<&str> {
        non_empty(self.body.get(name))
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        non_empty(self.cookies.get(name))
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        non_empty(self.query.get(name))
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Whether a body of this content type is parsed into [`RequestContext::body`].
/// Bodies of any other type are never read.
pub fn has_parsed_body(content_type: &str) -> bool {
    content_type.eq_ignore_ascii_case(JSON) || content_type.eq_ignore_ascii_case(FORM)
}

fn parse_body(content_type: &str, body: &[u8]) -> Result<HashMap<String, String>, AppError> {
    if body.is_empty() {
        return Ok(HashMap::new());
    }

    match content_type.to_ascii_lowercase().as_str() {
        JSON => {
            let value: serde_json::Value = serde_json::from_slice(body)
                .map_err(|e| AppError::malformed_body(format!("Invalid JSON body: {e}")))?;
            let fields = match value {
                serde_json::Value::Object(map) => map
                    .into_iter()
                    .filter_map(|(k, v)| match v {
                        serde_json::Value::String(s) => Some((k, s)),
                        _ => None,
                    })
                    .collect(),
                _ => HashMap::new(),
            };
            Ok(fields)
        }
        FORM => {
            let raw = std::str::from_utf8(body)
                .map_err(|_| AppError::malformed_body("Form body is not valid UTF-8"))?;
            web::Query::<HashMap<String, String>>::from_query(raw)
                .map(web::Query::into_inner)
                .map_err(|e| AppError::malformed_body(format!("Invalid form body: {e}")))
        }
        _ => Ok(HashMap::new()),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn parses_json_body_keeping_string_fields() {
        let req = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .to_http_request();
        let ctx = RequestContext::from_request(
            &req,
            br#"{"email":"a@b.com","password":"x","age":3}"#,
        )
        .unwrap();

        assert_eq!(ctx.method, Method::POST);
        assert_eq!(ctx.body_field("email"), Some("a@b.com"));
        assert_eq!(ctx.body_field("password"), Some("x"));
        assert_eq!(ctx.body_field("age"), None);
    }

    #[test]
    fn parses_form_body() {
        let req = TestRequest::post()
            .insert_header((
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded; charset=utf-8",
            ))
            .to_http_request();
        let ctx =
            RequestContext::from_request(&req, b"email=a%40b.com&password=x&token=").unwrap();

        assert_eq!(ctx.body_field("email"), Some("a@b.com"));
        assert_eq!(ctx.body_field("token"), None);
    }

    #[test]
    fn invalid_json_is_a_client_error() {
        let req = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .to_http_request();
        let err = RequestContext::from_request(&req, b"{not json").unwrap_err();
        assert_eq!(err.status().as_u16(), 400);
    }

    #[test]
    fn only_json_and_form_bodies_are_parsed() {
        assert!(has_parsed_body("application/json"));
        assert!(has_parsed_body("Application/X-WWW-Form-Urlencoded"));
        assert!(!has_parsed_body("application/octet-stream"));
        assert!(!has_parsed_body(""));
    }

    #[test]
    fn unknown_content_type_is_ignored() {
        let req = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .to_http_request();
        let ctx = RequestContext::from_request(&req, b"email=a@b.com").unwrap();
        assert!(ctx.body.is_empty());
    }

    #[test]
    fn reads_header_cookies_and_query() {
        let req = TestRequest::get()
            .uri("/private?token=from-query&x=1")
            .insert_header((header::AUTHORIZATION, "Bearer abc"))
            .insert_header((header::COOKIE, "token=from-cookie; other=1"))
            .to_http_request();
        let ctx = RequestContext::from_request(&req, b"").unwrap();

        assert_eq!(ctx.authorization.as_deref(), Some("Bearer abc"));
        assert_eq!(ctx.cookie("token"), Some("from-cookie"));
        assert_eq!(ctx.query_param("token"), Some("from-query"));
    }
}
