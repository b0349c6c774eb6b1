use actix_web::error::{BlockingError, ResponseError};
use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::auth::jwt::TokenError;
use crate::auth::keys::KeyMaterialError;
use crate::errors::ErrorCode;
use crate::trace_ctx;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_code: Option<String>,
}

/// Every failure a pipeline step can produce.
///
/// Variants are cheap to clone so the authorization pipeline can hand the
/// same error to request-scoped state and to its own logging.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Unauthorized: {detail}")]
    Unauthorized { code: ErrorCode, detail: String },
    #[error("Identity provider error: {detail}")]
    IdentityProvider {
        provider_code: String,
        detail: String,
    },
    #[error("Key material error: {detail}")]
    KeyMaterial { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::BadRequest { code, .. } => *code,
            AppError::Unauthorized { code, .. } => *code,
            AppError::IdentityProvider { .. } => ErrorCode::IdentityProviderRejected,
            AppError::KeyMaterial { .. } => ErrorCode::KeyMaterial,
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Internal { .. } => ErrorCode::Internal,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            AppError::BadRequest { detail, .. }
            | AppError::Unauthorized { detail, .. }
            | AppError::IdentityProvider { detail, .. }
            | AppError::KeyMaterial { detail }
            | AppError::Config { detail }
            | AppError::Internal { detail } => detail,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::IdentityProvider { .. } => StatusCode::UNAUTHORIZED,
            AppError::KeyMaterial { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn post_required() -> Self {
        Self::BadRequest {
            code: ErrorCode::PostRequired,
            detail: "POST request method expected".to_string(),
        }
    }

    pub fn missing_credentials() -> Self {
        Self::BadRequest {
            code: ErrorCode::MissingCredentials,
            detail: "non-empty email and password expected".to_string(),
        }
    }

    pub fn malformed_body(detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code: ErrorCode::MalformedBody,
            detail: detail.into(),
        }
    }

    pub fn identity_provider(provider_code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::IdentityProvider {
            provider_code: provider_code.into(),
            detail: detail.into(),
        }
    }

    pub fn no_access_token() -> Self {
        Self::Unauthorized {
            code: ErrorCode::NoAccessToken,
            detail: "No Access token provided!".to_string(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized {
            code: ErrorCode::Unauthorized,
            detail: "Authentication required".to_string(),
        }
    }

    pub fn key_material(detail: impl Into<String>) -> Self {
        Self::KeyMaterial {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        let code = match e {
            TokenError::Malformed => ErrorCode::TokenMalformed,
            TokenError::BadSignature => ErrorCode::TokenBadSignature,
            TokenError::Expired => ErrorCode::TokenExpired,
            TokenError::IssuerMismatch => ErrorCode::TokenIssuerMismatch,
        };
        AppError::Unauthorized {
            code,
            detail: e.to_string(),
        }
    }
}

impl From<KeyMaterialError> for AppError {
    fn from(e: KeyMaterialError) -> Self {
        AppError::key_material(e.to_string())
    }
}

impl From<BlockingError> for AppError {
    fn from(e: BlockingError) -> Self {
        AppError::internal(format!("blocking task failed: {e}"))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().as_str();
        let trace_id = trace_ctx::trace_id();

        let provider_code = match self {
            AppError::IdentityProvider { provider_code, .. } => Some(provider_code.clone()),
            _ => None,
        };

        let problem_details = ProblemDetails {
            type_: format!("https://fireauth.dev/errors/{code}"),
            title: Self::humanize_code(code),
            status: status.as_u16(),
            detail: self.detail().to_string(),
            code: code.to_string(),
            trace_id: trace_id.clone(),
            provider_code,
        };

        let mut builder = HttpResponse::build(status);
        builder
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id));
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(problem_details)
    }
}
