//! Error codes for fireauth HTTP responses.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in problem-details responses.

use core::fmt;

/// Centralized error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Client input
    /// Authentication endpoints only accept POST
    PostRequired,
    /// Email or password missing or empty
    MissingCredentials,
    /// Request body could not be parsed
    MalformedBody,

    // Authentication
    /// Identity provider rejected the credentials or is unavailable
    IdentityProviderRejected,

    // Authorization
    /// No token in any carrier
    NoAccessToken,
    /// Token could not be decoded
    TokenMalformed,
    /// Token signature did not verify under the pinned algorithm and key
    TokenBadSignature,
    /// Token is past its expiry or maximum age
    TokenExpired,
    /// Token was issued by someone else
    TokenIssuerMismatch,
    /// Authorization required but no decoded payload on the request
    Unauthorized,

    // System
    /// Key material could not be loaded or persisted
    KeyMaterial,
    /// Configuration error
    ConfigError,
    /// Internal server error
    Internal,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PostRequired => "POST_REQUIRED",
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::MalformedBody => "MALFORMED_BODY",

            Self::IdentityProviderRejected => "IDENTITY_PROVIDER_REJECTED",

            Self::NoAccessToken => "NO_ACCESS_TOKEN",
            Self::TokenMalformed => "TOKEN_MALFORMED",
            Self::TokenBadSignature => "TOKEN_BAD_SIGNATURE",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenIssuerMismatch => "TOKEN_ISSUER_MISMATCH",
            Self::Unauthorized => "UNAUTHORIZED",

            Self::KeyMaterial => "KEY_MATERIAL",
            Self::ConfigError => "CONFIG_ERROR",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
