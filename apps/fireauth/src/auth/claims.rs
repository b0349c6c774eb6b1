//! Claims carried inside fireauth access tokens.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// The private claim embedded in every token: the provider's subject id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub uid: String,
}

impl From<&Identity> for Claim {
    fn from(identity: &Identity) -> Self {
        Self {
            uid: identity.uid.clone(),
        }
    }
}

/// Everything a verified token tells us: the private claim plus the
/// registered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedPayload {
    /// Subject id from the identity provider
    pub uid: String,
    /// Issuer, always [`crate::auth::jwt::ISSUER`] once verified
    pub iss: String,
    /// Subject: the user's email
    pub sub: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

impl DecodedPayload {
    pub fn claim(&self) -> Claim {
        Claim {
            uid: self.uid.clone(),
        }
    }
}
