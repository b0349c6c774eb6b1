use std::fmt;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use crate::auth::jwt::{ISSUER, TOKEN_TTL};
use crate::auth::keys::{KeyMaterialError, KeyPair};

/// Configuration for token signing and verification.
///
/// Built once at startup from a [`KeyPair`]; the PEM keys are parsed here so
/// a bad key fails construction instead of the first request.
#[derive(Clone)]
pub struct SecurityConfig {
    keys: KeyPair,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Pinned signing algorithm; tokens with any other `alg` are rejected
    algorithm: Algorithm,
    /// Issuer stamped into and required of every token
    issuer: String,
    /// Validity window, used for both `exp` and the max-age check
    token_ttl: Duration,
}

impl SecurityConfig {
    pub fn from_key_pair(keys: KeyPair) -> Result<Self, KeyMaterialError> {
        let encoding_key = EncodingKey::from_rsa_pem(keys.private_key.as_bytes())
            .map_err(|e| KeyMaterialError::InvalidPem(format!("private key: {e}")))?;
        let decoding_key = DecodingKey::from_rsa_pem(keys.public_key.as_bytes())
            .map_err(|e| KeyMaterialError::InvalidPem(format!("public key: {e}")))?;

        Ok(Self {
            keys,
            encoding_key,
            decoding_key,
            algorithm: Algorithm::RS256,
            issuer: ISSUER.to_string(),
            token_ttl: TOKEN_TTL,
        })
    }

    /// Override the issuer. Only useful for tests and multi-tenant setups.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.keys
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("keys", &self.keys)
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::primary_keys;

    #[test]
    fn defaults_pin_rs256_and_issuer() {
        let security = SecurityConfig::from_key_pair(primary_keys()).unwrap();
        assert_eq!(security.algorithm(), Algorithm::RS256);
        assert_eq!(security.issuer(), ISSUER);
        assert_eq!(security.token_ttl(), TOKEN_TTL);
    }

    #[test]
    fn token_lifetime_matches_cookie_lifetime() {
        let security = SecurityConfig::from_key_pair(primary_keys()).unwrap();
        assert_eq!(
            security.token_ttl().as_secs() as i64,
            crate::pipeline::response::COOKIE_TTL.whole_seconds()
        );
    }

    #[test]
    fn issuer_override_keeps_algorithm_pinned() {
        let security = SecurityConfig::from_key_pair(primary_keys())
            .unwrap()
            .with_issuer("someone-else");
        assert_eq!(security.issuer(), "someone-else");
        assert_eq!(security.algorithm(), Algorithm::RS256);
    }

    #[test]
    fn rejects_garbage_pem() {
        let err = SecurityConfig::from_key_pair(KeyPair::new("nope", "nope")).unwrap_err();
        assert!(matches!(err, KeyMaterialError::InvalidPem(_)));
    }
}
