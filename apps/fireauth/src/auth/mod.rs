pub mod claims;
pub mod jwt;
pub mod keys;

pub use claims::{Claim, DecodedPayload};
pub use jwt::{
    issue_token, mint_access_token, verify_access_token, verify_token, TokenError, ISSUER,
    TOKEN_TTL,
};
pub use keys::{ensure_key_pair, KeyMaterialError, KeyPair};
