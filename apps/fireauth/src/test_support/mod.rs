//! Fixtures shared by unit tests.

use std::sync::Arc;

use crate::auth::keys::KeyPair;
use crate::state::security_config::SecurityConfig;

pub fn primary_keys() -> KeyPair {
    KeyPair::new(
        include_str!("../../tests/fixtures/primary_public.pem"),
        include_str!("../../tests/fixtures/primary_private.pem"),
    )
}

pub fn secondary_keys() -> KeyPair {
    KeyPair::new(
        include_str!("../../tests/fixtures/secondary_public.pem"),
        include_str!("../../tests/fixtures/secondary_private.pem"),
    )
}

pub fn primary_security() -> Arc<SecurityConfig> {
    Arc::new(SecurityConfig::from_key_pair(primary_keys()).unwrap())
}

pub fn secondary_security() -> Arc<SecurityConfig> {
    Arc::new(SecurityConfig::from_key_pair(secondary_keys()).unwrap())
}
