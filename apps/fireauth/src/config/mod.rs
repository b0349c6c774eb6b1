//! Startup configuration read from the process environment.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::auth::keys::KeyPair;
use crate::AppError;

pub const KEY_FILE_VAR: &str = "FIREAUTH_KEY_FILE";
pub const HOST_VAR: &str = "FIREAUTH_HOST";
pub const PORT_VAR: &str = "FIREAUTH_PORT";

pub const DEFAULT_KEY_FILE: &str = "key/rsapair.pem";
pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone)]
pub struct FireAuthConfig {
    /// Where the key pair lives (created on first start)
    pub key_file: PathBuf,
    /// `PRIVATE_KEY` / `PUBLIC_KEY` from the environment; wins over `key_file`
    pub key_override: Option<KeyPair>,
    pub host: IpAddr,
    pub port: u16,
}

impl Default for FireAuthConfig {
    fn default() -> Self {
        Self {
            key_file: PathBuf::from(DEFAULT_KEY_FILE),
            key_override: None,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
        }
    }
}

impl FireAuthConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(path) = non_empty_var(KEY_FILE_VAR) {
            config.key_file = PathBuf::from(path);
        }
        config.key_override = KeyPair::from_env();

        if let Some(host) = non_empty_var(HOST_VAR) {
            config.host = host
                .parse()
                .map_err(|e| AppError::config(format!("{HOST_VAR}={host}: {e}")))?;
        }
        if let Some(port) = non_empty_var(PORT_VAR) {
            config.port = port
                .parse()
                .map_err(|e| AppError::config(format!("{PORT_VAR}={port}: {e}")))?;
        }

        Ok(config)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
