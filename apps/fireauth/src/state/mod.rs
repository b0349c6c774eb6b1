pub mod auth_state;
pub mod security_config;

pub use auth_state::AuthState;
pub use security_config::SecurityConfig;
