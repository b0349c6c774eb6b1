pub mod authorization;

pub use authorization::{AuthorizationState, Authorized};
