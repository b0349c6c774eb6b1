//! Error handling for fireauth.

pub mod error_code;

pub use error_code::ErrorCode;
