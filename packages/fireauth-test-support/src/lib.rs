//! Test support utilities for the fireauth workspace
//!
//! Logging bootstrap and problem-details assertions shared by the library's
//! unit tests and its integration test binaries.

pub mod logging;
pub mod problem_details;
