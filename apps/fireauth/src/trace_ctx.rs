//! Per-request trace id, carried in a tokio task-local.
//!
//! `RequestTrace` opens the scope; problem details and security events read
//! it back. Work moved onto another task (`web::block`, `tokio::spawn`) does
//! not inherit the scope.

use std::future::Future;

use tokio::task_local;

const UNKNOWN: &str = "unknown";

task_local! {
    static TRACE_ID: String;
}

/// The current trace id, if a request scope is active.
pub fn current() -> Option<String> {
    TRACE_ID.try_with(Clone::clone).ok()
}

/// The current trace id, or `"unknown"` outside a request.
pub fn trace_id() -> String {
    current().unwrap_or_else(|| UNKNOWN.to_string())
}

/// Run `future` with `trace_id` in scope.
pub async fn with_trace_id<F>(trace_id: String, future: F) -> F::Output
where
    F: Future,
{
    TRACE_ID.scope(trace_id, future).await
}
