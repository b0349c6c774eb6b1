use tracing::warn;

use crate::errors::ErrorCode;
use crate::logging::pii::Redacted;
use crate::trace_ctx;

/// Log a rejected sign-in or account creation.
pub fn login_failed(reason: &str, email: Option<&str>) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_LOGIN_FAILED",
        %trace_id,
        email = %email.map(Redacted).unwrap_or(Redacted("")),
        reason,
        "Authentication failure"
    );
}

/// Log a request turned away (or forwarded unauthenticated) by the
/// authorization pipeline.
pub fn authorization_denied(code: ErrorCode, forwarded: bool) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_AUTHORIZATION_DENIED",
        %trace_id,
        code = code.as_str(),
        forwarded,
        "Authorization failure"
    );
}
