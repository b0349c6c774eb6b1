pub mod authorize;
pub mod request_trace;
pub mod structured_logger;

pub use authorize::Authorize;
pub use request_trace::RequestTrace;
pub use structured_logger::StructuredLogger;
