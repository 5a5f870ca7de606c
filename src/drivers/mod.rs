//! Provider wire-format drivers.
//!
//! A driver converts a [`ModelRequest`](crate::client::ModelRequest) into the
//! provider's JSON body and parses the provider's JSON back into a
//! [`ModelReply`](crate::client::ModelReply). Drivers do no I/O; the client
//! layer pairs them with [`HttpTransport`](crate::transport::HttpTransport).

pub mod gemini;

use serde_json::Value;

pub use gemini::GeminiDriver;

/// Provider-specific HTTP request, ready for the transport.
#[derive(Debug, Clone)]
pub struct DriverRequest {
    /// Path appended to the base URL (e.g. `/v1beta/models/gemini-2.0-flash:generateContent`).
    pub path: String,
    /// Serialized JSON request body.
    pub body: Value,
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageInfo {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}
