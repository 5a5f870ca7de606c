//! Classification codes for failed model calls.
//!
//! Every `ModelUnavailable` error carries one of these, so the REPL and the
//! driver can tell a throttled request from a bad key without looking at the
//! message text.
//!
//! | Prefix | Category | Meaning                                  |
//! |--------|----------|------------------------------------------|
//! | E1xxx  | client   | the request itself was rejected          |
//! | E2xxx  | rate     | throttled, try the same turn again later |
//! | E3xxx  | server   | Gemini failed or answered nonsense       |
//! | E9xxx  | unknown  | nothing better matched                   |
//!
//! ```rust
//! use gemini_tool_agent::error_code::StandardErrorCode;
//!
//! let code = StandardErrorCode::from_http_status(429);
//! assert_eq!(code.code(), "E2001");
//! assert!(code.retryable());
//! assert_eq!(code.category(), "rate");
//! ```

use std::fmt;

/// Why a call to the model endpoint did not produce a usable reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardErrorCode {
    /// Bad parameters, or a prompt the safety filter blocked.
    InvalidRequest,
    /// Missing or rejected API key.
    Authentication,
    /// The key is valid but not allowed to use this model.
    PermissionDenied,
    /// Unknown model name or endpoint path.
    NotFound,
    /// The conversation no longer fits the request size limit.
    RequestTooLarge,
    /// `RESOURCE_EXHAUSTED` / HTTP 429.
    RateLimited,
    ServerError,
    /// `UNAVAILABLE` / HTTP 503.
    Overloaded,
    Timeout,
    /// A 200 response without a candidate or with unreadable parts.
    InvalidResponse,
    Unknown,
}

struct Descriptor {
    code: &'static str,
    name: &'static str,
    category: &'static str,
}

const fn describe(code: &'static str, name: &'static str, category: &'static str) -> Descriptor {
    Descriptor {
        code,
        name,
        category,
    }
}

impl StandardErrorCode {
    fn descriptor(&self) -> Descriptor {
        use StandardErrorCode::*;
        match self {
            InvalidRequest => describe("E1001", "invalid_request", "client"),
            Authentication => describe("E1002", "authentication", "client"),
            PermissionDenied => describe("E1003", "permission_denied", "client"),
            NotFound => describe("E1004", "not_found", "client"),
            RequestTooLarge => describe("E1005", "request_too_large", "client"),
            RateLimited => describe("E2001", "rate_limited", "rate"),
            ServerError => describe("E3001", "server_error", "server"),
            Overloaded => describe("E3002", "overloaded", "server"),
            Timeout => describe("E3003", "timeout", "server"),
            InvalidResponse => describe("E3004", "invalid_response", "server"),
            Unknown => describe("E9999", "unknown", "unknown"),
        }
    }

    /// Short code such as `"E3003"`; also what `Display` prints.
    pub fn code(&self) -> &'static str {
        self.descriptor().code
    }

    /// snake_case name, used in log fields and error messages.
    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// One of `"client"`, `"rate"`, `"server"` or `"unknown"`.
    pub fn category(&self) -> &'static str {
        self.descriptor().category
    }

    /// Whether sending the same user turn again could succeed.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ServerError | Self::Overloaded | Self::Timeout
        )
    }

    /// Maps the `error.status` field of a Gemini error body.
    pub fn from_provider_status(status: &str) -> Option<Self> {
        Some(match status {
            "INVALID_ARGUMENT" | "FAILED_PRECONDITION" | "OUT_OF_RANGE" => Self::InvalidRequest,
            "UNAUTHENTICATED" => Self::Authentication,
            "PERMISSION_DENIED" => Self::PermissionDenied,
            "NOT_FOUND" => Self::NotFound,
            "RESOURCE_EXHAUSTED" => Self::RateLimited,
            "INTERNAL" | "UNKNOWN" | "DATA_LOSS" => Self::ServerError,
            "UNAVAILABLE" => Self::Overloaded,
            "DEADLINE_EXCEEDED" => Self::Timeout,
            _ => return None,
        })
    }

    /// Fallback when the body has no recognizable status.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 => Self::Authentication,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            408 | 504 => Self::Timeout,
            413 => Self::RequestTooLarge,
            429 => Self::RateLimited,
            500 => Self::ServerError,
            503 => Self::Overloaded,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for StandardErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::StandardErrorCode::*;
    use super::*;

    #[test]
    fn test_gemini_status_wins_when_known() {
        assert_eq!(
            StandardErrorCode::from_provider_status("RESOURCE_EXHAUSTED"),
            Some(RateLimited)
        );
        assert_eq!(
            StandardErrorCode::from_provider_status("DEADLINE_EXCEEDED"),
            Some(Timeout)
        );
        assert_eq!(StandardErrorCode::from_provider_status("SOMETHING_NEW"), None);
    }

    #[test]
    fn test_http_fallback() {
        assert_eq!(StandardErrorCode::from_http_status(401), Authentication);
        assert_eq!(StandardErrorCode::from_http_status(413), RequestTooLarge);
        assert_eq!(StandardErrorCode::from_http_status(504), Timeout);
        assert_eq!(StandardErrorCode::from_http_status(418), Unknown);
    }

    #[test]
    fn test_only_transient_failures_are_retryable() {
        let retryable: Vec<_> = [
            InvalidRequest,
            Authentication,
            PermissionDenied,
            NotFound,
            RequestTooLarge,
            RateLimited,
            ServerError,
            Overloaded,
            Timeout,
            InvalidResponse,
            Unknown,
        ]
        .into_iter()
        .filter(StandardErrorCode::retryable)
        .collect();
        assert_eq!(retryable, vec![RateLimited, ServerError, Overloaded, Timeout]);
    }

    #[test]
    fn test_display_and_category() {
        assert_eq!(Timeout.to_string(), "E3003");
        assert_eq!(InvalidResponse.category(), "server");
        assert_eq!(NotFound.name(), "not_found");
        assert_eq!(Unknown.to_string(), "E9999");
    }
}
