use crate::error_code::StandardErrorCode;
use reqwest::Proxy;
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Header Gemini reads the API key from. Keeps the key out of request URLs.
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(base_url.to_string()));
        }

        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("AI_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body and decode the JSON response.
    ///
    /// Non-2xx responses become [`TransportError::Status`], carrying the
    /// provider's `error.message` / `error.status` when the body has them.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TransportError::from_error_body(status.as_u16(), &text));
        }

        Ok(response.json().await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        provider_status: Option<String>,
        message: String,
    },

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    fn from_error_body(status: u16, text: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(text).ok();
        let error = parsed.as_ref().and_then(|v| v.get("error"));
        let message = error
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or_else(|| {
                if text.trim().is_empty() {
                    "empty response body".to_string()
                } else {
                    text.trim().to_string()
                }
            });
        let provider_status = error
            .and_then(|e| e.get("status"))
            .and_then(|s| s.as_str())
            .map(String::from);

        TransportError::Status {
            status,
            provider_status,
            message,
        }
    }

    /// Classify into a [`StandardErrorCode`]; the provider status wins over the HTTP status.
    pub fn classify(&self) -> StandardErrorCode {
        match self {
            TransportError::Http(e) if e.is_timeout() => StandardErrorCode::Timeout,
            TransportError::Http(e) if e.is_decode() => StandardErrorCode::InvalidResponse,
            TransportError::Http(e) => e
                .status()
                .map(|s| StandardErrorCode::from_http_status(s.as_u16()))
                .unwrap_or(StandardErrorCode::Unknown),
            TransportError::Status {
                status,
                provider_status,
                ..
            } => provider_status
                .as_deref()
                .and_then(StandardErrorCode::from_provider_status)
                .unwrap_or_else(|| StandardErrorCode::from_http_status(*status)),
            TransportError::InvalidUrl(_) => StandardErrorCode::InvalidRequest,
            TransportError::Other(_) => StandardErrorCode::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_parsing() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = TransportError::from_error_body(429, body);
        assert_eq!(err.to_string(), "HTTP 429: Quota exceeded");
        assert_eq!(err.classify(), StandardErrorCode::RateLimited);
    }

    #[test]
    fn test_provider_status_overrides_http_status() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"UNAUTHENTICATED"}}"#;
        let err = TransportError::from_error_body(400, body);
        assert_eq!(err.classify(), StandardErrorCode::Authentication);
    }

    #[test]
    fn test_plain_text_error_body() {
        let err = TransportError::from_error_body(503, "upstream busy\n");
        assert_eq!(err.to_string(), "HTTP 503: upstream busy");
        assert_eq!(err.classify(), StandardErrorCode::Overloaded);
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = HttpTransport::new("not a url", "key", Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.classify(), StandardErrorCode::InvalidRequest);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let transport =
            HttpTransport::new("http://localhost:1234/", "secret-key", Duration::from_secs(1))
                .unwrap();
        let dbg = format!("{transport:?}");
        assert!(!dbg.contains("secret-key"));
        assert_eq!(transport.base_url(), "http://localhost:1234");
    }
}
