use crate::client::core::GeminiClient;
use crate::drivers::GeminiDriver;
use crate::error::ErrorContext;
use crate::transport::HttpTransport;
use crate::{Error, Result};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builder for creating clients with custom configuration.
///
/// Keep this surface area small and predictable.
pub struct GeminiClientBuilder {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClientBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the endpoint base URL (primarily for testing with mock servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Per-request timeout; exceeding it is reported as `ModelUnavailable`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<GeminiClient> {
        if self.api_key.trim().is_empty() {
            return Err(Error::ConfigMissing {
                key: "API_KEY".into(),
            });
        }
        if self.model.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "model name must not be empty",
                ErrorContext::new()
                    .with_field_path("model")
                    .with_source("client_builder"),
            ));
        }

        let transport =
            HttpTransport::new(&self.base_url, self.api_key, self.timeout).map_err(|e| {
                Error::configuration_with_context(
                    e.to_string(),
                    ErrorContext::new()
                        .with_field_path("base_url")
                        .with_source("client_builder"),
                )
            })?;

        Ok(GeminiClient {
            driver: GeminiDriver::new(self.model),
            transport,
            timeout: self.timeout,
        })
    }
}
