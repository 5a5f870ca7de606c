use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::drivers::GeminiDriver;
use crate::error_code::StandardErrorCode;
use crate::transport::HttpTransport;
use crate::{Error, Result};

use super::endpoint::{ModelEndpoint, ModelReply, ModelRequest};

/// Gemini `generateContent` client.
///
/// Pairs the wire-format driver with the HTTP transport and guards every call
/// with an explicit timeout.
#[derive(Debug)]
pub struct GeminiClient {
    pub(crate) driver: GeminiDriver,
    pub(crate) transport: HttpTransport,
    pub(crate) timeout: Duration,
}

impl GeminiClient {
    /// Create a client with default settings for the given credential and model.
    pub fn new(api_key: impl Into<String>, model: &str) -> Result<Self> {
        crate::client::builder::GeminiClientBuilder::new(api_key)
            .model(model)
            .build()
    }

    pub fn model(&self) -> &str {
        self.driver.model()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl ModelEndpoint for GeminiClient {
    async fn generate(&self, request: ModelRequest<'_>) -> Result<ModelReply> {
        let driver_req = self.driver.build_request(&request)?;
        let started = Instant::now();

        let body = tokio::time::timeout(
            self.timeout,
            self.transport.post_json(&driver_req.path, &driver_req.body),
        )
        .await
        .map_err(|_| {
            Error::model_unavailable(
                StandardErrorCode::Timeout,
                format!("no response within {}s", self.timeout.as_secs_f64()),
            )
        })??;

        let reply = self.driver.parse_response(&body)?;
        let duration_ms = started.elapsed().as_millis() as u64;

        info!(
            model = %self.driver.model(),
            duration_ms,
            invocations = reply.invocations.len(),
            finish_reason = reply.finish_reason.as_deref().unwrap_or(""),
            "generateContent completed"
        );
        if let Some(usage) = &reply.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "token usage"
            );
        }

        Ok(reply)
    }
}
