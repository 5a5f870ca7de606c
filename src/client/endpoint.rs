//! The model endpoint seam.
//!
//! The conversation driver only knows this trait; [`GeminiClient`](super::GeminiClient)
//! is the production implementation and
//! [`ScriptedEndpoint`](crate::testing::ScriptedEndpoint) the deterministic one.

use async_trait::async_trait;

use crate::drivers::UsageInfo;
use crate::types::{ToolDeclaration, ToolInvocation, Turn};
use crate::Result;

/// Everything sent to the model for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    /// Ordered history, fed verbatim on every call.
    pub history: &'a [Turn],
    pub declarations: &'a [ToolDeclaration],
    pub instruction: Option<&'a str>,
    pub temperature: Option<f64>,
}

/// Model response: free text and/or tool invocations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: Option<String>,
    pub invocations: Vec<ToolInvocation>,
    pub finish_reason: Option<String>,
    pub usage: Option<UsageInfo>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            finish_reason: Some("stop".into()),
            ..Self::default()
        }
    }

    pub fn invocations(invocations: Vec<ToolInvocation>) -> Self {
        Self {
            invocations,
            ..Self::default()
        }
    }

    pub fn has_invocations(&self) -> bool {
        !self.invocations.is_empty()
    }
}

/// Opaque request/response collaborator that produces model replies.
///
/// Any failure (network, HTTP status, malformed body, timeout) must be
/// reported as [`Error::ModelUnavailable`](crate::Error::ModelUnavailable).
#[async_trait]
pub trait ModelEndpoint: Send + Sync {
    async fn generate(&self, request: ModelRequest<'_>) -> Result<ModelReply>;
}
