//! Deterministic model endpoint for tests and offline demos.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::client::{ModelEndpoint, ModelReply, ModelRequest};
use crate::error_code::StandardErrorCode;
use crate::types::{ToolDeclaration, Turn};
use crate::{Error, Result};

/// Owned copy of a [`ModelRequest`] as the endpoint received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub history: Vec<Turn>,
    pub declarations: Vec<ToolDeclaration>,
    pub instruction: Option<String>,
    pub temperature: Option<f64>,
}

/// Replays queued replies in order and records every request.
///
/// Once the script runs out every call fails with `ModelUnavailable`.
#[derive(Debug, Default)]
pub struct ScriptedEndpoint {
    replies: Mutex<VecDeque<Result<ModelReply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedEndpoint {
    pub fn new(replies: Vec<Result<ModelReply>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, reply: Result<ModelReply>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ModelEndpoint for ScriptedEndpoint {
    async fn generate(&self, request: ModelRequest<'_>) -> Result<ModelReply> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                history: request.history.to_vec(),
                declarations: request.declarations.to_vec(),
                instruction: request.instruction.map(String::from),
                temperature: request.temperature,
            });
        }
        let next = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        next.unwrap_or_else(|| {
            Err(Error::model_unavailable(
                StandardErrorCode::Unknown,
                "scripted endpoint has no more replies",
            ))
        })
    }
}
