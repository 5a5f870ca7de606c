use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::events::{noop_sink, AgentEvent, EventSink};
use crate::client::{ModelEndpoint, ModelRequest};
use crate::error_code::StandardErrorCode;
use crate::tools::ToolRegistry;
use crate::types::{Conversation, Turn};
use crate::{Error, Result};

pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 10;

/// Where the driver is in resolving the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    AwaitingUserInput,
    Requesting,
    ExecutingTools,
    /// Set when the text answer is committed. Internal only: `send` moves
    /// back to `AwaitingUserInput` before returning.
    Done,
}

/// Per-driver generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverSettings {
    pub instruction: Option<String>,
    pub temperature: Option<f64>,
    /// Model replies carrying invocations allowed per request.
    pub max_tool_rounds: u32,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            instruction: None,
            temperature: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

/// Drives request / execute / respond cycles until the model answers in text.
pub struct ConversationDriver {
    endpoint: Arc<dyn ModelEndpoint>,
    registry: ToolRegistry,
    conversation: Conversation,
    settings: DriverSettings,
    sink: Arc<dyn EventSink>,
    state: DriverState,
}

impl std::fmt::Debug for ConversationDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationDriver")
            .field("registry", &self.registry)
            .field("turns", &self.conversation.len())
            .field("settings", &self.settings)
            .field("state", &self.state)
            .finish()
    }
}

impl ConversationDriver {
    pub fn new(endpoint: Arc<dyn ModelEndpoint>, registry: ToolRegistry) -> Self {
        Self {
            endpoint,
            registry,
            conversation: Conversation::new(),
            settings: DriverSettings::default(),
            sink: noop_sink(),
            state: DriverState::AwaitingUserInput,
        }
    }

    pub fn with_settings(mut self, settings: DriverSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the (empty) starting conversation, e.g. to set a turn limit.
    pub fn with_conversation(mut self, conversation: Conversation) -> Self {
        self.conversation = conversation;
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Always `AwaitingUserInput` between calls to [`send`](Self::send).
    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// Resolve one user request into a final answer.
    ///
    /// On error the turns appended for this request are removed again, so
    /// the same text can be resent.
    pub async fn send(&mut self, text: &str) -> Result<String> {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("agent_request", request_id = %request_id);

        let outcome = self.resolve(&request_id, text).instrument(span).await;

        match &outcome {
            Ok(answer) => {
                emit(
                    &self.sink,
                    AgentEvent::Answered {
                        request_id: request_id.clone(),
                        text: answer.clone(),
                    },
                )
                .await;
            }
            Err(err) => {
                warn!(request_id = %request_id, kind = err.kind(), error = %err, "request failed");
                emit(
                    &self.sink,
                    AgentEvent::Failed {
                        request_id: request_id.clone(),
                        kind: err.kind().to_string(),
                        message: err.to_string(),
                    },
                )
                .await;
            }
        }

        self.state = DriverState::AwaitingUserInput;
        outcome
    }

    async fn resolve(&mut self, request_id: &str, text: &str) -> Result<String> {
        let Self {
            endpoint,
            registry,
            conversation,
            settings,
            sink,
            state,
        } = self;

        emit(
            sink,
            AgentEvent::RequestStarted {
                request_id: request_id.to_string(),
                text: text.to_string(),
            },
        )
        .await;

        let mut exchange = conversation.begin(text);
        let mut rounds: u32 = 0;

        loop {
            *state = DriverState::Requesting;
            let request = ModelRequest {
                history: exchange.history(),
                declarations: registry.declarations(),
                instruction: settings.instruction.as_deref(),
                temperature: settings.temperature,
            };
            let reply = endpoint.generate(request).await?;

            emit(
                sink,
                AgentEvent::ModelResponded {
                    request_id: request_id.to_string(),
                    round: rounds + 1,
                    invocations: reply.invocations.len(),
                },
            )
            .await;

            if !reply.has_invocations() {
                let Some(answer) = reply.text.filter(|t| !t.trim().is_empty()) else {
                    return Err(Error::model_unavailable(
                        StandardErrorCode::InvalidResponse,
                        format!(
                            "reply had neither text nor tool calls (finish reason: {})",
                            reply.finish_reason.as_deref().unwrap_or("none")
                        ),
                    ));
                };
                exchange.push(Turn::assistant(answer.clone()));
                exchange.commit();
                *state = DriverState::Done;
                info!(rounds, "request resolved");
                return Ok(answer);
            }

            if rounds >= settings.max_tool_rounds {
                return Err(Error::ToolLoopExceeded {
                    limit: settings.max_tool_rounds,
                });
            }
            rounds += 1;

            if let Some(commentary) = reply.text.filter(|t| !t.trim().is_empty()) {
                emit(
                    sink,
                    AgentEvent::Commentary {
                        request_id: request_id.to_string(),
                        text: commentary,
                    },
                )
                .await;
            }

            *state = DriverState::ExecutingTools;
            for invocation in reply.invocations {
                debug!(tool = %invocation.name, round = rounds, "executing tool");
                emit(
                    sink,
                    AgentEvent::ToolInvoked {
                        request_id: request_id.to_string(),
                        name: invocation.name.clone(),
                        arguments: invocation.arguments.clone(),
                    },
                )
                .await;

                let result = registry.invoke(&invocation).await;

                emit(
                    sink,
                    AgentEvent::ToolCompleted {
                        request_id: request_id.to_string(),
                        name: result.name.clone(),
                        is_error: result.is_error(),
                    },
                )
                .await;

                exchange.push(Turn::invocation(invocation));
                exchange.push(Turn::tool_result(result));
            }
        }
    }
}

async fn emit(sink: &Arc<dyn EventSink>, event: AgentEvent) {
    if let Err(e) = sink.report(event).await {
        warn!(error = %e, "event sink rejected event");
    }
}
