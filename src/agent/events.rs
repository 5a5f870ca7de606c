//! Progress events emitted by the conversation driver.
//!
//! The default sink discards everything. The console sink lives in
//! [`crate::repl`]; [`InMemoryEventSink`] records events for tests.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

use crate::Result;

/// One step of resolving a user request. Every event carries the request id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AgentEvent {
    RequestStarted {
        request_id: String,
        text: String,
    },
    ModelResponded {
        request_id: String,
        round: u32,
        invocations: usize,
    },
    ToolInvoked {
        request_id: String,
        name: String,
        arguments: Map<String, Value>,
    },
    ToolCompleted {
        request_id: String,
        name: String,
        is_error: bool,
    },
    /// Text the model sent alongside tool invocations.
    Commentary {
        request_id: String,
        text: String,
    },
    Answered {
        request_id: String,
        text: String,
    },
    Failed {
        request_id: String,
        kind: String,
        message: String,
    },
}

impl AgentEvent {
    pub fn request_id(&self) -> &str {
        match self {
            AgentEvent::RequestStarted { request_id, .. }
            | AgentEvent::ModelResponded { request_id, .. }
            | AgentEvent::ToolInvoked { request_id, .. }
            | AgentEvent::ToolCompleted { request_id, .. }
            | AgentEvent::Commentary { request_id, .. }
            | AgentEvent::Answered { request_id, .. }
            | AgentEvent::Failed { request_id, .. } => request_id,
        }
    }
}

/// Destination for [`AgentEvent`]s.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn report(&self, event: AgentEvent) -> Result<()>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

pub struct NoopEventSink;

#[async_trait]
impl EventSink for NoopEventSink {
    async fn report(&self, _event: AgentEvent) -> Result<()> {
        Ok(())
    }
}

pub fn noop_sink() -> Arc<dyn EventSink> {
    Arc::new(NoopEventSink)
}

/// Records every event in order.
#[derive(Default)]
pub struct InMemoryEventSink {
    events: Mutex<Vec<AgentEvent>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AgentEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn events_for(&self, request_id: &str) -> Vec<AgentEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.request_id() == request_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn report(&self, event: AgentEvent) -> Result<()> {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_sink_filters_by_request() {
        let sink = InMemoryEventSink::new();
        sink.report(AgentEvent::RequestStarted {
            request_id: "a".into(),
            text: "hi".into(),
        })
        .await
        .unwrap();
        sink.report(AgentEvent::Answered {
            request_id: "b".into(),
            text: "hello".into(),
        })
        .await
        .unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.events_for("b").len(), 1);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = AgentEvent::ToolCompleted {
            request_id: "r1".into(),
            name: "get_weather".into(),
            is_error: false,
        };
        let v = serde_json::to_value(&event).unwrap();
        assert_eq!(v["event"], "tool_completed");
        assert_eq!(v["name"], "get_weather");
    }
}
