//! Conversation turns.

use serde::{Deserialize, Serialize};

use super::tool::{ToolInvocation, ToolResult};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    ToolResult,
}

/// Turn payload: free text or one half of a tool call/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnContent {
    Text { text: String },
    Invocation { invocation: ToolInvocation },
    Result { result: ToolResult },
}

/// One exchange unit in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text { text: text.into() },
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Text { text: text.into() },
        }
    }

    /// A model-issued tool invocation, attributed to the assistant.
    pub fn invocation(invocation: ToolInvocation) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Invocation { invocation },
        }
    }

    pub fn tool_result(result: ToolResult) -> Self {
        Self {
            role: Role::ToolResult,
            content: TurnContent::Result { result },
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            TurnContent::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_invocation(&self) -> Option<&ToolInvocation> {
        match &self.content {
            TurnContent::Invocation { invocation } => Some(invocation),
            _ => None,
        }
    }

    pub fn as_result(&self) -> Option<&ToolResult> {
        match &self.content {
            TurnContent::Result { result } => Some(result),
            _ => None,
        }
    }

    /// True for a plain user text turn, the only valid start of a request.
    pub fn is_user_text(&self) -> bool {
        self.role == Role::User && matches!(self.content, TurnContent::Text { .. })
    }
}
