//! Core data types: conversation turns, history, and tool calling primitives.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Turn`] | One entry of history: user text, assistant text, tool invocation or tool result |
//! | [`Conversation`] | Ordered, append-only history with an optional turn limit |
//! | [`ToolDeclaration`] | Schema advertised to the model for one tool |
//! | [`ToolInvocation`] | Model-issued request to run a tool |
//! | [`ToolResult`] | Locally produced answer to an invocation |
//!
//! ## Example
//!
//! ```rust
//! use gemini_tool_agent::types::{ParameterSpec, ParameterType, ToolDeclaration};
//!
//! let tool = ToolDeclaration::new("get_weather", "Gets the current weather for a location")
//!     .parameter(
//!         ParameterSpec::new("location", ParameterType::String, "The city name").required(),
//!     );
//! assert!(tool.parameters_schema().is_some());
//! ```

pub mod conversation;
pub mod tool;
pub mod turn;

pub use conversation::{Conversation, Exchange};
pub use tool::{ParameterSpec, ParameterType, ToolDeclaration, ToolInvocation, ToolOutcome, ToolResult};
pub use turn::{Role, Turn, TurnContent};
