//! The tool-call resolution loop.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ConversationDriver`] | Sends history to the model, runs requested tools, loops until a text answer |
//! | [`DriverState`] | `AwaitingUserInput → Requesting → {ExecutingTools → Requesting}* → Done` |
//! | [`Toolset`] | Built-in profiles: chat, weather, files |
//! | [`AgentEvent`] / [`EventSink`] | Progress reporting |
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use gemini_tool_agent::agent::ConversationDriver;
//! use gemini_tool_agent::client::ModelReply;
//! use gemini_tool_agent::testing::ScriptedEndpoint;
//! use gemini_tool_agent::tools::ToolRegistry;
//!
//! # tokio_test_block(async {
//! let endpoint = Arc::new(ScriptedEndpoint::new(vec![Ok(ModelReply::text("Hi there"))]));
//! let mut driver = ConversationDriver::new(endpoint, ToolRegistry::weather());
//! assert_eq!(driver.send("Hello").await.unwrap(), "Hi there");
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod driver;
mod events;
mod toolset;

pub use driver::{ConversationDriver, DriverSettings, DriverState, DEFAULT_MAX_TOOL_ROUNDS};
pub use events::{noop_sink, AgentEvent, EventSink, InMemoryEventSink, NoopEventSink};
pub use toolset::Toolset;
