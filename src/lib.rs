//! # gemini-tool-agent
//!
//! Function-calling agent loop for the Gemini `generateContent` API.
//!
//! ## Overview
//!
//! The crate resolves a user request by repeatedly sending the conversation to
//! the model, executing the tool invocations it asks for and feeding the
//! results back, until the model answers with plain text.
//!
//! - **Explicit dispatch**: tools live in a [`ToolRegistry`] keyed by name;
//!   unknown names and tool failures become error payloads, never panics.
//! - **Owned history**: a [`Conversation`] belongs to the driver, keeps
//!   invocation/result pairs together and rolls back failed requests.
//! - **Swappable endpoint**: the driver talks to a [`ModelEndpoint`];
//!   [`GeminiClient`] speaks HTTP, [`testing::ScriptedEndpoint`] replays
//!   canned replies.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gemini_tool_agent::{ConversationDriver, GeminiClient, ToolRegistry};
//!
//! #[tokio::main]
//! async fn main() -> gemini_tool_agent::Result<()> {
//!     let client = GeminiClient::new("your-api-key", "gemini-2.0-flash")?;
//!     let mut driver = ConversationDriver::new(Arc::new(client), ToolRegistry::weather());
//!
//!     let answer = driver.send("What's the weather here, in fahrenheit?").await?;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`agent`] | Conversation driver, toolset profiles, progress events |
//! | [`tools`] | Tool trait, registry, weather and file tools |
//! | [`types`] | Turns, conversation history, tool declarations and results |
//! | [`client`] | Model endpoint trait and the Gemini client |
//! | [`drivers`] | Gemini wire format |
//! | [`transport`] | HTTP transport |
//! | [`config`] | YAML and environment configuration, credentials |
//! | [`repl`] | Interactive command-line loop |
//! | [`testing`] | Scripted endpoint for tests |

pub mod agent;
pub mod client;
pub mod config;
pub mod drivers;
pub mod error_code;
pub mod repl;
pub mod testing;
pub mod tools;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use agent::{ConversationDriver, DriverSettings, DriverState, Toolset};
pub use client::{GeminiClient, GeminiClientBuilder, ModelEndpoint, ModelReply, ModelRequest};
pub use config::{AgentConfig, Credentials};
pub use tools::{Tool, ToolArgs, ToolRegistry};
pub use types::{Conversation, ToolDeclaration, ToolInvocation, ToolResult, Turn};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
pub use error_code::StandardErrorCode;
