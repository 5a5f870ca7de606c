//! Model endpoint client.
//!
//! Keep the public surface small and predictable. Implementation details are
//! split into submodules under `src/client/`.

pub mod builder;
pub mod core;
pub mod endpoint;

pub use builder::{GeminiClientBuilder, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
pub use self::core::GeminiClient;
pub use endpoint::{ModelEndpoint, ModelReply, ModelRequest};
