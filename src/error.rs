use crate::error_code::StandardErrorCode;
use crate::transport::TransportError;
use thiserror::Error;

/// Where a configuration problem came from, shown after the message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Offending key, e.g. `max_tool_rounds` or an env var name.
    pub field_path: Option<String>,
    pub details: Option<String>,
    /// Layer that produced the value: `config_file`, `environment`, `tool_registry`...
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(self, path: impl Into<String>) -> Self {
        Self {
            field_path: Some(path.into()),
            ..self
        }
    }

    pub fn with_details(self, details: impl Into<String>) -> Self {
        Self {
            details: Some(details.into()),
            ..self
        }
    }

    pub fn with_source(self, source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..self
        }
    }
}

/// Unified error type for the agent runtime.
///
/// Only `ConfigMissing` and `Configuration` are fatal; every other variant is
/// either reported to the interactive user or folded into a tool result.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Model unavailable ({code} {}): {message}", .code.name())]
    ModelUnavailable {
        code: StandardErrorCode,
        message: String,
    },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid argument '{argument}' for {tool}: {message}")]
    InvalidArgument {
        tool: String,
        argument: String,
        message: String,
    },

    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("Tool {name} failed: {message}")]
    ToolFailed { name: String, message: String },

    #[error("Tool loop exceeded {limit} rounds without a final answer")]
    ToolLoopExceeded { limit: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let parts: Vec<String> = [
        ("field", &ctx.field_path),
        ("details", &ctx.details),
        ("source", &ctx.source),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|v| format!("{label}: {v}")))
    .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn model_unavailable(code: StandardErrorCode, msg: impl Into<String>) -> Self {
        Error::ModelUnavailable {
            code,
            message: msg.into(),
        }
    }

    pub fn invalid_argument(
        tool: impl Into<String>,
        argument: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Error::InvalidArgument {
            tool: tool.into(),
            argument: argument.into(),
            message: msg.into(),
        }
    }

    /// Context attached to a `Configuration` error.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Errors that must stop the process before the interactive loop starts.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ConfigMissing { .. } | Error::Configuration { .. })
    }

    /// Short machine-readable kind, used in tool error payloads and events.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ConfigMissing { .. } => "config_missing",
            Error::Configuration { .. } => "configuration",
            Error::ModelUnavailable { .. } => "model_unavailable",
            Error::UnknownTool { .. } => "unknown_tool",
            Error::InvalidArgument { .. } => "invalid_argument",
            Error::NotFound { .. } => "not_found",
            Error::ToolFailed { .. } => "tool_failed",
            Error::ToolLoopExceeded { .. } => "tool_loop_exceeded",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
        }
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::ModelUnavailable {
            code: err.classify(),
            message: err.to_string(),
        }
    }
}
