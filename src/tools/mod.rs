//! Local tools the model may invoke.
//!
//! [`ToolRegistry`] is an explicit name → handler table. Lookups that miss
//! end in a closed `UnknownTool` branch, and every failure (panics included) is
//! folded into a [`ToolResult`] so the conversation loop always has a turn to append.

pub mod files;
pub mod weather;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ErrorContext;
use crate::types::{ToolDeclaration, ToolInvocation, ToolResult};
use crate::{Error, Result};

/// A named, schema-described local operation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Schema advertised to the model. Called once, at registration.
    fn declaration(&self) -> ToolDeclaration;

    /// Run the tool. Implementations validate their own arguments.
    async fn call(&self, args: &ToolArgs<'_>) -> Result<Value>;
}

/// Typed accessors over a tool's argument object.
///
/// Missing or mistyped values come back as `InvalidArgument` naming the tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolArgs<'a> {
    tool: &'a str,
    map: &'a Map<String, Value>,
}

impl<'a> ToolArgs<'a> {
    pub fn new(tool: &'a str, map: &'a Map<String, Value>) -> Self {
        Self { tool, map }
    }

    pub fn raw(&self) -> &'a Map<String, Value> {
        self.map
    }

    fn invalid(&self, name: &str, msg: impl Into<String>) -> Error {
        Error::invalid_argument(self.tool, name, msg)
    }

    pub fn str(&self, name: &str) -> Result<&'a str> {
        self.opt_str(name)?
            .ok_or_else(|| self.invalid(name, "required string argument is missing"))
    }

    pub fn opt_str(&self, name: &str) -> Result<Option<&'a str>> {
        match self.map.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.invalid(name, format!("expected a string, got {other}"))),
        }
    }

    /// Finite number; quoted numbers are accepted, `NaN` and infinities are not.
    pub fn number(&self, name: &str) -> Result<f64> {
        let value = match self.map.get(name) {
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| self.invalid(name, "number is out of range")),
            // Models occasionally quote numbers.
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| self.invalid(name, format!("expected a number, got \"{s}\""))),
            None | Some(Value::Null) => {
                Err(self.invalid(name, "required number argument is missing"))
            }
            Some(other) => Err(self.invalid(name, format!("expected a number, got {other}"))),
        }?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.invalid(name, "must be a finite number"))
        }
    }

    /// Parse a required string argument into a closed set of values.
    pub fn parse<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.str(name)?;
        raw.parse::<T>().map_err(|e| self.invalid(name, e.to_string()))
    }
}

/// Order-stable registry of the tools exposed to the model.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    declarations: Vec<ToolDeclaration>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.index.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock weather, location and temperature conversion tools.
    pub fn weather() -> Self {
        let mut registry = Self::new();
        registry.register_all(weather::tools());
        registry
    }

    /// List/read/write file tools rooted at `root`.
    pub fn files(root: impl Into<PathBuf>) -> Self {
        let mut registry = Self::new();
        registry.register_all(files::tools(root.into()));
        registry
    }

    fn register_all(&mut self, tools: Vec<Arc<dyn Tool>>) {
        for tool in tools {
            let registered = self.register_arc(tool);
            debug_assert!(registered.is_ok(), "built-in tool clash: {registered:?}");
            if let Err(err) = registered {
                warn!(error = %err, "skipping built-in tool");
            }
        }
    }

    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let declaration = tool.declaration();
        if self.index.contains_key(&declaration.name) {
            return Err(Error::configuration_with_context(
                format!("tool '{}' is already registered", declaration.name),
                ErrorContext::new()
                    .with_field_path(declaration.name.clone())
                    .with_source("tool_registry"),
            ));
        }
        self.index
            .insert(declaration.name.clone(), self.declarations.len());
        self.declarations.push(declaration);
        self.tools.push(tool);
        Ok(())
    }

    /// All schemas, in registration order.
    pub fn declarations(&self) -> &[ToolDeclaration] {
        &self.declarations
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch an invocation. Never fails: errors become an error payload.
    pub async fn invoke(&self, invocation: &ToolInvocation) -> ToolResult {
        match self.try_invoke(invocation).await {
            Ok(value) => {
                debug!(tool = %invocation.name, "tool succeeded");
                ToolResult::success(invocation, value)
            }
            Err(err) => {
                warn!(tool = %invocation.name, kind = err.kind(), error = %err, "tool failed");
                ToolResult::failure(invocation, &err)
            }
        }
    }

    async fn try_invoke(&self, invocation: &ToolInvocation) -> Result<Value> {
        let idx = *self
            .index
            .get(&invocation.name)
            .ok_or_else(|| Error::UnknownTool {
                name: invocation.name.clone(),
            })?;
        let tool = Arc::clone(&self.tools[idx]);
        let name = invocation.name.clone();
        let arguments = invocation.arguments.clone();

        // A panicking tool must still produce a result turn.
        tokio::spawn(async move { tool.call(&ToolArgs::new(&name, &arguments)).await })
            .await
            .map_err(|e| Error::ToolFailed {
                name: invocation.name.clone(),
                message: if e.is_panic() {
                    "tool panicked".to_string()
                } else {
                    e.to_string()
                },
            })?
    }
}
