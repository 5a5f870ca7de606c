//! Runtime configuration: optional YAML file, then environment overrides.
//!
//! Precedence (highest first): command-line flags (applied by the binary),
//! environment variables, the YAML file, built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::agent::{DriverSettings, Toolset, DEFAULT_MAX_TOOL_ROUNDS};
use crate::client::{GeminiClient, GeminiClientBuilder, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use crate::error::ErrorContext;
use crate::{Error, Result};

/// Environment variables checked for the API credential, in order.
pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    pub toolset: Toolset,
    pub model: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub max_tool_rounds: u32,
    pub temperature: Option<f64>,
    pub max_history_turns: Option<usize>,
    /// Root for the file tools; the process working directory when unset.
    pub workdir: Option<PathBuf>,
    pub system_instruction: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            toolset: Toolset::default(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            temperature: None,
            max_history_turns: None,
            workdir: None,
            system_instruction: None,
        }
    }
}

impl AgentConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid YAML: {e}"),
                ErrorContext::new().with_source("config_file"),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read config file: {e}"),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("config_file"),
            )
        })?;
        Self::from_yaml_str(&text)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("GEMINI_MODEL") {
            self.model = v;
        }
        if let Some(v) = get("GEMINI_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = get("AI_HTTP_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_env("AI_HTTP_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("AGENT_MAX_TOOL_ROUNDS") {
            self.max_tool_rounds = parse_env("AGENT_MAX_TOOL_ROUNDS", &v)?;
        }
        if let Some(v) = get("AGENT_TEMPERATURE") {
            self.temperature = Some(parse_env("AGENT_TEMPERATURE", &v)?);
        }
        if let Some(v) = get("AGENT_MAX_HISTORY_TURNS") {
            self.max_history_turns = Some(parse_env("AGENT_MAX_HISTORY_TURNS", &v)?);
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &str, msg: &str| {
            Err(Error::configuration_with_context(
                msg,
                ErrorContext::new().with_field_path(field),
            ))
        };
        if self.model.trim().is_empty() {
            return invalid("model", "must not be empty");
        }
        if self.request_timeout_secs == 0 {
            return invalid("request_timeout_secs", "must be at least 1");
        }
        if self.max_tool_rounds == 0 {
            return invalid("max_tool_rounds", "must be at least 1");
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return invalid("temperature", "must be between 0.0 and 2.0");
            }
        }
        if self.max_history_turns == Some(0) {
            return invalid("max_history_turns", "must be at least 1");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn driver_settings(&self) -> DriverSettings {
        DriverSettings {
            instruction: self.system_instruction.clone(),
            temperature: self.temperature,
            max_tool_rounds: self.max_tool_rounds,
        }
    }

    pub fn build_client(&self, credentials: &Credentials) -> Result<GeminiClient> {
        GeminiClientBuilder::new(credentials.api_key())
            .model(&self.model)
            .base_url(&self.base_url)
            .timeout(self.request_timeout())
            .build()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        Error::configuration_with_context(
            format!("cannot parse '{value}'"),
            ErrorContext::new()
                .with_field_path(key)
                .with_source("environment"),
        )
    })
}

/// API credential, read once at startup.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        API_KEY_VARS
            .iter()
            .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
            .map(|v| Self::new(v.trim()))
            .ok_or_else(|| Error::ConfigMissing {
                key: API_KEY_VARS[0].to_string(),
            })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}
