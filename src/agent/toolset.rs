use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use super::driver::{ConversationDriver, DriverSettings};
use crate::client::ModelEndpoint;
use crate::tools::ToolRegistry;
use crate::types::Conversation;

const CHAT_PROMPT: &str = "You are a helpful, friendly and knowledgeable assistant. \
Give accurate information and keep the conversation natural. \
If you do not know something, say so instead of inventing an answer. \
Be concise but informative.";

const WEATHER_PROMPT: &str = "You are a friendly assistant with access to weather information.

Available functions:
- get_current_location: the user's current city and country
- get_weather: current weather for a location
- convert_temperature: converts between celsius and fahrenheit

Chain functions when needed:
1. When the user says \"here\" or \"my location\", call get_current_location first and pass the city to get_weather.
2. When the user wants another unit, get the weather first, then convert the temperature.
3. When comparing places, get the weather for each place before answering.

Never make up weather data; always use the functions.";

const FILES_PROMPT: &str = "You are a code assistant that helps with file operations and coding tasks.

Available functions:
- list_files: lists the entries of a directory
- read_file: reads a text file
- write_file: creates or replaces a file with the given content

Break complex requests into steps. Look at the directory before changing it and \
read a file before modifying it. New code files must be complete, imports included. \
Explain what you did.";

/// Built-in agent profiles selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolset {
    /// Plain chat, no tools.
    Chat,
    /// Mock weather tools with function chaining.
    #[default]
    Weather,
    /// File listing, reading and writing in the working directory.
    Files,
}

impl Toolset {
    pub fn registry(&self, workdir: impl Into<PathBuf>) -> ToolRegistry {
        match self {
            Toolset::Chat => ToolRegistry::new(),
            Toolset::Weather => ToolRegistry::weather(),
            Toolset::Files => ToolRegistry::files(workdir),
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Toolset::Chat => CHAT_PROMPT,
            Toolset::Weather => WEATHER_PROMPT,
            Toolset::Files => FILES_PROMPT,
        }
    }

    pub fn default_temperature(&self) -> Option<f64> {
        match self {
            Toolset::Files => Some(0.2),
            _ => None,
        }
    }

    pub fn default_history_limit(&self) -> Option<usize> {
        match self {
            Toolset::Chat => Some(10),
            _ => None,
        }
    }

    pub fn banner(&self) -> &'static str {
        match self {
            Toolset::Chat => "🤖 Welcome to your Gemini chat agent! Type 'exit' to quit.",
            Toolset::Weather => {
                "🤖 Welcome to your Gemini function chaining agent! Type 'exit' to quit."
            }
            Toolset::Files => {
                "🤖 Welcome to the code agent! Ask me to create files, write code or explore the directory. Type 'exit' to quit."
            }
        }
    }

    /// Driver wired with this profile's tools, prompt and defaults.
    ///
    /// Explicit values in `settings` and `history_limit` win over the profile's.
    pub fn driver(
        &self,
        endpoint: Arc<dyn ModelEndpoint>,
        workdir: impl Into<PathBuf>,
        mut settings: DriverSettings,
        history_limit: Option<usize>,
    ) -> ConversationDriver {
        if settings.instruction.is_none() {
            settings.instruction = Some(self.system_prompt().to_string());
        }
        if settings.temperature.is_none() {
            settings.temperature = self.default_temperature();
        }
        let conversation = match history_limit.or(self.default_history_limit()) {
            Some(max) => Conversation::with_max_turns(max),
            None => Conversation::new(),
        };
        ConversationDriver::new(endpoint, self.registry(workdir))
            .with_settings(settings)
            .with_conversation(conversation)
    }
}
