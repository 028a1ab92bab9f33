use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const SYSTEM_PROMPT: &str =
    "You are an AI assistant specializing in accounting document summaries. Provide a concise summary.";

/// `[summarization]` settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub enabled: bool,
    /// Falls back to `OPENAI_API_KEY` when loaded through the pipeline config
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub max_input_chars: usize,
    pub max_attempts: u32,
    pub timeout_ms: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_input_chars: 2048,
            max_attempts: 3,
            timeout_ms: 30_000,
        }
    }
}

impl SummarizerConfig {
    /// A usable credential: present and not blank
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
