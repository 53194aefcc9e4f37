//! Response generator trait and configuration.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{NoteQaError, Result};

use super::anthropic::AnthropicGenerator;
use super::ollama::OllamaGenerator;
use super::openai::OpenAIGenerator;
use super::stub::StubGenerator;

/// Trait for response generators.
///
/// Implementations must be thread-safe (Send + Sync) so the review server
/// can share one generator across uploads.
pub trait ResponseGenerator: Send + Sync {
    /// Produce a response for one row.
    ///
    /// # Arguments
    /// * `prompt` - The row's prompt column
    /// * `clinical_text` - The clinical note
    /// * `question` - The question about the note
    fn generate(&self, prompt: &str, clinical_text: &str, question: &str) -> Result<String>;

    /// Get the name of this generator (for logging/debugging).
    fn name(&self) -> &str;
}

/// Generator provider choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderChoice {
    /// Fixed placeholder text
    #[default]
    Stub,
    /// Anthropic Claude API (requires ANTHROPIC_API_KEY)
    Anthropic,
    /// OpenAI GPT API (requires OPENAI_API_KEY)
    #[serde(rename = "openai")]
    OpenAI,
    /// Ollama local models (requires Ollama running)
    Ollama,
}

impl ProviderChoice {
    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderChoice::Stub => "stub",
            ProviderChoice::Anthropic => "claude-sonnet-4-20250514",
            ProviderChoice::OpenAI => "gpt-4o",
            ProviderChoice::Ollama => "llama3.2",
        }
    }
}

impl std::str::FromStr for ProviderChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stub" | "none" | "mock" => Ok(ProviderChoice::Stub),
            "anthropic" | "claude" => Ok(ProviderChoice::Anthropic),
            "openai" | "gpt" => Ok(ProviderChoice::OpenAI),
            "ollama" | "local" => Ok(ProviderChoice::Ollama),
            _ => Err(format!(
                "Unknown provider: {}. Use: stub, anthropic, openai, or ollama.",
                s
            )),
        }
    }
}

impl std::fmt::Display for ProviderChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderChoice::Stub => write!(f, "stub"),
            ProviderChoice::Anthropic => write!(f, "anthropic"),
            ProviderChoice::OpenAI => write!(f, "openai"),
            ProviderChoice::Ollama => write!(f, "ollama"),
        }
    }
}

/// Configuration for response generators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Which provider to use.
    pub provider: ProviderChoice,

    /// Model to use (None = provider default).
    pub model: Option<String>,

    /// Maximum tokens in response.
    pub max_tokens: usize,

    /// Temperature for generation (0.0-1.0).
    pub temperature: f64,

    /// Replacement for the built-in system prompt.
    pub system_prompt: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl GeneratorConfig {
    /// The configured model, or the provider default.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// The configured system prompt, or the built-in one.
    pub fn system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .unwrap_or_else(|| super::prompts::system_prompt())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: ProviderChoice::Stub,
            model: None,
            max_tokens: 1024,
            temperature: 0.2,
            system_prompt: None,
            timeout_secs: 60,
        }
    }
}

/// Build the generator selected by `config`.
pub fn build_generator(config: &GeneratorConfig) -> Result<Arc<dyn ResponseGenerator>> {
    let generator: Arc<dyn ResponseGenerator> = match config.provider {
        ProviderChoice::Stub => Arc::new(StubGenerator::new()),
        ProviderChoice::Anthropic => Arc::new(AnthropicGenerator::from_env(config.clone())?),
        ProviderChoice::OpenAI => Arc::new(OpenAIGenerator::from_env(config.clone())?),
        ProviderChoice::Ollama => Arc::new(OllamaGenerator::with_config(config.clone())?),
    };
    Ok(generator)
}

/// Blocking client shared by the HTTP generators.
pub(crate) fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| NoteQaError::Config(format!("cannot build HTTP client: {}", e)))
}

/// Check a provider's reply before it becomes a record's response.
pub(crate) fn non_empty_reply(provider: &str, reply: String) -> Result<String> {
    if reply.trim().is_empty() {
        return Err(NoteQaError::Generation(format!(
            "{} returned an empty response",
            provider
        )));
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_stub() {
        let config = GeneratorConfig::default();
        assert_eq!(config.provider, ProviderChoice::Stub);
        let generator = build_generator(&config).unwrap();
        assert_eq!(generator.name(), "stub");
    }

    #[test]
    fn test_system_prompt_override_and_fallback() {
        let config = GeneratorConfig::default();
        assert_eq!(config.system_prompt(), crate::generate::system_prompt());

        let config = GeneratorConfig {
            system_prompt: Some("Answer in one word.".to_string()),
            ..Default::default()
        };
        assert_eq!(config.system_prompt(), "Answer in one word.");
    }

    #[test]
    fn test_model_falls_back_to_provider_default() {
        let mut config = GeneratorConfig {
            provider: ProviderChoice::Ollama,
            ..Default::default()
        };
        assert_eq!(config.model(), "llama3.2");

        config.model = Some("mistral".to_string());
        assert_eq!(config.model(), "mistral");
    }

    #[test]
    fn test_parse_provider_choice() {
        assert_eq!("claude".parse::<ProviderChoice>(), Ok(ProviderChoice::Anthropic));
        assert_eq!("GPT".parse::<ProviderChoice>(), Ok(ProviderChoice::OpenAI));
        assert!("bard".parse::<ProviderChoice>().is_err());
    }

    #[test]
    fn test_empty_reply_is_an_error() {
        assert!(non_empty_reply("ollama", "  \n".to_string()).is_err());
        assert_eq!(non_empty_reply("ollama", "Yes".to_string()).unwrap(), "Yes");
    }
}
