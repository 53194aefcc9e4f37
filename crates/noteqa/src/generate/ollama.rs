//! Ollama local LLM generator.
//!
//! Ollama allows running LLMs locally without API keys, which keeps clinical
//! notes on the reviewer's machine. Install from: https://ollama.ai

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::json;

use crate::error::{NoteQaError, Result};

use super::generator::{http_client, non_empty_reply, GeneratorConfig, ProviderChoice, ResponseGenerator};
use super::prompts;

const DEFAULT_API_URL: &str = "http://localhost:11434/api/chat";

/// Minimum timeout for local models, which can be slow on long notes.
const MIN_TIMEOUT_SECS: u64 = 120;

/// Local model served by Ollama.
pub struct OllamaGenerator {
    client: Client,
    api_url: String,
    config: GeneratorConfig,
}

impl OllamaGenerator {
    /// Defaults to llama3.2 (`ollama pull llama3.2`).
    pub fn new() -> Result<Self> {
        Self::with_config(GeneratorConfig {
            provider: ProviderChoice::Ollama,
            ..Default::default()
        })
    }

    /// Honours `OLLAMA_HOST` when set.
    pub fn with_config(config: GeneratorConfig) -> Result<Self> {
        let api_url = match std::env::var("OLLAMA_HOST") {
            Ok(host) => format!("{}/api/chat", host.trim_end_matches('/')),
            Err(_) => DEFAULT_API_URL.to_string(),
        };

        Ok(Self {
            client: http_client(config.timeout_secs.max(MIN_TIMEOUT_SECS))?,
            api_url,
            config,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn chat(&self, user_message: &str) -> Result<String> {
        let model = self.config.model();
        let body = json!({
            "model": model,
            "stream": false,
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens,
            },
            "messages": [
                { "role": "system", "content": self.config.system_prompt() },
                { "role": "user", "content": user_message },
            ],
        });

        let response = self
            .client
            .post(&self.api_url)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .map_err(|e| {
                let msg = if e.is_connect() {
                    format!("cannot reach ollama at {} (is `ollama serve` running?)", self.api_url)
                } else {
                    format!("ollama request failed: {}", e)
                };
                NoteQaError::Generation(msg)
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            let msg = if detail.contains("not found") {
                format!("ollama has no model '{}'; run `ollama pull {}`", model, model)
            } else {
                format!("ollama returned {}: {}", status, detail)
            };
            return Err(NoteQaError::Generation(msg));
        }

        let reply: ChatReply = response
            .json()
            .map_err(|e| NoteQaError::Generation(format!("unreadable ollama reply: {}", e)))?;
        Ok(reply.message.content)
    }
}

impl ResponseGenerator for OllamaGenerator {
    fn generate(&self, prompt: &str, clinical_text: &str, question: &str) -> Result<String> {
        let message = prompts::user_message(prompt, clinical_text, question);
        let reply = self.chat(&message)?;
        non_empty_reply(self.name(), reply.trim().to_string())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}
