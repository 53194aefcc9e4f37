//! OpenAI chat completions generator.

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use crate::error::{NoteQaError, Result};

use super::generator::{http_client, non_empty_reply, GeneratorConfig, ResponseGenerator};
use super::prompts;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI GPT generator.
pub struct OpenAIGenerator {
    client: Client,
    api_key: String,
    config: GeneratorConfig,
}

impl OpenAIGenerator {
    pub fn new(api_key: impl Into<String>, config: GeneratorConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            api_key: api_key.into(),
            config,
        })
    }

    /// Reads the key from `OPENAI_API_KEY`.
    pub fn from_env(config: GeneratorConfig) -> Result<Self> {
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) => Self::new(key, config),
            Err(_) => Err(NoteQaError::Config(
                "set OPENAI_API_KEY to use the openai generator".to_string(),
            )),
        }
    }

    /// One chat completion; returns the first choice's content.
    fn complete(&self, user_message: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model(),
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [
                { "role": "system", "content": self.config.system_prompt() },
                { "role": "user", "content": user_message },
            ],
        });

        let response = self
            .client
            .post(API_URL)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .map_err(|e| NoteQaError::Generation(format!("openai request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(NoteQaError::Generation(format!(
                "openai returned {}: {}",
                status, detail
            )));
        }

        let reply: Completion = response
            .json()
            .map_err(|e| NoteQaError::Generation(format!("unreadable openai reply: {}", e)))?;

        reply
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| NoteQaError::Generation("openai reply had no content".to_string()))
    }
}

impl ResponseGenerator for OpenAIGenerator {
    fn generate(&self, prompt: &str, clinical_text: &str, question: &str) -> Result<String> {
        let message = prompts::user_message(prompt, clinical_text, question);
        let reply = self.complete(&message)?;
        non_empty_reply(self.name(), reply.trim().to_string())
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Debug, Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}
