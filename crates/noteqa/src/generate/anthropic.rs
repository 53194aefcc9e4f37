//! Anthropic Claude API generator.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use crate::error::{NoteQaError, Result};

use super::generator::{http_client, non_empty_reply, GeneratorConfig, ResponseGenerator};
use super::prompts;

const API_URL: &str = "https://api.anthropic.com/v1/messages";

const API_VERSION: &str = "2023-06-01";

/// Anthropic Claude generator.
pub struct AnthropicGenerator {
    client: Client,
    api_key: String,
    config: GeneratorConfig,
}

impl AnthropicGenerator {
    pub fn new(api_key: impl Into<String>, config: GeneratorConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            api_key: api_key.into(),
            config,
        })
    }

    /// Reads the key from `ANTHROPIC_API_KEY`.
    pub fn from_env(config: GeneratorConfig) -> Result<Self> {
        match std::env::var("ANTHROPIC_API_KEY") {
            Ok(key) => Self::new(key, config),
            Err(_) => Err(NoteQaError::Config(
                "set ANTHROPIC_API_KEY to use the anthropic generator".to_string(),
            )),
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| NoteQaError::Config(format!("ANTHROPIC_API_KEY is not a valid header: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-api-key", key);
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    /// One Messages API call; returns the first text block of the reply.
    fn complete(&self, user_message: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model(),
            "system": self.config.system_prompt(),
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [{ "role": "user", "content": user_message }],
        });

        let response = self
            .client
            .post(API_URL)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .map_err(|e| NoteQaError::Generation(format!("anthropic request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(NoteQaError::Generation(format!(
                "anthropic returned {}: {}",
                status, detail
            )));
        }

        let reply: MessagesReply = response
            .json()
            .map_err(|e| NoteQaError::Generation(format!("unreadable anthropic reply: {}", e)))?;

        reply
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or_else(|| NoteQaError::Generation("anthropic reply had no text".to_string()))
    }
}

impl ResponseGenerator for AnthropicGenerator {
    fn generate(&self, prompt: &str, clinical_text: &str, question: &str) -> Result<String> {
        let message = prompts::user_message(prompt, clinical_text, question);
        let reply = self.complete(&message)?;
        non_empty_reply(self.name(), reply.trim().to_string())
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

#[derive(Debug, Deserialize)]
struct MessagesReply {
    content: Vec<Block>,
}

#[derive(Debug, Deserialize)]
struct Block {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}
