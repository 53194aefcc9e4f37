//! Response generation for records loaded without a generated response.
//!
//! A [`ResponseGenerator`] receives a row's prompt, clinical text and question
//! and returns the response text the reviewer will edit. The shipped default
//! is [`StubGenerator`], which returns a fixed placeholder; real deployments
//! pick one of the HTTP providers.
//!
//! # Supported Providers
//!
//! - **Anthropic** - Claude models via API (requires `ANTHROPIC_API_KEY`)
//! - **OpenAI** - GPT models via API (requires `OPENAI_API_KEY`)
//! - **Ollama** - Local models, no API key needed (honours `OLLAMA_HOST`)
//!
//! # Example
//!
//! ```
//! use noteqa::generate::{ResponseGenerator, StubGenerator};
//!
//! let generator = StubGenerator::new();
//! let response = generator
//!     .generate("Answer briefly.", "Patient admitted with ...", "Is X normal?")
//!     .unwrap();
//! assert!(response.starts_with("[LLM Response to Prompt:"));
//! ```

mod anthropic;
mod generator;
mod ollama;
mod openai;
mod prompts;
mod stub;

pub use anthropic::AnthropicGenerator;
pub use generator::{build_generator, GeneratorConfig, ProviderChoice, ResponseGenerator};
pub use ollama::OllamaGenerator;
pub use openai::OpenAIGenerator;
pub use prompts::{system_prompt, user_message};
pub use stub::{StubGenerator, STUB_RESPONSE};
