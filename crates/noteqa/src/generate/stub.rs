//! Placeholder generator used when no provider is configured.

use crate::error::Result;

use super::generator::ResponseGenerator;

/// Text returned by [`StubGenerator`] for every row.
pub const STUB_RESPONSE: &str =
    "[LLM Response to Prompt: The LLM-generated answer would be here.]\n\n";

/// Generator that returns a fixed placeholder for every row.
#[derive(Debug, Clone, Default)]
pub struct StubGenerator;

impl StubGenerator {
    /// Create a new stub generator.
    pub fn new() -> Self {
        Self
    }
}

impl ResponseGenerator for StubGenerator {
    fn generate(&self, _prompt: &str, _clinical_text: &str, _question: &str) -> Result<String> {
        Ok(STUB_RESPONSE.to_string())
    }

    fn name(&self) -> &str {
        "stub"
    }
}
