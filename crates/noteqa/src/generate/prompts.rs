//! Message templates for response generation.

/// System prompt sent to every provider.
pub fn system_prompt() -> &'static str {
    "You are a clinical question-answering assistant. Answer the question using \
     only the information in the clinical note. If the note does not contain the \
     answer, say so. Keep answers concise and factual."
}

/// Build the user message for one row.
///
/// The row's own prompt leads, followed by the clinical note and the question.
pub fn user_message(prompt: &str, clinical_text: &str, question: &str) -> String {
    format!(
        "{}\n\n## Clinical Note\n{}\n\n## Question\n{}",
        prompt.trim(),
        clinical_text.trim(),
        question.trim()
    )
}
