//! Input records and reviewed records.

use serde::{Deserialize, Serialize};

/// One row of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Note identifier.
    pub note_id: String,
    /// Question asked about the note.
    pub question: String,
    /// Clinical text, e.g. a discharge summary.
    pub clinical_text: String,
    /// Prompt the response was generated from (generation mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Response shown to the reviewer as the starting draft.
    pub generated_response: String,
}

/// A record approved and saved by the reviewer.
///
/// Fields are private; a reviewed record is never changed after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewedRecord {
    note_id: String,
    question: String,
    clinical_text: String,
    expert_response: String,
}

impl ReviewedRecord {
    /// Create a reviewed record from its four stored fields.
    pub fn new(
        note_id: impl Into<String>,
        question: impl Into<String>,
        clinical_text: impl Into<String>,
        expert_response: impl Into<String>,
    ) -> Self {
        Self {
            note_id: note_id.into(),
            question: question.into(),
            clinical_text: clinical_text.into(),
            expert_response: expert_response.into(),
        }
    }

    /// Combine an input record with the approved response.
    pub fn from_record(record: &Record, expert_response: impl Into<String>) -> Self {
        Self::new(
            record.note_id.clone(),
            record.question.clone(),
            record.clinical_text.clone(),
            expert_response,
        )
    }

    pub fn note_id(&self) -> &str {
        &self.note_id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn clinical_text(&self) -> &str {
        &self.clinical_text
    }

    pub fn expert_response(&self) -> &str {
        &self.expert_response
    }

    /// Cells in stored column order.
    pub(crate) fn to_row(&self) -> Vec<String> {
        vec![
            self.note_id.clone(),
            self.question.clone(),
            self.clinical_text.clone(),
            self.expert_response.clone(),
        ]
    }
}
