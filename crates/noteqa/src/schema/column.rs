//! Column roles and their labels.

use serde::{Deserialize, Serialize};

/// Logical field roles a record's columns play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Unique note identifier.
    NoteId,
    /// The question asked about the note.
    Question,
    /// Long clinical text, e.g. a discharge summary.
    ClinicalText,
    /// Response produced by a language model.
    GeneratedResponse,
    /// Prompt used to generate the response.
    Prompt,
    /// Final response approved by the reviewer.
    ExpertResponse,
}

impl ColumnRole {
    /// All roles, in declaration order.
    pub const ALL: [ColumnRole; 6] = [
        ColumnRole::NoteId,
        ColumnRole::Question,
        ColumnRole::ClinicalText,
        ColumnRole::GeneratedResponse,
        ColumnRole::Prompt,
        ColumnRole::ExpertResponse,
    ];

    /// Roles written to the persisted store and export, in column order.
    pub const STORED: [ColumnRole; 4] = [
        ColumnRole::NoteId,
        ColumnRole::Question,
        ColumnRole::ClinicalText,
        ColumnRole::ExpertResponse,
    ];
}

/// Built-in label sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaPreset {
    /// Clinical text labelled "Discharge Summary".
    #[default]
    DischargeSummary,
    /// Clinical text labelled "Clinical Text".
    ClinicalText,
}

impl std::str::FromStr for SchemaPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "discharge-summary" | "discharge" => Ok(SchemaPreset::DischargeSummary),
            "clinical-text" | "clinical" => Ok(SchemaPreset::ClinicalText),
            _ => Err(format!(
                "Unknown column preset: {}. Use: discharge-summary or clinical-text.",
                s
            )),
        }
    }
}

/// Read-only mapping from column role to the label used in spreadsheets.
///
/// The review workflow only ever asks for `label(role)`, so swapping the
/// schema changes which headers are read and written without touching
/// workflow logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    note_id: String,
    question: String,
    clinical_text: String,
    generated_response: String,
    prompt: String,
    expert_response: String,
}

impl ColumnSchema {
    /// Labels for discharge-summary review files.
    pub fn discharge_summary() -> Self {
        Self {
            note_id: "Note Id".to_string(),
            question: "Question".to_string(),
            clinical_text: "Discharge Summary".to_string(),
            generated_response: "LLM-generated Response".to_string(),
            prompt: "Prompt".to_string(),
            expert_response: "Expert's Response".to_string(),
        }
    }

    /// Labels for generic clinical-text review files.
    pub fn clinical_text() -> Self {
        Self {
            clinical_text: "Clinical Text".to_string(),
            ..Self::discharge_summary()
        }
    }

    /// Labels for a built-in preset.
    pub fn from_preset(preset: SchemaPreset) -> Self {
        match preset {
            SchemaPreset::DischargeSummary => Self::discharge_summary(),
            SchemaPreset::ClinicalText => Self::clinical_text(),
        }
    }

    /// Override the label for one role.
    pub fn with_label(mut self, role: ColumnRole, label: impl Into<String>) -> Self {
        *self.slot_mut(role) = label.into();
        self
    }

    /// Get the label for a role.
    pub fn label(&self, role: ColumnRole) -> &str {
        match role {
            ColumnRole::NoteId => &self.note_id,
            ColumnRole::Question => &self.question,
            ColumnRole::ClinicalText => &self.clinical_text,
            ColumnRole::GeneratedResponse => &self.generated_response,
            ColumnRole::Prompt => &self.prompt,
            ColumnRole::ExpertResponse => &self.expert_response,
        }
    }

    /// Labels of the persisted store columns, in order.
    pub fn store_labels(&self) -> Vec<&str> {
        ColumnRole::STORED.iter().map(|&r| self.label(r)).collect()
    }

    fn slot_mut(&mut self, role: ColumnRole) -> &mut String {
        match role {
            ColumnRole::NoteId => &mut self.note_id,
            ColumnRole::Question => &mut self.question,
            ColumnRole::ClinicalText => &mut self.clinical_text,
            ColumnRole::GeneratedResponse => &mut self.generated_response,
            ColumnRole::Prompt => &mut self.prompt,
            ColumnRole::ExpertResponse => &mut self.expert_response,
        }
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::discharge_summary()
    }
}
