//! Review configuration loaded from TOML.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NoteQaError, Result};
use crate::generate::GeneratorConfig;
use crate::review::ReviewSession;
use crate::schema::{ColumnRole, ColumnSchema, LoadMode, SchemaPreset};
use crate::store::{PersistedStore, DEFAULT_STORE_FILE};

/// Top-level configuration for a review session.
///
/// ```toml
/// store_path = "reviews/saved_expert_responses.xlsx"
/// backup_history = true
///
/// [columns]
/// preset = "clinical-text"
/// note_id = "Encounter Id"
///
/// [generator]
/// provider = "ollama"
/// model = "llama3.2"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Location of the persisted store.
    pub store_path: PathBuf,

    /// Load mode used when none is given on the command line.
    pub mode: LoadMode,

    /// Column labels.
    pub columns: ColumnsConfig,

    /// Response generator used in [`LoadMode::NeedsGeneration`].
    pub generator: GeneratorConfig,

    /// Copy the previous store file aside before each rewrite.
    pub backup_history: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            mode: LoadMode::default(),
            columns: ColumnsConfig::default(),
            generator: GeneratorConfig::default(),
            backup_history: false,
        }
    }
}

/// Column labels: a preset plus optional per-role overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub preset: SchemaPreset,
    pub note_id: Option<String>,
    pub question: Option<String>,
    pub clinical_text: Option<String>,
    pub generated_response: Option<String>,
    pub prompt: Option<String>,
    pub expert_response: Option<String>,
}

impl ColumnsConfig {
    /// Build the column schema these settings describe.
    pub fn schema(&self) -> ColumnSchema {
        let overrides = [
            (ColumnRole::NoteId, &self.note_id),
            (ColumnRole::Question, &self.question),
            (ColumnRole::ClinicalText, &self.clinical_text),
            (ColumnRole::GeneratedResponse, &self.generated_response),
            (ColumnRole::Prompt, &self.prompt),
            (ColumnRole::ExpertResponse, &self.expert_response),
        ];

        overrides
            .into_iter()
            .fold(ColumnSchema::from_preset(self.preset), |schema, (role, label)| {
                match label {
                    Some(label) => schema.with_label(role, label.trim()),
                    None => schema,
                }
            })
    }
}

impl ReviewConfig {
    /// Read and validate a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| NoteQaError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate TOML config text.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: ReviewConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let schema = self.schema();

        // Each role needs its own, non-empty header.
        let mut seen = HashSet::new();
        for role in ColumnRole::ALL {
            let label = schema.label(role);
            if label.is_empty() {
                return Err(NoteQaError::Config(format!(
                    "column label for {:?} must not be empty",
                    role
                )));
            }
            if !seen.insert(label) {
                return Err(NoteQaError::Config(format!(
                    "column label '{}' is used for more than one role",
                    label
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.generator.temperature) {
            return Err(NoteQaError::Config(format!(
                "generator temperature must be between 0.0 and 1.0, got {}",
                self.generator.temperature
            )));
        }

        if self.generator.max_tokens == 0 {
            return Err(NoteQaError::Config(
                "generator max_tokens must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Column schema for this configuration.
    pub fn schema(&self) -> ColumnSchema {
        self.columns.schema()
    }

    /// Open the configured store and start a session over it.
    pub fn open_session(&self) -> Result<ReviewSession> {
        let store = PersistedStore::open(&self.store_path, self.schema())?
            .with_backup_history(self.backup_history);
        Ok(ReviewSession::with_store(store))
    }
}
