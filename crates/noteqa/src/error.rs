//! Error types for the noteqa library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for noteqa operations.
#[derive(Debug, Error)]
pub enum NoteQaError {
    /// The uploaded file lacks columns required by the selected load mode.
    #[error("The file is missing required columns: {}", .missing.join(", "))]
    SchemaValidation { missing: Vec<String> },

    /// Writing the persisted store failed.
    #[error("Save failed: {0}")]
    Persistence(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading or writing a workbook.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or no header row.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// The response-generation collaborator failed.
    #[error("Response generation failed: {0}")]
    Generation(String),

    /// A review action was attempted out of order.
    #[error("Review error: {0}")]
    Review(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parse error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl NoteQaError {
    /// Build a schema validation error from missing labels.
    pub fn missing_columns<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NoteQaError::SchemaValidation {
            missing: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this error means the uploaded file must be corrected.
    pub fn is_schema_validation(&self) -> bool {
        matches!(self, NoteQaError::SchemaValidation { .. })
    }

    /// Whether this error came from writing the persisted store.
    pub fn is_persistence(&self) -> bool {
        matches!(self, NoteQaError::Persistence(_))
    }
}

impl From<calamine::Error> for NoteQaError {
    fn from(err: calamine::Error) -> Self {
        NoteQaError::Spreadsheet(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for NoteQaError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        NoteQaError::Spreadsheet(err.to_string())
    }
}

/// Result type alias for noteqa operations.
pub type Result<T> = std::result::Result<T, NoteQaError>;
