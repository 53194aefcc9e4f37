//! CLI command implementations.

pub mod check;
pub mod export;
pub mod review;
pub mod status;

use std::path::Path;

use noteqa::{NoteQaError, ReviewConfig};

use crate::cli::StoreOptions;

/// Resolve the config file and apply command-line overrides.
pub fn load_config(options: &StoreOptions) -> Result<ReviewConfig, Box<dyn std::error::Error>> {
    let mut config = match &options.config {
        Some(path) => ReviewConfig::from_file(path)?,
        None => ReviewConfig::default(),
    };

    if let Some(store) = &options.store {
        config.store_path = store.clone();
    }
    if let Some(mode) = options.mode {
        config.mode = mode;
    }

    Ok(config)
}

/// Read a spreadsheet from disk, returning its file name and contents.
pub fn read_upload(path: &Path) -> Result<(String, Vec<u8>), NoteQaError> {
    let bytes = std::fs::read(path).map_err(|e| NoteQaError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((name, bytes))
}
