//! Export command - write saved expert responses to a spreadsheet.

use std::path::PathBuf;

use colored::Colorize;
use noteqa::input::EXPORT_FILE_STEM;
use noteqa::{PersistedStore, SheetFormat};

use super::load_config;
use crate::cli::StoreOptions;

pub fn run(
    options: StoreOptions,
    output: Option<PathBuf>,
    format: Option<SheetFormat>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&options)?;

    if !config.store_path.exists() {
        return Err(format!(
            "Store file not found: {}\nRun 'noteqa review' and save some responses first.",
            config.store_path.display()
        )
        .into());
    }

    let store = PersistedStore::open(&config.store_path, config.schema())?;
    if store.is_empty() {
        println!(
            "{} No saved expert responses to export.",
            "Warning:".yellow().bold()
        );
        return Ok(());
    }

    let format = match (format, &output) {
        (Some(format), _) => format,
        (None, Some(path)) => SheetFormat::from_path(path)?,
        (None, None) => SheetFormat::Xlsx,
    };
    let output = output
        .unwrap_or_else(|| PathBuf::from(format!("{}.{}", EXPORT_FILE_STEM, format.extension())));

    let bytes = store.export_bytes(format)?;
    std::fs::write(&output, bytes)?;

    println!(
        "{} {} responses to {}",
        "Exported".green().bold(),
        store.len().to_string().white().bold(),
        output.display().to_string().cyan()
    );

    Ok(())
}
