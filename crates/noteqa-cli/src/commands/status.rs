//! Status command - show review progress.

use std::path::PathBuf;

use colored::Colorize;
use noteqa::generate::StubGenerator;
use noteqa::SessionStatus;

use super::{load_config, read_upload};
use crate::cli::StoreOptions;

pub fn run(
    file: Option<PathBuf>,
    options: StoreOptions,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&options)?;
    let mut session = config.open_session()?;

    if let Some(file) = &file {
        let (name, bytes) = read_upload(file)?;
        // Only identifiers matter here; never call a real model.
        session.load_bytes(&name, &bytes, config.mode, &StubGenerator::new())?;
    }

    let remaining: Vec<String> = session
        .unreviewed()
        .iter()
        .map(|r| r.note_id.clone())
        .collect();

    if json_output {
        let status = serde_json::json!({
            "store": session.store().path().display().to_string(),
            "saved": session.saved().len(),
            "file": session.source().map(|s| s.file.clone()),
            "mode": config.mode,
            "status": session.status(),
            "progress": session.progress(),
            "remaining": remaining,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Review status for".cyan().bold(),
        session.store().path().display().to_string().white()
    );
    println!();
    println!("Saved responses: {}", session.saved().len().to_string().white().bold());

    match session.status() {
        SessionStatus::NoRecords => {
            println!();
            println!(
                "Pass a spreadsheet to compare it with the store: {}",
                "noteqa status notes.xlsx".cyan()
            );
        }
        SessionStatus::InProgress { remaining: left, reviewed } => {
            let total = left + reviewed;
            let progress = session.progress();
            let bar_width = 30;
            let filled = (progress * bar_width as f64).round() as usize;
            let bar: String = "█".repeat(filled) + &"░".repeat(bar_width - filled);

            println!(
                "Progress: {} {}/{} ({:.0}%)",
                bar.cyan(),
                reviewed.to_string().white().bold(),
                total,
                progress * 100.0
            );
            println!();
            println!("{}", "Remaining notes:".yellow().bold());
            for id in &remaining {
                println!("  {}", id);
            }
        }
        SessionStatus::Complete { reviewed } => {
            println!(
                "{} All {} notes have been reviewed.",
                "✓".green().bold(),
                reviewed
            );
        }
    }

    Ok(())
}
