//! Check command - validate a spreadsheet's columns without loading it.

use std::path::PathBuf;

use colored::Colorize;
use noteqa::input::Parser;
use noteqa::store::validate_columns;

use super::load_config;
use crate::cli::StoreOptions;

pub fn run(file: PathBuf, options: StoreOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&options)?;
    let schema = config.schema();
    let (sheet, metadata) = Parser::new().parse_file(&file)?;

    println!(
        "{} {} ({}, {} rows, {} columns)",
        "Checking".cyan().bold(),
        file.display(),
        metadata.format,
        metadata.row_count,
        metadata.column_count
    );
    println!("Mode: {}", config.mode.label());
    println!();

    for role in config.mode.required_roles() {
        let label = schema.label(role);
        if sheet.has_column(label) {
            println!("  {} {}", "✓".green(), label);
        } else {
            println!("  {} {}", "✗".red(), label);
        }
    }
    println!();

    validate_columns(&sheet, config.mode, &schema)?;
    println!("{} File is ready to review.", "OK".green().bold());

    Ok(())
}
