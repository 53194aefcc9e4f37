//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use noteqa::generate::ProviderChoice;
use noteqa::{LoadMode, SheetFormat};
use std::path::PathBuf;

/// noteqa: expert review of LLM answers about clinical notes
#[derive(Parser)]
#[command(name = "noteqa")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Options shared by every command that touches the store.
#[derive(Args, Clone, Debug, Default)]
pub struct StoreOptions {
    /// Config file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Persisted store file (default: saved_expert_responses.xlsx)
    #[arg(short, long, value_name = "STORE")]
    pub store: Option<PathBuf>,

    /// Load mode: has-response or needs-generation
    #[arg(short, long)]
    pub mode: Option<LoadMode>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the web form for reviewing responses
    Review {
        /// Spreadsheet to load at startup (xlsx/csv/tsv)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        #[command(flatten)]
        options: StoreOptions,

        /// Response generator for needs-generation uploads
        #[arg(short, long)]
        generator: Option<ProviderChoice>,

        /// Model to use (provider-specific, e.g., "gpt-4o", "llama3.2")
        #[arg(long)]
        model: Option<String>,

        /// Port for web server
        #[arg(short, long, default_value = "3141")]
        port: u16,

        /// Don't automatically open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Show review progress for the store and an optional input file
    Status {
        /// Spreadsheet to compare against the store
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        #[command(flatten)]
        options: StoreOptions,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export saved expert responses
    Export {
        #[command(flatten)]
        options: StoreOptions,

        /// Output path (default: expert_responses.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: from the output extension)
        #[arg(short, long)]
        format: Option<SheetFormat>,
    },

    /// Check that a spreadsheet has the columns a load mode requires
    Check {
        /// Spreadsheet to check
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        options: StoreOptions,
    },
}
