//! noteqa CLI - expert review of clinical note question/answer spreadsheets.

mod cli;
mod commands;
mod server;
mod web;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Review {
            file,
            options,
            generator,
            model,
            port,
            no_open,
        } => commands::review::run(file, options, generator, model, port, no_open),

        Commands::Status {
            file,
            options,
            json,
        } => commands::status::run(file, options, json),

        Commands::Export {
            options,
            output,
            format,
        } => commands::export::run(options, output, format),

        Commands::Check { file, options } => commands::check::run(file, options),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            "noteqa=debug,noteqa_cli=debug,tower_http=debug".into()
        } else {
            "noteqa=info,noteqa_cli=info".into()
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose),
        )
        .init();
}
