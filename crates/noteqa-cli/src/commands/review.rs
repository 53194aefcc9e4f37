//! Review command - open the web form for reviewing responses.

use std::path::PathBuf;

use colored::Colorize;
use noteqa::generate::{build_generator, ProviderChoice};

use super::{load_config, read_upload};
use crate::cli::StoreOptions;
use crate::server::{app, state::AppState, state::LOCAL_DATA_WARNING};

pub fn run(
    file: Option<PathBuf>,
    options: StoreOptions,
    provider: Option<ProviderChoice>,
    model: Option<String>,
    port: u16,
    no_open: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(&options)?;
    if let Some(provider) = provider {
        config.generator.provider = provider;
    }
    if model.is_some() {
        config.generator.model = model;
    }

    let generator = build_generator(&config.generator)?;
    let mut session = config.open_session()?;

    println!("{} {}", "Warning:".yellow().bold(), LOCAL_DATA_WARNING);
    println!();

    if let Some(file) = &file {
        let (name, bytes) = read_upload(file)?;
        let count = session.load_bytes(&name, &bytes, config.mode, generator.as_ref())?;
        println!(
            "{} {} records from {} ({})",
            "Loaded".green().bold(),
            count.to_string().white().bold(),
            file.display(),
            config.mode.label()
        );
    }

    let store = session.store().path().display().to_string();
    let saved = session.saved().len();
    let state = AppState::new(session, generator.clone(), config.mode);

    let url = format!("http://localhost:{}", port);
    println!();
    println!(
        "{} {}",
        "Starting review server at".cyan().bold(),
        url.white().bold()
    );
    println!();
    println!("  Store: {} ({} saved)", store, saved);
    println!("  Generator: {}", generator.name());
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    if !no_open {
        if let Err(e) = open::that(&url) {
            eprintln!("{} Could not open browser: {}", "Warning:".yellow(), e);
        }
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run_server(state, port))?;

    println!("{}", "Shut down.".yellow());
    Ok(())
}
