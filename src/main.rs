// src/main.rs — catg entry point

use clap::Parser;

use catg::cli::{Cli, Commands};
use catg::infra::config::Config;
use catg::infra::logger;

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG)
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        if let Some(hint) = catg::cli::run::failure_hint(&e) {
            eprintln!("hint: {hint}");
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    match cli.command {
        Some(Commands::Status { history }) => catg::cli::status::show_status(history),
        None => catg::cli::run::run_session(&cli, &config).await,
    }
}
