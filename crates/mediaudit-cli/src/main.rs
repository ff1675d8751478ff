//! Mediaudit CLI - AI-assisted auditing of digital media campaigns.

use clap::Parser;
use mediaudit_cli::{commands, Cli, Command, Config};
use mediaudit_store::FileStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> mediaudit_cli::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)?;

    let state_path = match cli.state {
        Some(path) => path,
        None => config.state_path()?,
    };
    if let Some(parent) = state_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = FileStore::open(&state_path)?;

    match cli.command {
        Command::Extract(args) => commands::execute_extract(args, &config, &store).await,
        Command::Emails(args) => commands::execute_emails(args, &config, &store).await,
        Command::Report(args) => commands::execute_report(args, &config, &store).await,
        Command::Refine(args) => commands::execute_refine(args, &config, &store).await,
        Command::Show => commands::execute_show(&store).await,
        Command::Reset => commands::execute_reset(&store).await,
    }
}
