//! social-scheduler CLI entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; the flag wins over the config file
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| {
            AppConfig::load(cli.config.as_deref())
                .ok()
                .map(|c| c.general.log_level)
        })
        .unwrap_or_else(|| "info".to_string());
    init_logging(&log_level)?;

    let options = commands::GlobalOptions {
        config: cli.config,
        store: cli.store,
        dry_run: cli.dry_run,
    };

    // Execute command
    match cli.command {
        Commands::Draft(args) => commands::posts::draft(args, &options).await,
        Commands::Schedule { id, date } => commands::posts::schedule(id, date, &options).await,
        Commands::Publish { id } => commands::posts::publish(id, &options).await,
        Commands::List(args) => commands::posts::list(args, &options).await,
        Commands::Upcoming(args) => commands::posts::upcoming(args, &options).await,
        Commands::Cancel { id } => commands::posts::cancel(id, &options).await,
        Commands::Delete { id } => commands::posts::delete(id, &options).await,
        Commands::Tool(args) => commands::tool::execute(args, &options).await,
        Commands::Rpc(args) => commands::rpc::execute(args, &options).await,
        Commands::Config(args) => commands::config::execute(args, &options).await,
        Commands::Doctor(args) => commands::doctor::execute(args, &options).await,
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
