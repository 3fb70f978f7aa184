use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pulse_cli::commands::{events, record, report};
use pulse_cli::{Cli, Commands, Config};

/// Load config and open the database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(pulse_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = pulse_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Record {
            name,
            owner,
            value,
            category,
            meta,
        }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            record::run(&mut db, owner, name, *value, category.clone(), meta)?;
        }
        Some(Commands::Report {
            owner,
            window,
            json,
        }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            report::run(&db, owner, window, *json)?;
        }
        Some(Commands::Events { owner, since }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            events::run(&db, owner, since.as_deref())?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
