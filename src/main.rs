//! Task manager
//!
//! A web application for tracking tasks, their types and deadlines, and the
//! workers assigned to them.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use task_manager::cli::{Cli, Command, accounts};
use task_manager::config::{Config, ConfigLoader, ConfigPaths};
use task_manager::db::Database;
use task_manager::logging::{self, LogTarget};
use task_manager::web;
use tracing::{debug, info};

/// Load configuration and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut paths = ConfigPaths::discover();
    if let Some(ref file) = cli.config {
        paths = paths.with_file(file);
    }
    let loader = ConfigLoader::load_with_paths(paths)?;
    if let Some(path) = loader.config_path() {
        debug!(path = %path.display(), "Using config file");
    }
    let mut config = loader.into_config();

    if let Some(ref db) = cli.database {
        config.server.db_path = PathBuf::from(db);
    }
    if let Some(ref host) = cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let config = load_config(&cli)?;
    config.ensure_db_dir()?;

    let db = Arc::new(Database::open(&config.server.db_path)?);
    info!(path = %config.server.db_path.display(), "Database ready");

    match cli.command {
        Some(Command::CreateWorker(ref args)) => {
            let worker = accounts::create_worker(&db, args)?;
            println!("Created worker {} (id {})", worker.username, worker.id);
            Ok(())
        }
        Some(Command::SetPassword(ref args)) => {
            let worker = accounts::set_password(&db, args)?;
            println!("Password changed for {}", worker.username);
            Ok(())
        }
        Some(Command::Serve) | None => web::serve(db, Arc::new(config)).await,
    }
}
