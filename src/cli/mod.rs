//! CLI command definitions for task-manager
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod accounts;

use clap::{Args, Parser, Subcommand};

/// Task manager web application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Address to bind (overrides config)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port to bind (overrides config)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web server (default if no subcommand given)
    Serve,

    /// Create a worker account, e.g. the first one to log in with
    CreateWorker(CreateWorkerArgs),

    /// Reset a worker's password
    SetPassword(SetPasswordArgs),
}

/// Arguments for `create-worker`.
#[derive(Args, Debug)]
pub struct CreateWorkerArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,

    #[arg(long, default_value = "")]
    pub first_name: String,

    #[arg(long, default_value = "")]
    pub last_name: String,

    #[arg(long, default_value = "")]
    pub email: String,
}

/// Arguments for `set-password`.
#[derive(Args, Debug)]
pub struct SetPasswordArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::parse_from(["task-manager", "--port", "0"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.port, Some(0));
        assert_eq!(cli.log, "2");
    }

    #[test]
    fn create_worker_arguments() {
        let cli = Cli::parse_from([
            "task-manager",
            "create-worker",
            "--username",
            "admin",
            "--password",
            "pw",
            "--last-name",
            "Smith",
        ]);
        match cli.command {
            Some(Command::CreateWorker(args)) => {
                assert_eq!(args.username, "admin");
                assert_eq!(args.password, "pw");
                assert_eq!(args.last_name, "Smith");
                assert_eq!(args.first_name, "");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn set_password_arguments() {
        let cli = Cli::parse_from([
            "task-manager",
            "set-password",
            "--username",
            "admin",
            "--password",
            "new",
        ]);
        match cli.command {
            Some(Command::SetPassword(args)) => {
                assert_eq!(args.username, "admin");
                assert_eq!(args.password, "new");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["task-manager", "serve", "--database", "x.db", "-v"]);
        assert!(matches!(cli.command, Some(Command::Serve)));
        assert_eq!(cli.database.as_deref(), Some("x.db"));
        assert!(cli.verbose);
    }
}
