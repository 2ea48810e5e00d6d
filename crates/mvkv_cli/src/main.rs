//! mvkv CLI
//!
//! Command shell for an in-memory mvkv database.
//!
//! # Commands
//!
//! - `shell` - Run protocol commands from stdin or a script (default)
//! - `version` - Show version information
//!
//! Each shell line has the form `<connection> <command> [args...]`, for
//! example `c1 set x hey`. Connections are opened on first use.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use mvkv_core::{Config, Database, IsolationLevel};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// mvkv command shell.
#[derive(Parser)]
#[command(name = "mvkv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(global = true, short, long)]
    debug: bool,

    /// Isolation level for new transactions
    #[arg(global = true, short, long, default_value = "read-uncommitted")]
    isolation: IsolationLevel,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run protocol commands from stdin or a script file
    Shell {
        /// Read commands from this file instead of stdin
        #[arg(short, long)]
        script: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Shell { script: None }) {
        Commands::Shell { script } => {
            let db = Database::new(Config::new().default_isolation(cli.isolation));
            commands::shell::run(&db, script.as_deref())?;
        }
        Commands::Version => {
            println!("mvkv CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("mvkv Core v{}", mvkv_core::VERSION);
        }
    }

    Ok(())
}
