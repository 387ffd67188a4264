// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tether - a durable message bridge between a chat gateway and an orchestrator.
//!
//! This is the binary entry point.

mod serve;
mod show_config;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tether_config::{ConfigError, TetherConfig};

/// Tether - durable message bridge between a chat gateway and an orchestrator.
#[derive(Parser, Debug)]
#[command(name = "tether", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bridge: HTTP API plus outbound delivery loop.
    Serve,
    /// Query a running bridge's health endpoint.
    Status {
        /// Output as JSON for scripting.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Print the effective configuration (secrets redacted).
    Config,
}

fn load(path: Option<&PathBuf>) -> Result<TetherConfig, Vec<ConfigError>> {
    match path {
        Some(path) => tether_config::load_and_validate_path(path),
        None => tether_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            tether_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Config) => show_config::run_config(&config),
        None => {
            println!("tether: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
