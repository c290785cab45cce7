// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Loadout Operator CLI
//!
//! The `loadout` binary inspects and exercises the capability-access policy
//! engine against a configured store.
//!
//! ## Commands
//!
//! - `loadout config show|validate|generate` - Configuration management
//! - `loadout catalog list [--loadout L]` - Capability catalog
//! - `loadout policy resolve|check` - Resolve a caller's loadouts or check one capability
//!
//! Services are built in-process from the engine configuration (see
//! `embedded.rs`); there is no daemon.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;
mod embedded;

use commands::{CatalogCommand, ConfigCommand, PolicyCommand};
use loadout_core::domain::engine_config::{EngineConfig, LogFormat};

/// Loadout - capability-access policy engine
#[derive(Parser)]
#[command(name = "loadout")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "LOADOUT_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Defaults to spec.observability.logLevel
    #[arg(long, global = true, env = "LOADOUT_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Capability catalog
    #[command(name = "catalog")]
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },

    /// Tenant policy resolution and access checks
    #[command(name = "policy")]
    Policy {
        #[command(subcommand)]
        command: PolicyCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Observability settings come from the configuration when it loads;
    // load errors are reported by the command itself.
    let observability = EngineConfig::load_or_default(cli.config.clone())
        .ok()
        .map(|config| config.spec.observability);
    let level = cli
        .log_level
        .clone()
        .or_else(|| observability.as_ref().map(|o| o.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let format = observability.map(|o| o.log_format).unwrap_or_default();

    init_logging(&level, format)?;

    match cli.command {
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::Catalog { command }) => commands::catalog::handle_command(command).await,
        Some(Commands::Policy { command }) => {
            commands::policy::handle_command(command, cli.config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }

    Ok(())
}
