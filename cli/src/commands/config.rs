// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use loadout_core::domain::engine_config::{EngineConfig, StorageBackend};

const MINIMAL_TEMPLATE: &str = include_str!("../../templates/config-minimal.yaml");
const EXAMPLES_TEMPLATE: &str = include_str!("../../templates/config-with-examples.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective manifest as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./loadout-config.yaml)
        #[arg(short, long, default_value = "./loadout-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config = EngineConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. LOADOUT_CONFIG_PATH: {}",
            std::env::var("LOADOUT_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./loadout-config.yaml");
        println!("  4. ~/.loadout/config.yaml");
        println!("  5. /etc/loadout/config.yaml");
        println!();
    }

    if as_yaml {
        print!("{}", config.to_yaml_string()?);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    println!();
    println!("  Name: {}", config.metadata.name);
    if let Some(version) = &config.metadata.version {
        println!("  Version: {}", version);
    }
    println!();

    let storage = &config.spec.storage;
    println!("{}", "Storage:".bold());
    println!("  Backend: {}", storage.backend);
    if storage.backend == StorageBackend::Postgres {
        println!(
            "  Connection: {}",
            describe_connection(storage.connection_string.as_deref())
        );
        println!("  Max connections: {}", storage.max_connections);
    }
    println!();

    println!("{}", "Tenants:".bold());
    if config.spec.tenants.is_empty() {
        println!("  {}", "(none seeded)".dimmed());
    }
    for seed in &config.spec.tenants {
        let label = seed.name.as_deref().unwrap_or("");
        println!("  {} {}", seed.id.bold(), label);
        println!(
            "    Policy: {}",
            if seed.policy.is_some() { "customized" } else { "defaults" }
        );
        println!("    Integration installed: {}", seed.integration_installed);
    }
    println!();

    println!("{}", "Observability:".bold());
    println!("  Log level: {}", config.spec.observability.log_level);
    println!("  Log format: {:?}", config.spec.observability.log_format);
    println!();

    Ok(())
}

/// Never print credentials.
fn describe_connection(raw: Option<&str>) -> String {
    match raw {
        None => "(not set)".to_string(),
        Some(raw) if raw.starts_with("env:") => raw.to_string(),
        Some(raw) => match raw.rsplit_once('@') {
            Some((credentials, host)) => {
                let scheme = credentials
                    .split_once("://")
                    .map_or("", |(scheme, _)| scheme);
                if scheme.is_empty() {
                    format!("***@{}", host)
                } else {
                    format!("{}://***@{}", scheme, host)
                }
            }
            None => raw.to_string(),
        },
    }
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = EngineConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        EXAMPLES_TEMPLATE
    } else {
        MINIMAL_TEMPLATE
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_valid() {
        for template in [MINIMAL_TEMPLATE, EXAMPLES_TEMPLATE] {
            let config = EngineConfig::from_yaml_str(template).unwrap();
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_connection_strings_are_masked() {
        assert_eq!(
            describe_connection(Some("postgres://loadout:s3cret@db:5432/loadout")),
            "postgres://***@db:5432/loadout"
        );
        assert_eq!(describe_connection(Some("env:DATABASE_URL")), "env:DATABASE_URL");
        assert_eq!(describe_connection(None), "(not set)");
        assert_eq!(
            describe_connection(Some("postgresql://loadout:p@ss@w0rd@db:5432/loadout")),
            "postgresql://***@db:5432/loadout"
        );
        assert_eq!(
            describe_connection(Some("postgres://db:5432/loadout")),
            "postgres://db:5432/loadout"
        );
    }

    #[tokio::test]
    async fn test_generate_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loadout-config.yaml");

        generate(path.clone(), true).await.unwrap();
        validate(Some(path)).await.unwrap();
    }
}
