// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Capability catalog commands

use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::Colorize;

use loadout_core::domain::capability::{CapabilityCatalog, CapabilitySpec};
use loadout_core::domain::loadout::LoadoutId;

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// List capabilities in catalog order
    List {
        /// Only capabilities belonging to this loadout (e.g. query, agent_tools)
        #[arg(long, value_name = "LOADOUT")]
        loadout: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_command(command: CatalogCommand) -> Result<()> {
    match command {
        CatalogCommand::List { loadout, json } => list(loadout.as_deref(), json),
    }
}

fn list(loadout: Option<&str>, as_json: bool) -> Result<()> {
    let catalog = CapabilityCatalog::standard();
    let specs = select(&catalog, loadout)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&specs)?);
        return Ok(());
    }

    println!("{}", "Capabilities:".bold());
    for spec in &specs {
        let loadouts: Vec<&str> = spec.loadouts.iter().map(LoadoutId::as_str).collect();
        println!("  {:<28} {}", spec.name, loadouts.join(", ").dimmed());
    }
    println!();
    println!("{} capabilities", specs.len());

    Ok(())
}

fn select<'a>(catalog: &'a CapabilityCatalog, loadout: Option<&str>) -> Result<Vec<&'a CapabilitySpec>> {
    match loadout {
        None => Ok(catalog.all().iter().collect()),
        Some(name) => {
            let loadout: LoadoutId = name.parse().map_err(|e: String| anyhow!(e))?;
            Ok(catalog.in_loadout(loadout).collect())
        }
    }
}
