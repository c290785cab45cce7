// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Policy commands
//!
//! Commands: resolve, check

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use loadout_core::domain::caller::{CallerClassification, TenantId};

use crate::embedded::EmbeddedEngine;

#[derive(Subcommand)]
pub enum PolicyCommand {
    /// Show the loadouts and capabilities a caller resolves to
    Resolve {
        /// Tenant (project) UUID
        #[arg(long, value_parser = parse_tenant)]
        tenant: TenantId,

        /// Caller classification: unauthenticated, agent, user, administrator
        #[arg(long = "as", value_name = "CLASSIFICATION")]
        who: CallerClassification,
    },

    /// Run the invocation guard for one capability
    Check {
        /// Tenant (project) UUID
        #[arg(long, value_parser = parse_tenant)]
        tenant: TenantId,

        /// Caller classification: unauthenticated, agent, user, administrator
        #[arg(long = "as", value_name = "CLASSIFICATION")]
        who: CallerClassification,

        /// Capability name
        #[arg(long)]
        capability: String,
    },
}

pub async fn handle_command(command: PolicyCommand, config_path: Option<PathBuf>) -> Result<()> {
    let engine = EmbeddedEngine::new(config_path).await?;

    match command {
        PolicyCommand::Resolve { tenant, who } => resolve(&engine, tenant, who).await,
        PolicyCommand::Check {
            tenant,
            who,
            capability,
        } => check(&engine, tenant, who, &capability).await,
    }
}

fn parse_tenant(s: &str) -> Result<TenantId, String> {
    TenantId::from_string(s).map_err(|e| format!("invalid tenant id '{}': {}", s, e))
}

async fn resolve(engine: &EmbeddedEngine, tenant: TenantId, who: CallerClassification) -> Result<()> {
    let policy = engine.effective_policy(tenant).await?;
    let state = engine.resolve(tenant, who).await?;
    let visible = engine.visible(tenant, who).await?;

    println!("{}", "Resolution:".bold());
    println!("  Tenant: {}", tenant);
    println!("  Caller: {}", who);
    println!(
        "  Policy: {}",
        if policy.is_configured {
            "customized".normal()
        } else {
            "defaults (unconfigured)".dimmed()
        }
    );
    println!("  Loadouts: {}", state);
    println!();

    println!("{}", format!("Capabilities ({}):", visible.len()).bold());
    for name in &visible {
        println!("  {}", name);
    }

    Ok(())
}

async fn check(
    engine: &EmbeddedEngine,
    tenant: TenantId,
    who: CallerClassification,
    capability: &str,
) -> Result<()> {
    if !engine.catalog().contains(capability) {
        println!(
            "{}",
            format!("! '{}' is not in the capability catalog", capability).yellow()
        );
    }

    match engine.check(tenant, who, capability).await {
        Ok(state) => {
            println!(
                "{}",
                format!("✓ {} may invoke '{}'", who, capability).green()
            );
            println!("  Loadouts: {}", state);
            Ok(())
        }
        Err(e) if e.is_policy_denial() => {
            println!("{}", format!("✗ {}", e).red());
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
