// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Group-State Resolver
//!
//! Turns a tenant's declarative configuration and the caller's classification
//! into the set of enabled loadouts. Pure: no I/O, no clock, no globals.
//! The data-liaison integration answer is looked up by the application layer
//! beforehand and passed in as [`IntegrationPresence`].
//!
//! ## Rules (first match wins)
//!
//! | Caller | Enabled loadouts |
//! |--------|------------------|
//! | Unauthenticated | `{Default}` |
//! | Agent | `{Default}` + `AgentTools` iff `agentTools.enabled` |
//! | User | `{Default}` + `Query` iff `query.enabled`, maintenance iff `user.allowOntologyMaintenance` |
//! | Administrator | User set + `DeveloperCore` iff `developer.enabled`, `Query` iff `developer.addQueryTools`, maintenance iff `developer.addOntologyMaintenance` |
//!
//! For humans `OntologyQuestions` follows maintenance (and its own toggle) and
//! `DataLiaison` requires both its toggle and an installed integration.

use serde::{Deserialize, Serialize};

use super::caller::CallerClassification;
use super::loadout::{GroupState, LoadoutId};
use super::tenant_policy::TenantPolicyConfiguration;

/// Answer from the integration-presence oracle for one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationPresence {
    Installed,
    NotInstalled,
    /// The oracle failed; treated as not installed.
    Unknown,
}

impl IntegrationPresence {
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed)
    }
}

impl From<bool> for IntegrationPresence {
    fn from(installed: bool) -> Self {
        if installed {
            Self::Installed
        } else {
            Self::NotInstalled
        }
    }
}

/// Resolve the enabled loadouts for one (tenant configuration, caller) pair.
///
/// `config = None` means the tenant has never been customized and resolves
/// through [`TenantPolicyConfiguration::default`].
pub fn resolve_group_state(
    config: Option<&TenantPolicyConfiguration>,
    who: CallerClassification,
    integration: IntegrationPresence,
) -> GroupState {
    let defaults;
    let config = match config {
        Some(config) => config,
        None => {
            defaults = TenantPolicyConfiguration::default();
            &defaults
        }
    };

    let mut state = GroupState::floor();

    match who {
        CallerClassification::Unauthenticated => return state,
        CallerClassification::Agent => {
            if config.agent_tools.enabled {
                state.enable(LoadoutId::AgentTools);
            }
            return state;
        }
        CallerClassification::User | CallerClassification::Administrator => {}
    }

    if config.query.enabled {
        state.enable(LoadoutId::Query);
    }
    let mut maintenance = config.user.allow_ontology_maintenance;

    if who == CallerClassification::Administrator {
        if config.developer.enabled {
            state.enable(LoadoutId::DeveloperCore);
        }
        if config.developer.add_query_tools {
            state.enable(LoadoutId::Query);
        }
        maintenance |= config.developer.add_ontology_maintenance;
    }

    if maintenance {
        state.enable(LoadoutId::OntologyMaintenance);
        if config.ontology_questions.enabled {
            state.enable(LoadoutId::OntologyQuestions);
        }
    }

    if config.data_liaison.enabled && integration.is_installed() {
        state.enable(LoadoutId::DataLiaison);
    }

    state
}
