// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Loadouts and Group State
//!
//! A **loadout** is a named group of capabilities that a tenant toggles as a
//! unit. [`GroupState`] is the set of loadouts enabled for one
//! (tenant, caller) pair and is recomputed on every request.
//!
//! `Default` is always present in every resolved state, including the one
//! produced for unauthenticated callers.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Enumerated loadout tag.
///
/// Ordering is significant only for deterministic iteration of [`GroupState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadoutId {
    /// Always-available health/status surface.
    Default,
    /// Diagnostic capabilities offered to administrators.
    DeveloperCore,
    /// Read-only schema, ontology and query capabilities.
    Query,
    /// Capabilities that mutate shared ontology metadata.
    OntologyMaintenance,
    /// Question/answer workflow layered on top of maintenance.
    OntologyQuestions,
    /// Capabilities backed by the optional data-liaison integration.
    DataLiaison,
    /// The restricted surface automated agents may use.
    AgentTools,
}

impl LoadoutId {
    pub const ALL: [LoadoutId; 7] = [
        LoadoutId::Default,
        LoadoutId::DeveloperCore,
        LoadoutId::Query,
        LoadoutId::OntologyMaintenance,
        LoadoutId::OntologyQuestions,
        LoadoutId::DataLiaison,
        LoadoutId::AgentTools,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::DeveloperCore => "developer_core",
            Self::Query => "query",
            Self::OntologyMaintenance => "ontology_maintenance",
            Self::OntologyQuestions => "ontology_questions",
            Self::DataLiaison => "data_liaison",
            Self::AgentTools => "agent_tools",
        }
    }

    /// Loadouts an automated agent may ever be granted.
    pub fn is_agent_reachable(&self) -> bool {
        matches!(self, Self::Default | Self::AgentTools)
    }
}

impl fmt::Display for LoadoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadoutId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| format!("unknown loadout '{}'", s))
    }
}

/// Resolved set of enabled loadouts for a single request.
///
/// Never cached across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupState {
    enabled: BTreeSet<LoadoutId>,
}

impl GroupState {
    /// The floor every caller receives: `{Default}`.
    pub fn floor() -> Self {
        let mut enabled = BTreeSet::new();
        enabled.insert(LoadoutId::Default);
        Self { enabled }
    }

    /// Build a state from an arbitrary set. `Default` is always added.
    pub fn from_loadouts(loadouts: impl IntoIterator<Item = LoadoutId>) -> Self {
        let mut state = Self::floor();
        state.enabled.extend(loadouts);
        state
    }

    pub fn enable(&mut self, loadout: LoadoutId) {
        self.enabled.insert(loadout);
    }

    pub fn contains(&self, loadout: LoadoutId) -> bool {
        self.enabled.contains(&loadout)
    }

    pub fn iter(&self) -> impl Iterator<Item = LoadoutId> + '_ {
        self.enabled.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

impl fmt::Display for GroupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.enabled.iter().map(LoadoutId::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
