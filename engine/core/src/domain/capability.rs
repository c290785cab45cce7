// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Capability Catalog
//!
//! The closed universe of named operations the engine arbitrates. A
//! [`CapabilityCatalog`] is an explicitly constructed, immutable value that is
//! injected into the guard, the discovery filter and the router. There is no
//! process-wide instance: production code calls [`CapabilityCatalog::standard`],
//! tests build their own with [`CapabilityCatalog::new`].
//!
//! ## Invariants
//!
//! - Capability names are unique.
//! - Every capability belongs to at least one loadout.
//! - `Default` has exactly one member.
//! - Iteration order is the construction order and never changes.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::loadout::LoadoutId;

/// Name of the single `Default` capability in the standard catalog.
pub const HEALTH_CAPABILITY: &str = "health";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySpec {
    pub name: String,
    pub loadouts: BTreeSet<LoadoutId>,
}

impl CapabilitySpec {
    pub fn new(name: impl Into<String>, loadouts: impl IntoIterator<Item = LoadoutId>) -> Self {
        Self {
            name: name.into(),
            loadouts: loadouts.into_iter().collect(),
        }
    }

    pub fn belongs_to(&self, loadout: LoadoutId) -> bool {
        self.loadouts.contains(&loadout)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Duplicate capability name: {0}")]
    DuplicateName(String),

    #[error("Capability {0} belongs to no loadout")]
    NoLoadout(String),

    #[error("Default loadout must contain exactly one capability, found {0}")]
    DefaultCardinality(usize),
}

#[derive(Debug, Clone)]
pub struct CapabilityCatalog {
    specs: Vec<CapabilitySpec>,
    index: HashMap<String, usize>,
}

impl CapabilityCatalog {
    /// Build a catalog from an ordered list of specs, validating every invariant.
    pub fn new(specs: Vec<CapabilitySpec>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(specs.len());
        let mut default_members = 0;

        for (position, spec) in specs.iter().enumerate() {
            if spec.loadouts.is_empty() {
                return Err(CatalogError::NoLoadout(spec.name.clone()));
            }
            if spec.belongs_to(LoadoutId::Default) {
                default_members += 1;
            }
            if index.insert(spec.name.clone(), position).is_some() {
                return Err(CatalogError::DuplicateName(spec.name.clone()));
            }
        }

        if default_members != 1 {
            return Err(CatalogError::DefaultCardinality(default_members));
        }

        Ok(Self { specs, index })
    }

    /// The catalog shipped with the engine.
    pub fn standard() -> Self {
        let specs = STANDARD_CAPABILITIES
            .iter()
            .map(|(name, loadouts)| CapabilitySpec::new(*name, loadouts.iter().copied()))
            .collect();
        Self::new(specs).expect("standard capability table is valid")
    }

    /// All capabilities in stable catalog order.
    pub fn all(&self) -> &[CapabilitySpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&CapabilitySpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Members of one loadout, in catalog order.
    pub fn in_loadout(&self, loadout: LoadoutId) -> impl Iterator<Item = &CapabilitySpec> + '_ {
        self.specs.iter().filter(move |s| s.belongs_to(loadout))
    }

    /// The one capability reachable by every caller.
    pub fn default_capability(&self) -> &CapabilitySpec {
        // Presence is checked in `new`.
        self.in_loadout(LoadoutId::Default)
            .next()
            .expect("catalog has a default capability")
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

use LoadoutId::{
    AgentTools, DataLiaison, Default as DefaultLoadout, DeveloperCore, OntologyMaintenance,
    OntologyQuestions, Query,
};

const STANDARD_CAPABILITIES: &[(&str, &[LoadoutId])] = &[
    (HEALTH_CAPABILITY, &[DefaultLoadout]),
    // Developer diagnostics
    ("echo", &[DeveloperCore]),
    ("execute", &[DeveloperCore]),
    // Query
    ("get_schema", &[Query]),
    ("list_tables", &[Query]),
    ("describe_table", &[Query]),
    ("search_schema", &[Query]),
    ("get_column_stats", &[Query]),
    ("sample_rows", &[Query]),
    ("query", &[Query]),
    ("validate_query", &[Query]),
    ("explain_query", &[Query]),
    ("list_approved_queries", &[Query, AgentTools]),
    ("execute_approved_query", &[Query, AgentTools]),
    ("get_ontology", &[Query]),
    ("get_context", &[Query, AgentTools]),
    ("list_glossary", &[Query]),
    ("get_glossary_term", &[Query]),
    ("get_entity", &[Query]),
    ("list_relationships", &[Query]),
    ("probe_column", &[Query]),
    ("list_project_knowledge", &[Query]),
    // Ontology maintenance
    ("update_table", &[OntologyMaintenance]),
    ("update_column", &[OntologyMaintenance]),
    ("delete_column_metadata", &[OntologyMaintenance]),
    ("update_relationship", &[OntologyMaintenance]),
    ("create_relationship", &[OntologyMaintenance]),
    ("delete_relationship", &[OntologyMaintenance]),
    ("update_entity", &[OntologyMaintenance]),
    ("delete_entity", &[OntologyMaintenance]),
    ("create_glossary_term", &[OntologyMaintenance]),
    ("update_glossary_term", &[OntologyMaintenance]),
    ("delete_glossary_term", &[OntologyMaintenance]),
    ("update_project_knowledge", &[OntologyMaintenance]),
    ("delete_project_knowledge", &[OntologyMaintenance]),
    ("refresh_schema", &[OntologyMaintenance]),
    ("scan_data_changes", &[OntologyMaintenance]),
    ("list_pending_changes", &[OntologyMaintenance]),
    ("approve_change", &[OntologyMaintenance]),
    ("reject_change", &[OntologyMaintenance]),
    ("approve_all_changes", &[OntologyMaintenance]),
    ("suggest_approved_query", &[OntologyMaintenance]),
    ("update_approved_query", &[OntologyMaintenance]),
    ("delete_approved_query", &[OntologyMaintenance]),
    // Ontology questions
    ("list_ontology_questions", &[OntologyQuestions]),
    ("resolve_ontology_question", &[OntologyQuestions]),
    ("skip_ontology_question", &[OntologyQuestions]),
    ("dismiss_ontology_question", &[OntologyQuestions]),
    ("escalate_ontology_question", &[OntologyQuestions]),
    // Data liaison integration
    ("list_query_suggestions", &[DataLiaison]),
    ("approve_query_suggestion", &[DataLiaison]),
    ("reject_query_suggestion", &[DataLiaison]),
    ("create_approved_query", &[DataLiaison]),
    ("list_query_history", &[DataLiaison]),
    ("get_query_history_entry", &[DataLiaison]),
    ("share_query_result", &[DataLiaison]),
    ("publish_query_endpoint", &[DataLiaison]),
];
