// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Tenant Policy Configuration
//!
//! Per-project declarative toggles, one section per non-Default loadout.
//! Every field carries a serde default so a partially written record is valid
//! and an absent record resolves exactly like `TenantPolicyConfiguration::default()`.
//!
//! Defaults are "on" for humans and "off" for agents: an administrator must
//! opt a project in before automated agents see any agent tools.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TenantPolicyConfiguration {
    #[serde(default)]
    pub developer: DeveloperToolsConfig,

    #[serde(default)]
    pub query: QueryToolsConfig,

    #[serde(default)]
    pub user: UserToolsConfig,

    #[serde(default)]
    pub ontology_questions: OntologyQuestionsConfig,

    #[serde(default)]
    pub data_liaison: DataLiaisonConfig,

    #[serde(default)]
    pub agent_tools: AgentToolsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperToolsConfig {
    /// Administrators receive the developer diagnostics loadout
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Administrators receive the query loadout
    #[serde(default = "default_true")]
    pub add_query_tools: bool,

    /// Administrators receive ontology maintenance regardless of `user.*`
    #[serde(default = "default_true")]
    pub add_ontology_maintenance: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryToolsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserToolsConfig {
    /// Non-administrators may mutate shared ontology metadata
    #[serde(default = "default_true")]
    pub allow_ontology_maintenance: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologyQuestionsConfig {
    /// Only effective when maintenance is enabled for the caller
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLiaisonConfig {
    /// Only effective when the integration is installed for the tenant
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentToolsConfig {
    #[serde(default)]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DeveloperToolsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            add_query_tools: true,
            add_ontology_maintenance: true,
        }
    }
}

impl Default for QueryToolsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for UserToolsConfig {
    fn default() -> Self {
        Self {
            allow_ontology_maintenance: true,
        }
    }
}

impl Default for OntologyQuestionsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for DataLiaisonConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl TenantPolicyConfiguration {
    /// A record with every toggle off, including the ones that default on.
    pub fn all_disabled() -> Self {
        Self {
            developer: DeveloperToolsConfig {
                enabled: false,
                add_query_tools: false,
                add_ontology_maintenance: false,
            },
            query: QueryToolsConfig { enabled: false },
            user: UserToolsConfig {
                allow_ontology_maintenance: false,
            },
            ontology_questions: OntologyQuestionsConfig { enabled: false },
            data_liaison: DataLiaisonConfig { enabled: false },
            agent_tools: AgentToolsConfig { enabled: false },
        }
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
