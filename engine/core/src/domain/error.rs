// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Access Error Taxonomy
//!
//! | Variant | Kind |
//! |---------|------|
//! | `Unauthorized`, `InvalidTenant` | request failure |
//! | `ResourceUnavailable`, `ConfigurationUnavailable`, `MetadataStoreUnavailable` | transient infrastructure failure |
//! | `CapabilityNotEnabled`, `PrecedenceBlocked` | expected policy outcome, user-facing |
//! | `InvalidParameter`, `MissingParameter` | malformed capability arguments |
//! | `AdministratorRequired` | policy administration by a non-administrator |
//! | `Handler` | failure inside a capability's own logic |

use thiserror::Error;

use super::metadata::MetadataOrigin;
use super::parameters::ValueKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Unauthorized: no caller identity on request")]
    Unauthorized,

    #[error("Invalid tenant identifier: {0}")]
    InvalidTenant(String),

    #[error("Tenant resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Tenant policy configuration unavailable: {0}")]
    ConfigurationUnavailable(String),

    #[error("Capability '{capability}' is not enabled for this caller")]
    CapabilityNotEnabled { capability: String },

    #[error("Write blocked: value of {existing} origin cannot be overwritten by an actor of {attempted} origin")]
    PrecedenceBlocked {
        existing: MetadataOrigin,
        attempted: MetadataOrigin,
    },

    #[error("Invalid parameter '{name}': expected {expected_kind}, got {actual_kind}")]
    InvalidParameter {
        name: String,
        expected_kind: ValueKind,
        actual_kind: ValueKind,
    },

    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("Metadata store unavailable: {0}")]
    MetadataStoreUnavailable(String),

    #[error("Administrator classification required")]
    AdministratorRequired,

    #[error("Capability handler failed: {0}")]
    Handler(String),
}

impl AccessError {
    pub fn not_enabled(capability: impl Into<String>) -> Self {
        Self::CapabilityNotEnabled {
            capability: capability.into(),
        }
    }

    /// Expected, user-facing policy outcomes (as opposed to faults).
    pub fn is_policy_denial(&self) -> bool {
        matches!(
            self,
            Self::CapabilityNotEnabled { .. } | Self::PrecedenceBlocked { .. }
        )
    }

    /// Short stable label used in metrics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidTenant(_) => "invalid_tenant",
            Self::ResourceUnavailable(_) => "resource_unavailable",
            Self::ConfigurationUnavailable(_) => "configuration_unavailable",
            Self::CapabilityNotEnabled { .. } => "capability_not_enabled",
            Self::PrecedenceBlocked { .. } => "precedence_blocked",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::MissingParameter(_) => "missing_parameter",
            Self::MetadataStoreUnavailable(_) => "metadata_store_unavailable",
            Self::AdministratorRequired => "administrator_required",
            Self::Handler(_) => "handler",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_detail() {
        let err = AccessError::not_enabled("update_column");
        assert_eq!(err.to_string(), "Capability 'update_column' is not enabled for this caller");

        let err = AccessError::PrecedenceBlocked {
            existing: MetadataOrigin::Manual,
            attempted: MetadataOrigin::Automated,
        };
        assert_eq!(
            err.to_string(),
            "Write blocked: value of manual origin cannot be overwritten by an actor of automated origin"
        );
    }

    #[test]
    fn test_policy_denials() {
        assert!(AccessError::not_enabled("echo").is_policy_denial());
        assert!(!AccessError::Unauthorized.is_policy_denial());
        assert!(!AccessError::ConfigurationUnavailable("timeout".into()).is_policy_denial());
    }
}
