// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Metadata Records and Write Arbitration
//!
//! Shared metadata (table, column and relationship annotations) carries the
//! provenance of its last write. Once a human has written a field, automated
//! writers may no longer overwrite it.
//!
//! | Existing | Actor | Allowed |
//! |----------|-------|---------|
//! | absent | any | yes |
//! | `Manual` | `Manual` | yes |
//! | `Manual` | `Automated` | no (`PrecedenceBlocked`) |
//! | `Automated` | any | yes |
//!
//! This is independent of capability access; mutating handlers check both.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::caller::TenantId;
use super::error::AccessError;

/// Provenance of a metadata value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataOrigin {
    /// Written by a human or administrative actor.
    Manual,
    /// Written by an agent or scheduled job.
    Automated,
}

impl MetadataOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automated => "automated",
        }
    }
}

impl fmt::Display for MetadataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MetadataOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "automated" => Ok(Self::Automated),
            other => Err(format!("unknown metadata origin '{}'", other)),
        }
    }
}

/// Which schema object an annotation is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetadataTarget {
    Table {
        table: String,
    },
    Column {
        table: String,
        column: String,
    },
    Relationship {
        from_table: String,
        from_column: String,
        to_table: String,
        to_column: String,
    },
}

impl MetadataTarget {
    /// Stable textual path, used as the storage key. Identifiers are quoted
    /// the way SQL quotes them, so distinct targets never share a path.
    pub fn path(&self) -> String {
        match self {
            Self::Table { table } => format!("table:{}", quote_ident(table)),
            Self::Column { table, column } => {
                format!("column:{}.{}", quote_ident(table), quote_ident(column))
            }
            Self::Relationship {
                from_table,
                from_column,
                to_table,
                to_column,
            } => format!(
                "relationship:{}.{}->{}.{}",
                quote_ident(from_table),
                quote_ident(from_column),
                quote_ident(to_table),
                quote_ident(to_column)
            ),
        }
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Address of one annotated field within a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataKey {
    pub tenant_id: TenantId,
    pub target: MetadataTarget,
    pub field: String,
}

impl MetadataKey {
    pub fn new(tenant_id: TenantId, target: MetadataTarget, field: impl Into<String>) -> Self {
        Self {
            tenant_id,
            target,
            field: field.into(),
        }
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.tenant_id, self.target.path(), self.field)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub value: Value,
    pub origin: MetadataOrigin,
    pub updated_at: DateTime<Utc>,
}

impl MetadataRecord {
    pub fn new(value: Value, origin: MetadataOrigin) -> Self {
        Self {
            value,
            origin,
            updated_at: Utc::now(),
        }
    }
}

/// Whether an actor of `actor` origin may overwrite `existing`.
pub fn can_overwrite(existing: Option<&MetadataRecord>, actor: MetadataOrigin) -> bool {
    match existing {
        None => true,
        Some(record) => match record.origin {
            MetadataOrigin::Automated => true,
            MetadataOrigin::Manual => actor == MetadataOrigin::Manual,
        },
    }
}

/// [`can_overwrite`] as a `Result`, carrying both origins on denial.
pub fn check_overwrite(
    existing: Option<&MetadataRecord>,
    actor: MetadataOrigin,
) -> Result<(), AccessError> {
    if can_overwrite(existing, actor) {
        return Ok(());
    }
    // Only a Manual record can block.
    Err(AccessError::PrecedenceBlocked {
        existing: MetadataOrigin::Manual,
        attempted: actor,
    })
}
