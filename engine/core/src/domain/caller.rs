// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Caller Identity
//!
//! Identity is verified upstream; the engine only sees an opaque
//! [`CallerClassification`] and the raw tenant identifier carried by the
//! request's [`Claims`]. Nothing here is persisted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metadata::MetadataOrigin;

/// Who is acting, as far as capability policy is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerClassification {
    Unauthenticated,
    Agent,
    User,
    Administrator,
}

impl CallerClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Agent => "agent",
            Self::User => "user",
            Self::Administrator => "administrator",
        }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, Self::Agent)
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }

    /// Provenance stamped on metadata written by this caller.
    pub fn metadata_origin(&self) -> MetadataOrigin {
        match self {
            Self::User | Self::Administrator => MetadataOrigin::Manual,
            Self::Agent | Self::Unauthenticated => MetadataOrigin::Automated,
        }
    }
}

impl fmt::Display for CallerClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallerClassification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unauthenticated" | "anonymous" => Ok(Self::Unauthenticated),
            "agent" => Ok(Self::Agent),
            "user" => Ok(Self::User),
            "administrator" | "admin" => Ok(Self::Administrator),
            other => Err(format!("unknown caller classification '{}'", other)),
        }
    }
}

/// Tenant (project) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub Uuid);

impl TenantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse tenant ID from string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Verified claims attached to a request by the identity layer.
///
/// `tenant` is kept raw; it is validated by the guard so that a malformed
/// identifier surfaces as `InvalidTenant` rather than a deserialization error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub subject: String,
    pub classification: CallerClassification,
    pub tenant: String,
}

impl Claims {
    pub fn new(
        subject: impl Into<String>,
        classification: CallerClassification,
        tenant: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            classification,
            tenant: tenant.into(),
        }
    }
}

/// Per-request context handed to the guard and the discovery filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub claims: Option<Claims>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            claims: None,
        }
    }

    pub fn with_claims(claims: Claims) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            claims: Some(claims),
        }
    }
}
