// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Boundary Contracts
//!
//! Everything the engine consumes but does not own. Interfaces live in the
//! domain layer; implementations live in `crate::infrastructure`.
//!
//! | Trait | Collaborator | Implementations |
//! |-------|--------------|-----------------|
//! | `ClaimsSource` | identity / claims layer | `RequestClaimsSource` |
//! | `TenantResourceProvider` | tenant-scoped connection provider | `PgTenantResourceProvider`, `InMemoryTenantResourceProvider` |
//! | `TenantPolicyRepository` | tenant policy configuration store | `InMemoryTenantPolicyRepository`, `PostgresTenantPolicyRepository` |
//! | `IntegrationOracle` | integration-presence lookup | `StaticIntegrationOracle` |
//! | `MetadataRepository` | metadata store | `InMemoryMetadataRepository`, `PostgresMetadataRepository` |
//!
//! The stores provide their own concurrency control; nothing here is cached
//! in-process across requests.

use async_trait::async_trait;

use crate::domain::caller::{Claims, RequestContext, TenantId};
use crate::domain::metadata::{MetadataKey, MetadataRecord};
use crate::domain::tenant_policy::TenantPolicyConfiguration;

/// Extracts verified claims from a request context.
pub trait ClaimsSource: Send + Sync {
    fn claims(&self, ctx: &RequestContext) -> Option<Claims>;
}

/// A tenant-scoped resource (connection, transaction) owned by one request.
///
/// `release` must be idempotent. Holders normally never call it directly:
/// [`crate::application::guard::TenantLease`] releases on drop.
pub trait TenantScope: Send {
    fn tenant_id(&self) -> TenantId;

    fn release(&mut self);

    fn is_released(&self) -> bool;
}

#[async_trait]
pub trait TenantResourceProvider: Send + Sync {
    async fn acquire(&self, tenant_id: TenantId) -> Result<Box<dyn TenantScope>, RepositoryError>;
}

/// Tenant policy persistence. `None` from `get` means "unconfigured".
#[async_trait]
pub trait TenantPolicyRepository: Send + Sync {
    async fn get_policy_configuration(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<TenantPolicyConfiguration>, RepositoryError>;

    /// Create or replace the tenant's record.
    async fn save_policy_configuration(
        &self,
        tenant_id: TenantId,
        config: &TenantPolicyConfiguration,
    ) -> Result<(), RepositoryError>;

    /// Remove the record, returning the tenant to "unconfigured".
    async fn delete_policy_configuration(&self, tenant_id: TenantId) -> Result<(), RepositoryError>;
}

/// Whether the optional data-liaison integration is installed for a tenant.
#[async_trait]
pub trait IntegrationOracle: Send + Sync {
    async fn is_integration_installed(&self, tenant_id: TenantId) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait MetadataRepository: Send + Sync {
    async fn get_existing(&self, key: &MetadataKey) -> Result<Option<MetadataRecord>, RepositoryError>;

    async fn put(&self, key: &MetadataKey, record: &MetadataRecord) -> Result<(), RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Resource unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                RepositoryError::Unavailable(err.to_string())
            }
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
