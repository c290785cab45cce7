// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the store contracts defined in
//! `crate::domain::repository`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist tenant policy records and metadata records
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! ## PostgreSQL Repositories
//!
//! - **PostgresTenantPolicyRepository** - `tenant_policies` table, JSONB document per tenant
//! - **PostgresMetadataRepository** - `metadata_records` table, one row per annotated field
//!
//! ## In-Memory Repositories
//!
//! Lightweight implementations for tests, the CLI and single-process deployments:
//! - **InMemoryTenantPolicyRepository**
//! - **InMemoryMetadataRepository**

pub mod postgres_metadata;
pub mod postgres_policy;

pub use postgres_metadata::PostgresMetadataRepository;
pub use postgres_policy::PostgresTenantPolicyRepository;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::caller::TenantId;
use crate::domain::metadata::{MetadataKey, MetadataRecord};
use crate::domain::repository::{MetadataRepository, RepositoryError, TenantPolicyRepository};
use crate::domain::tenant_policy::TenantPolicyConfiguration;

#[derive(Clone, Default)]
pub struct InMemoryTenantPolicyRepository {
    policies: Arc<RwLock<HashMap<TenantId, TenantPolicyConfiguration>>>,
}

impl InMemoryTenantPolicyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.policies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.read().is_empty()
    }
}

#[async_trait]
impl TenantPolicyRepository for InMemoryTenantPolicyRepository {
    async fn get_policy_configuration(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<TenantPolicyConfiguration>, RepositoryError> {
        Ok(self.policies.read().get(&tenant_id).cloned())
    }

    async fn save_policy_configuration(
        &self,
        tenant_id: TenantId,
        config: &TenantPolicyConfiguration,
    ) -> Result<(), RepositoryError> {
        self.policies.write().insert(tenant_id, config.clone());
        Ok(())
    }

    async fn delete_policy_configuration(&self, tenant_id: TenantId) -> Result<(), RepositoryError> {
        self.policies.write().remove(&tenant_id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryMetadataRepository {
    records: Arc<RwLock<HashMap<MetadataKey, MetadataRecord>>>,
}

impl InMemoryMetadataRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records belonging to one tenant, sorted by key for stable output.
    pub fn list_for_tenant(&self, tenant_id: TenantId) -> Vec<(MetadataKey, MetadataRecord)> {
        let mut records: Vec<_> = self
            .records
            .read()
            .iter()
            .filter(|(key, _)| key.tenant_id == tenant_id)
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect();
        records.sort_by_key(|(key, _)| key.to_string());
        records
    }
}

#[async_trait]
impl MetadataRepository for InMemoryMetadataRepository {
    async fn get_existing(&self, key: &MetadataKey) -> Result<Option<MetadataRecord>, RepositoryError> {
        Ok(self.records.read().get(key).cloned())
    }

    async fn put(&self, key: &MetadataKey, record: &MetadataRecord) -> Result<(), RepositoryError> {
        self.records.write().insert(key.clone(), record.clone());
        Ok(())
    }
}
