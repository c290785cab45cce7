// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Embedded engine
//!
//! Builds the engine's services in-process from an [`EngineConfig`] and runs
//! policy queries directly against them.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use loadout_core::{
    application::{
        discovery::DiscoveryFilter,
        guard::{AuthorizedCall, CapabilityGuard},
        policy_admin::{EffectivePolicy, TenantPolicyAdmin},
        policy_loader::PolicyLoader,
    },
    domain::{
        caller::{CallerClassification, Claims, RequestContext, TenantId},
        capability::CapabilityCatalog,
        engine_config::{EngineConfig, StorageBackend},
        error::AccessError,
        loadout::GroupState,
        repository::{TenantPolicyRepository, TenantResourceProvider},
    },
    infrastructure::{
        claims::RequestClaimsSource,
        db::Database,
        integrations::StaticIntegrationOracle,
        repositories::{InMemoryTenantPolicyRepository, PostgresTenantPolicyRepository},
        tenant_scope::{InMemoryTenantResourceProvider, PgTenantResourceProvider},
    },
};

pub struct EmbeddedEngine {
    catalog: Arc<CapabilityCatalog>,
    loader: PolicyLoader,
    guard: CapabilityGuard,
    discovery: DiscoveryFilter,
    admin: TenantPolicyAdmin,
}

impl EmbeddedEngine {
    pub async fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config =
            EngineConfig::load_or_default(config_path).context("Failed to load configuration")?;
        config
            .validate()
            .context("Configuration validation failed")?;
        Self::from_config(&config).await
    }

    pub async fn from_config(config: &EngineConfig) -> Result<Self> {
        let oracle = StaticIntegrationOracle::default();
        for seed in &config.spec.tenants {
            oracle.set_installed(seed.tenant_id()?, seed.integration_installed);
        }

        let (policies, resources): (
            Arc<dyn TenantPolicyRepository>,
            Arc<dyn TenantResourceProvider>,
        ) = match config.spec.storage.backend {
            StorageBackend::InMemory => (
                Arc::new(InMemoryTenantPolicyRepository::new()),
                Arc::new(InMemoryTenantResourceProvider::new()),
            ),
            StorageBackend::Postgres => {
                let url = config
                    .spec
                    .storage
                    .resolved_connection_string()
                    .context("spec.storage.connectionString did not resolve")?;
                let db = Database::new(&url, config.spec.storage.max_connections).await?;
                db.ensure_schema().await?;
                (
                    Arc::new(PostgresTenantPolicyRepository::new(db.get_pool().clone())),
                    Arc::new(PgTenantResourceProvider::new(db.get_pool().clone())),
                )
            }
        };

        seed_policies(policies.as_ref(), config).await?;

        let catalog = Arc::new(CapabilityCatalog::standard());
        let claims = Arc::new(RequestClaimsSource);
        let loader = PolicyLoader::new(policies.clone(), Arc::new(oracle));
        let guard = CapabilityGuard::new(catalog.clone(), claims.clone(), resources, loader.clone());
        let discovery = DiscoveryFilter::new(claims.clone(), loader.clone());
        let admin = TenantPolicyAdmin::new(claims, policies);

        Ok(Self {
            catalog,
            loader,
            guard,
            discovery,
            admin,
        })
    }

    pub fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    pub async fn effective_policy(&self, tenant_id: TenantId) -> Result<EffectivePolicy> {
        Ok(self.admin.effective(tenant_id).await?)
    }

    pub async fn resolve(&self, tenant_id: TenantId, who: CallerClassification) -> Result<GroupState> {
        Ok(self.loader.resolve(tenant_id, who).await?)
    }

    pub async fn visible(&self, tenant_id: TenantId, who: CallerClassification) -> Result<Vec<String>> {
        Ok(self
            .discovery
            .filter_names(&operator_context(tenant_id, who), &self.catalog)
            .await?)
    }

    /// Run the full guard for one capability. The lease is released on return.
    pub async fn check(
        &self,
        tenant_id: TenantId,
        who: CallerClassification,
        capability: &str,
    ) -> Result<GroupState, AccessError> {
        let AuthorizedCall { state, lease, .. } = self
            .guard
            .authorize(&operator_context(tenant_id, who), capability)
            .await?;
        lease.release();
        Ok(state)
    }
}

/// Write seeded policies for tenants the store does not know yet.
async fn seed_policies(policies: &dyn TenantPolicyRepository, config: &EngineConfig) -> Result<()> {
    for seed in &config.spec.tenants {
        let Some(policy) = &seed.policy else {
            continue;
        };
        let tenant_id = seed.tenant_id()?;
        if policies
            .get_policy_configuration(tenant_id)
            .await
            .context("Failed to read tenant policy")?
            .is_none()
        {
            policies
                .save_policy_configuration(tenant_id, policy)
                .await
                .context("Failed to seed tenant policy")?;
            tracing::info!(tenant_id = %tenant_id, "Seeded tenant policy from configuration");
        }
    }
    Ok(())
}

fn operator_context(tenant_id: TenantId, who: CallerClassification) -> RequestContext {
    RequestContext::with_claims(Claims::new("loadout-cli", who, tenant_id.to_string()))
}
