// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Shared wiring for the integration tests: in-memory stores, a counting
//! tenant resource provider, and helpers to build request contexts.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;

use loadout_core::application::discovery::DiscoveryFilter;
use loadout_core::application::guard::CapabilityGuard;
use loadout_core::application::policy_loader::PolicyLoader;
use loadout_core::domain::caller::{CallerClassification, Claims, RequestContext, TenantId};
use loadout_core::domain::capability::{CapabilityCatalog, CapabilitySpec};
use loadout_core::domain::loadout::LoadoutId;
use loadout_core::domain::repository::{RepositoryError, TenantPolicyRepository};
use loadout_core::domain::tenant_policy::TenantPolicyConfiguration;
use loadout_core::infrastructure::claims::RequestClaimsSource;
use loadout_core::infrastructure::integrations::StaticIntegrationOracle;
use loadout_core::infrastructure::repositories::InMemoryTenantPolicyRepository;
use loadout_core::infrastructure::tenant_scope::InMemoryTenantResourceProvider;

pub const CLASSIFICATIONS: [CallerClassification; 4] = [
    CallerClassification::Unauthenticated,
    CallerClassification::Agent,
    CallerClassification::User,
    CallerClassification::Administrator,
];

pub struct Harness {
    pub catalog: Arc<CapabilityCatalog>,
    pub policies: Arc<dyn TenantPolicyRepository>,
    pub oracle: StaticIntegrationOracle,
    pub provider: InMemoryTenantResourceProvider,
    pub guard: Arc<CapabilityGuard>,
    pub discovery: Arc<DiscoveryFilter>,
}

impl Harness {
    pub fn new(catalog: CapabilityCatalog) -> Self {
        Self::with_policies(catalog, Arc::new(InMemoryTenantPolicyRepository::new()))
    }

    pub fn standard() -> Self {
        Self::new(CapabilityCatalog::standard())
    }

    pub fn with_policies(catalog: CapabilityCatalog, policies: Arc<dyn TenantPolicyRepository>) -> Self {
        Self::build(catalog, policies, InMemoryTenantResourceProvider::new())
    }

    pub fn build(
        catalog: CapabilityCatalog,
        policies: Arc<dyn TenantPolicyRepository>,
        provider: InMemoryTenantResourceProvider,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let oracle = StaticIntegrationOracle::default();
        let claims = Arc::new(RequestClaimsSource);
        let loader = PolicyLoader::new(policies.clone(), Arc::new(oracle.clone()));

        let guard = Arc::new(CapabilityGuard::new(
            catalog.clone(),
            claims.clone(),
            Arc::new(provider.clone()),
            loader.clone(),
        ));
        let discovery = Arc::new(DiscoveryFilter::new(claims, loader));

        Self {
            catalog,
            policies,
            oracle,
            provider,
            guard,
            discovery,
        }
    }

    pub async fn set_policy(&self, tenant: TenantId, config: &TenantPolicyConfiguration) {
        self.policies
            .save_policy_configuration(tenant, config)
            .await
            .unwrap();
    }

    pub async fn visible(&self, ctx: &RequestContext) -> Vec<String> {
        self.discovery
            .filter_names(ctx, &self.catalog)
            .await
            .unwrap()
    }
}

pub fn ctx(who: CallerClassification, tenant: TenantId) -> RequestContext {
    RequestContext::with_claims(Claims::new("subject-1", who, tenant.to_string()))
}

/// A catalog with the given number of members per loadout, named `<loadout>_<n>`.
pub fn sized_catalog(sizes: &[(LoadoutId, usize)]) -> CapabilityCatalog {
    let mut specs = Vec::new();
    for (loadout, count) in sizes {
        for n in 0..*count {
            let name = if *loadout == LoadoutId::Default {
                "health".to_string()
            } else {
                format!("{}_{}", loadout, n)
            };
            specs.push(CapabilitySpec::new(name, [*loadout]));
        }
    }
    CapabilityCatalog::new(specs).unwrap()
}

/// Every combination of the eight toggles. Bit 8 selects integration presence.
pub fn toggle_matrix() -> impl Iterator<Item = (TenantPolicyConfiguration, bool)> {
    (0u16..512).map(|mask| {
        let bit = |n: u16| mask & (1 << n) != 0;
        let mut config = TenantPolicyConfiguration::default();
        config.developer.enabled = bit(0);
        config.developer.add_query_tools = bit(1);
        config.developer.add_ontology_maintenance = bit(2);
        config.query.enabled = bit(3);
        config.user.allow_ontology_maintenance = bit(4);
        config.ontology_questions.enabled = bit(5);
        config.data_liaison.enabled = bit(6);
        config.agent_tools.enabled = bit(7);
        (config, bit(8))
    })
}

/// Policy store that always fails.
pub struct UnavailablePolicyStore;

#[async_trait]
impl TenantPolicyRepository for UnavailablePolicyStore {
    async fn get_policy_configuration(
        &self,
        _tenant_id: TenantId,
    ) -> Result<Option<TenantPolicyConfiguration>, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".into()))
    }

    async fn save_policy_configuration(
        &self,
        _tenant_id: TenantId,
        _config: &TenantPolicyConfiguration,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".into()))
    }

    async fn delete_policy_configuration(&self, _tenant_id: TenantId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".into()))
    }
}

/// Policy store whose reads never complete.
pub struct HangingPolicyStore;

#[async_trait]
impl TenantPolicyRepository for HangingPolicyStore {
    async fn get_policy_configuration(
        &self,
        _tenant_id: TenantId,
    ) -> Result<Option<TenantPolicyConfiguration>, RepositoryError> {
        std::future::pending().await
    }

    async fn save_policy_configuration(
        &self,
        _tenant_id: TenantId,
        _config: &TenantPolicyConfiguration,
    ) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn delete_policy_configuration(&self, _tenant_id: TenantId) -> Result<(), RepositoryError> {
        Ok(())
    }
}
