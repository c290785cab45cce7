// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Policy Loader
//!
//! Fetches everything the resolver needs for one (tenant, caller) pair and
//! resolves it. Shared by [`super::guard::CapabilityGuard`] and
//! [`super::discovery::DiscoveryFilter`] so that both go through the exact
//! same load-and-resolve path.
//!
//! Nothing is cached: every call reads the configuration store.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::caller::{CallerClassification, TenantId};
use crate::domain::error::AccessError;
use crate::domain::loadout::GroupState;
use crate::domain::repository::{IntegrationOracle, TenantPolicyRepository};
use crate::domain::resolver::{resolve_group_state, IntegrationPresence};
use crate::domain::tenant_policy::TenantPolicyConfiguration;

#[derive(Clone)]
pub struct PolicyLoader {
    policies: Arc<dyn TenantPolicyRepository>,
    integrations: Arc<dyn IntegrationOracle>,
}

impl PolicyLoader {
    pub fn new(
        policies: Arc<dyn TenantPolicyRepository>,
        integrations: Arc<dyn IntegrationOracle>,
    ) -> Self {
        Self {
            policies,
            integrations,
        }
    }

    /// `Ok(None)` is the "unconfigured" state.
    pub async fn load_configuration(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<TenantPolicyConfiguration>, AccessError> {
        self.policies
            .get_policy_configuration(tenant_id)
            .await
            .map_err(|e| AccessError::ConfigurationUnavailable(e.to_string()))
    }

    /// Oracle failures degrade to [`IntegrationPresence::Unknown`].
    pub async fn integration_presence(&self, tenant_id: TenantId) -> IntegrationPresence {
        match self.integrations.is_integration_installed(tenant_id).await {
            Ok(installed) => IntegrationPresence::from(installed),
            Err(e) => {
                warn!(
                    tenant_id = %tenant_id,
                    error = %e,
                    "Integration presence lookup failed; omitting data liaison loadout"
                );
                IntegrationPresence::Unknown
            }
        }
    }

    /// Load the configuration and resolve the caller's group state.
    /// Unauthenticated callers get the floor without touching the store.
    pub async fn resolve(
        &self,
        tenant_id: TenantId,
        who: CallerClassification,
    ) -> Result<GroupState, AccessError> {
        if who == CallerClassification::Unauthenticated {
            return Ok(GroupState::floor());
        }
        let config = self.load_configuration(tenant_id).await?;
        Ok(self.resolve_loaded(tenant_id, config.as_ref(), who).await)
    }

    /// Resolve against an already loaded configuration.
    pub async fn resolve_loaded(
        &self,
        tenant_id: TenantId,
        config: Option<&TenantPolicyConfiguration>,
        who: CallerClassification,
    ) -> GroupState {
        // The oracle only matters for human callers with the loadout switched on.
        let wants_liaison = matches!(
            who,
            CallerClassification::User | CallerClassification::Administrator
        ) && config.map_or(true, |c| c.data_liaison.enabled);

        let integration = if wants_liaison {
            self.integration_presence(tenant_id).await
        } else {
            IntegrationPresence::NotInstalled
        };

        let state = resolve_group_state(config, who, integration);
        debug!(
            tenant_id = %tenant_id,
            classification = %who,
            configured = config.is_some(),
            state = %state,
            "Resolved group state"
        );
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::loadout::LoadoutId;
    use crate::domain::repository::RepositoryError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedPolicy(Option<TenantPolicyConfiguration>);

    #[async_trait]
    impl TenantPolicyRepository for FixedPolicy {
        async fn get_policy_configuration(
            &self,
            _tenant_id: TenantId,
        ) -> Result<Option<TenantPolicyConfiguration>, RepositoryError> {
            Ok(self.0.clone())
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

    struct BrokenPolicy;

    #[async_trait]
    impl TenantPolicyRepository for BrokenPolicy {
        async fn get_policy_configuration(
            &self,
            _tenant_id: TenantId,
        ) -> Result<Option<TenantPolicyConfiguration>, RepositoryError> {
            Err(RepositoryError::Unavailable("pool timed out".into()))
        }

        async fn save_policy_configuration(
            &self,
            _tenant_id: TenantId,
            _config: &TenantPolicyConfiguration,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("pool timed out".into()))
        }

        async fn delete_policy_configuration(&self, _tenant_id: TenantId) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("pool timed out".into()))
        }
    }

    #[derive(Default)]
    struct CountingOracle {
        answer: Option<bool>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IntegrationOracle for CountingOracle {
        async fn is_integration_installed(&self, _tenant_id: TenantId) -> anyhow::Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .ok_or_else(|| anyhow::anyhow!("integration registry offline"))
        }
    }

    fn loader(
        policy: impl TenantPolicyRepository + 'static,
        oracle: Arc<CountingOracle>,
    ) -> PolicyLoader {
        PolicyLoader::new(Arc::new(policy), oracle)
    }

    #[tokio::test]
    async fn test_store_failure_is_configuration_unavailable() {
        let loader = loader(BrokenPolicy, Arc::new(CountingOracle::default()));
        let err = loader
            .resolve(TenantId::new(), CallerClassification::User)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::ConfigurationUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unauthenticated_skips_store() {
        let loader = loader(BrokenPolicy, Arc::new(CountingOracle::default()));
        let state = loader
            .resolve(TenantId::new(), CallerClassification::Unauthenticated)
            .await
            .unwrap();
        assert_eq!(state, GroupState::floor());
    }

    #[tokio::test]
    async fn test_oracle_failure_omits_data_liaison() {
        let oracle = Arc::new(CountingOracle::default());
        let loader = loader(FixedPolicy(None), oracle.clone());

        let state = loader
            .resolve(TenantId::new(), CallerClassification::Administrator)
            .await
            .unwrap();
        assert!(!state.contains(LoadoutId::DataLiaison));
        assert!(state.contains(LoadoutId::DeveloperCore));
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_installed_integration_adds_data_liaison() {
        let oracle = Arc::new(CountingOracle {
            answer: Some(true),
            ..Default::default()
        });
        let loader = loader(FixedPolicy(None), oracle);
        let state = loader
            .resolve(TenantId::new(), CallerClassification::User)
            .await
            .unwrap();
        assert!(state.contains(LoadoutId::DataLiaison));
    }

    #[tokio::test]
    async fn test_oracle_not_consulted_for_agents() {
        let oracle = Arc::new(CountingOracle {
            answer: Some(true),
            ..Default::default()
        });
        let loader = loader(FixedPolicy(None), oracle.clone());
        let state = loader
            .resolve(TenantId::new(), CallerClassification::Agent)
            .await
            .unwrap();
        assert_eq!(state, GroupState::floor());
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }
}
