// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Tenant Policy Administration
//!
//! A tenant has no policy record until an administrator first customizes it.
//! `customize` creates the record lazily from defaults; `reset` deletes it
//! so the tenant resolves through defaults again. Writes go straight to the
//! store and the next authorization observes them.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::caller::{CallerClassification, RequestContext, TenantId};
use crate::domain::error::AccessError;
use crate::domain::repository::{ClaimsSource, TenantPolicyRepository};
use crate::domain::tenant_policy::TenantPolicyConfiguration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePolicy {
    pub tenant_id: TenantId,
    pub configuration: TenantPolicyConfiguration,
    /// `false` when `configuration` is the defaults.
    pub is_configured: bool,
}

pub struct TenantPolicyAdmin {
    claims: Arc<dyn ClaimsSource>,
    policies: Arc<dyn TenantPolicyRepository>,
}

impl TenantPolicyAdmin {
    pub fn new(claims: Arc<dyn ClaimsSource>, policies: Arc<dyn TenantPolicyRepository>) -> Self {
        Self { claims, policies }
    }

    pub async fn effective(&self, tenant_id: TenantId) -> Result<EffectivePolicy, AccessError> {
        let stored = self
            .policies
            .get_policy_configuration(tenant_id)
            .await
            .map_err(|e| AccessError::ConfigurationUnavailable(e.to_string()))?;

        Ok(EffectivePolicy {
            tenant_id,
            is_configured: stored.is_some(),
            configuration: stored.unwrap_or_default(),
        })
    }

    /// Apply `edit` to the caller's tenant record, creating it from defaults if absent.
    pub async fn customize<F>(
        &self,
        ctx: &RequestContext,
        edit: F,
    ) -> Result<TenantPolicyConfiguration, AccessError>
    where
        F: FnOnce(&mut TenantPolicyConfiguration) + Send,
    {
        let tenant_id = self.administrator_tenant(ctx)?;
        let EffectivePolicy {
            mut configuration,
            is_configured,
            ..
        } = self.effective(tenant_id).await?;

        edit(&mut configuration);

        self.policies
            .save_policy_configuration(tenant_id, &configuration)
            .await
            .map_err(|e| AccessError::ConfigurationUnavailable(e.to_string()))?;

        info!(
            request_id = %ctx.request_id,
            tenant_id = %tenant_id,
            created = !is_configured,
            "Tenant policy updated"
        );
        Ok(configuration)
    }

    /// Drop the caller's tenant record.
    pub async fn reset(&self, ctx: &RequestContext) -> Result<(), AccessError> {
        let tenant_id = self.administrator_tenant(ctx)?;
        self.policies
            .delete_policy_configuration(tenant_id)
            .await
            .map_err(|e| AccessError::ConfigurationUnavailable(e.to_string()))?;
        info!(request_id = %ctx.request_id, tenant_id = %tenant_id, "Tenant policy reset to defaults");
        Ok(())
    }

    fn administrator_tenant(&self, ctx: &RequestContext) -> Result<TenantId, AccessError> {
        let claims = self.claims.claims(ctx).ok_or(AccessError::Unauthorized)?;
        if claims.classification != CallerClassification::Administrator {
            return Err(AccessError::AdministratorRequired);
        }
        TenantId::from_string(&claims.tenant).map_err(|_| AccessError::InvalidTenant(claims.tenant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::caller::Claims;
    use crate::infrastructure::claims::RequestClaimsSource;
    use crate::infrastructure::repositories::InMemoryTenantPolicyRepository;

    fn admin() -> TenantPolicyAdmin {
        TenantPolicyAdmin::new(
            Arc::new(RequestClaimsSource),
            Arc::new(InMemoryTenantPolicyRepository::new()),
        )
    }

    fn ctx(who: CallerClassification, tenant: TenantId) -> RequestContext {
        RequestContext::with_claims(Claims::new("alice", who, tenant.to_string()))
    }

    #[tokio::test]
    async fn test_lazy_creation_and_reset() {
        let admin = admin();
        let tenant = TenantId::new();

        let before = admin.effective(tenant).await.unwrap();
        assert!(!before.is_configured);
        assert_eq!(before.configuration, TenantPolicyConfiguration::default());

        let updated = admin
            .customize(&ctx(CallerClassification::Administrator, tenant), |c| {
                c.agent_tools.enabled = true
            })
            .await
            .unwrap();
        assert!(updated.agent_tools.enabled);
        // Untouched sections keep their defaults.
        assert!(updated.query.enabled);

        let after = admin.effective(tenant).await.unwrap();
        assert!(after.is_configured);
        assert!(after.configuration.agent_tools.enabled);

        admin
            .reset(&ctx(CallerClassification::Administrator, tenant))
            .await
            .unwrap();
        assert!(!admin.effective(tenant).await.unwrap().is_configured);
    }

    #[tokio::test]
    async fn test_non_administrators_rejected() {
        let admin = admin();
        let tenant = TenantId::new();

        for who in [CallerClassification::User, CallerClassification::Agent] {
            let err = admin
                .customize(&ctx(who, tenant), |c| c.query.enabled = false)
                .await
                .unwrap_err();
            assert_eq!(err, AccessError::AdministratorRequired);
        }
        assert_eq!(
            admin.reset(&RequestContext::anonymous()).await.unwrap_err(),
            AccessError::Unauthorized
        );
        assert!(!admin.effective(tenant).await.unwrap().is_configured);
    }
}
