// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Discovery Filter
//!
//! Lists the capabilities a caller may invoke. Identity is extracted exactly
//! as [`super::guard::CapabilityGuard`] does it, but failure to identify the
//! caller (no claims, or a malformed tenant identifier) degrades to the
//! unauthenticated view instead of erroring. Unauthenticated callers never
//! read the configuration store; for everyone else read failures propagate.
//!
//! No tenant resource is acquired; discovery has no side effects beyond
//! reading the configuration store.

use std::sync::Arc;

use tracing::debug;

use super::policy_loader::PolicyLoader;
use crate::domain::access::is_accessible;
use crate::domain::caller::{CallerClassification, RequestContext, TenantId};
use crate::domain::capability::{CapabilityCatalog, CapabilitySpec};
use crate::domain::error::AccessError;
use crate::domain::loadout::GroupState;
use crate::domain::repository::ClaimsSource;

pub struct DiscoveryFilter {
    claims: Arc<dyn ClaimsSource>,
    loader: PolicyLoader,
}

impl DiscoveryFilter {
    pub fn new(claims: Arc<dyn ClaimsSource>, loader: PolicyLoader) -> Self {
        Self { claims, loader }
    }

    /// The accessible subset of `catalog`, in catalog order.
    pub async fn filter<'a>(
        &self,
        ctx: &RequestContext,
        catalog: &'a CapabilityCatalog,
    ) -> Result<Vec<&'a CapabilitySpec>, AccessError> {
        let identity = self.claims.claims(ctx).and_then(|claims| {
            TenantId::from_string(&claims.tenant)
                .ok()
                .map(|tenant_id| (tenant_id, claims.classification))
        });

        let (state, who) = match identity {
            Some((tenant_id, who)) => (self.loader.resolve(tenant_id, who).await?, who),
            None => {
                debug!(request_id = %ctx.request_id, "No usable identity; listing unauthenticated view");
                (GroupState::floor(), CallerClassification::Unauthenticated)
            }
        };

        metrics::counter!("loadout_discovery_total", "classification" => who.as_str())
            .increment(1);

        Ok(catalog
            .all()
            .iter()
            .filter(|spec| is_accessible(catalog, &spec.name, &state, who.is_agent()))
            .collect())
    }

    /// Names only, for transport layers that list capabilities by name.
    pub async fn filter_names(
        &self,
        ctx: &RequestContext,
        catalog: &CapabilityCatalog,
    ) -> Result<Vec<String>, AccessError> {
        Ok(self
            .filter(ctx, catalog)
            .await?
            .into_iter()
            .map(|spec| spec.name.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::caller::Claims;
    use crate::domain::capability::HEALTH_CAPABILITY;
    use crate::infrastructure::claims::RequestClaimsSource;
    use crate::infrastructure::integrations::StaticIntegrationOracle;
    use crate::infrastructure::repositories::InMemoryTenantPolicyRepository;

    fn discovery() -> DiscoveryFilter {
        let loader = PolicyLoader::new(
            Arc::new(InMemoryTenantPolicyRepository::new()),
            Arc::new(StaticIntegrationOracle::new([])),
        );
        DiscoveryFilter::new(Arc::new(RequestClaimsSource), loader)
    }

    #[tokio::test]
    async fn test_unusable_identity_degrades_to_floor() {
        let catalog = CapabilityCatalog::standard();
        let filter = discovery();

        let anonymous = filter
            .filter_names(&RequestContext::anonymous(), &catalog)
            .await
            .unwrap();
        assert_eq!(anonymous, vec![HEALTH_CAPABILITY.to_string()]);

        let malformed = RequestContext::with_claims(Claims::new(
            "svc",
            CallerClassification::Administrator,
            "not-a-uuid",
        ));
        let names = filter.filter_names(&malformed, &catalog).await.unwrap();
        assert_eq!(names, vec![HEALTH_CAPABILITY.to_string()]);
    }

    #[tokio::test]
    async fn test_administrator_view_keeps_catalog_order() {
        let catalog = CapabilityCatalog::standard();
        let ctx = RequestContext::with_claims(Claims::new(
            "admin",
            CallerClassification::Administrator,
            TenantId::new().to_string(),
        ));

        let names = discovery().filter_names(&ctx, &catalog).await.unwrap();
        assert!(names.len() > 1);

        let positions: Vec<usize> = names
            .iter()
            .map(|name| catalog.all().iter().position(|spec| &spec.name == name).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
