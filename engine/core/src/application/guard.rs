// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Per-Request Guard
//!
//! The single choke point every capability invocation passes through before
//! its business logic runs.
//!
//! ## Processing Pipeline
//!
//! ```text
//! CapabilityGuard::authorize(ctx, capability)
//!   1. ClaimsSource::claims(ctx)            → Unauthorized
//!   2. TenantId::from_string(claims.tenant) → InvalidTenant
//!   3. TenantResourceProvider::acquire      → ResourceUnavailable
//!   4. PolicyLoader::resolve                → ConfigurationUnavailable
//!      (unauthenticated callers skip the store and get the floor)
//!   5. is_accessible                        → CapabilityNotEnabled
//!   └─ AuthorizedCall { lease, .. }
//! ```
//!
//! The tenant scope is wrapped in a [`TenantLease`] the moment it is acquired.
//! The lease releases the scope when dropped, so every early return in steps
//! 4 and 5, every panic, and cancellation of the `authorize` future itself
//! all release it. On success the lease moves into the [`AuthorizedCall`] and
//! the caller owns the release.

use std::sync::Arc;

use tracing::{info, warn};

use super::policy_loader::PolicyLoader;
use crate::domain::access::is_accessible;
use crate::domain::caller::{Claims, RequestContext, TenantId};
use crate::domain::capability::CapabilityCatalog;
use crate::domain::error::AccessError;
use crate::domain::loadout::GroupState;
use crate::domain::repository::{ClaimsSource, TenantResourceProvider, TenantScope};

/// Exclusive ownership of one tenant-scoped resource, released on drop.
pub struct TenantLease {
    scope: Box<dyn TenantScope>,
}

impl TenantLease {
    pub fn new(scope: Box<dyn TenantScope>) -> Self {
        Self { scope }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.scope.tenant_id()
    }

    pub fn scope(&self) -> &dyn TenantScope {
        self.scope.as_ref()
    }

    pub fn scope_mut(&mut self) -> &mut dyn TenantScope {
        self.scope.as_mut()
    }

    /// Release now rather than at end of scope.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for TenantLease {
    fn drop(&mut self) {
        if !self.scope.is_released() {
            self.scope.release();
        }
    }
}

impl std::fmt::Debug for TenantLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantLease")
            .field("tenant_id", &self.scope.tenant_id())
            .field("released", &self.scope.is_released())
            .finish()
    }
}

/// Successful authorization: the live tenant scope plus what was decided.
#[derive(Debug)]
pub struct AuthorizedCall {
    pub capability: String,
    pub claims: Claims,
    pub tenant_id: TenantId,
    pub state: GroupState,
    pub lease: TenantLease,
}

pub struct CapabilityGuard {
    catalog: Arc<CapabilityCatalog>,
    claims: Arc<dyn ClaimsSource>,
    resources: Arc<dyn TenantResourceProvider>,
    loader: PolicyLoader,
}

impl CapabilityGuard {
    pub fn new(
        catalog: Arc<CapabilityCatalog>,
        claims: Arc<dyn ClaimsSource>,
        resources: Arc<dyn TenantResourceProvider>,
        loader: PolicyLoader,
    ) -> Self {
        Self {
            catalog,
            claims,
            resources,
            loader,
        }
    }

    pub fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    /// Authorize one invocation of `capability` for the caller in `ctx`.
    pub async fn authorize(
        &self,
        ctx: &RequestContext,
        capability: &str,
    ) -> Result<AuthorizedCall, AccessError> {
        let result = self.authorize_inner(ctx, capability).await;

        let outcome = match &result {
            Ok(_) => "granted",
            Err(e) => e.code(),
        };
        metrics::counter!(
            "loadout_authorize_total",
            "capability" => capability_label(&self.catalog, capability).to_string(),
            "outcome" => outcome
        )
        .increment(1);

        match &result {
            Ok(call) => info!(
                request_id = %ctx.request_id,
                tenant_id = %call.tenant_id,
                classification = %call.claims.classification,
                capability,
                "Capability authorized"
            ),
            Err(e) => warn!(
                request_id = %ctx.request_id,
                capability,
                error = %e,
                "Capability authorization denied"
            ),
        }

        result
    }

    async fn authorize_inner(
        &self,
        ctx: &RequestContext,
        capability: &str,
    ) -> Result<AuthorizedCall, AccessError> {
        let claims = self.claims.claims(ctx).ok_or(AccessError::Unauthorized)?;

        let tenant_id = TenantId::from_string(&claims.tenant)
            .map_err(|_| AccessError::InvalidTenant(claims.tenant.clone()))?;

        let lease = TenantLease::new(
            self.resources
                .acquire(tenant_id)
                .await
                .map_err(|e| AccessError::ResourceUnavailable(e.to_string()))?,
        );

        // From here on `lease` drops on every early return.
        let state = self.loader.resolve(tenant_id, claims.classification).await?;

        if !is_accessible(
            &self.catalog,
            capability,
            &state,
            claims.classification.is_agent(),
        ) {
            return Err(AccessError::not_enabled(capability));
        }

        Ok(AuthorizedCall {
            capability: capability.to_string(),
            claims,
            tenant_id,
            state,
            lease,
        })
    }
}

/// Metric label for `capability`; names outside the catalog share one series.
fn capability_label<'a>(catalog: &CapabilityCatalog, capability: &'a str) -> &'a str {
    if catalog.contains(capability) {
        capability
    } else {
        "unknown"
    }
}
