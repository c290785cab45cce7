// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Capability Handlers
//!
//! Business logic behind a capability implements [`CapabilityHandler`] and
//! never authorizes itself. Wrapping it in a [`GuardedCapability`] (or
//! registering it with a [`CapabilityRouter`]) runs the guard first, hands
//! the handler the live tenant scope, and releases the scope afterwards.
//!
//! ```text
//! CapabilityRouter::invoke(ctx, name, args)
//!   └─ CapabilityGuard::authorize(ctx, name)   ← policy
//!   └─ CapabilityParams::from_value(args)      ← typed arguments
//!   └─ CapabilityHandler::handle(inv, scope)   ← business logic
//!   └─ TenantLease dropped                     ← release
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::discovery::DiscoveryFilter;
use super::guard::{AuthorizedCall, CapabilityGuard};
use crate::domain::caller::{CallerClassification, Claims, RequestContext, TenantId};
use crate::domain::error::AccessError;
use crate::domain::metadata::MetadataOrigin;
use crate::domain::parameters::CapabilityParams;
use crate::domain::repository::TenantScope;

/// One authorized call as seen by a handler.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub capability: String,
    pub claims: Claims,
    pub tenant_id: TenantId,
    pub params: CapabilityParams,
}

impl Invocation {
    pub fn classification(&self) -> CallerClassification {
        self.claims.classification
    }

    /// Origin recorded on metadata this caller writes.
    pub fn actor_origin(&self) -> MetadataOrigin {
        self.claims.classification.metadata_origin()
    }
}

#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    async fn handle(
        &self,
        invocation: &Invocation,
        scope: &mut dyn TenantScope,
    ) -> Result<Value, AccessError>;
}

/// A handler bound to its capability name and the guard.
#[derive(Clone)]
pub struct GuardedCapability {
    name: String,
    guard: Arc<CapabilityGuard>,
    handler: Arc<dyn CapabilityHandler>,
}

impl GuardedCapability {
    pub fn new(
        name: impl Into<String>,
        guard: Arc<CapabilityGuard>,
        handler: Arc<dyn CapabilityHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            guard,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn invoke(&self, ctx: &RequestContext, args: Value) -> Result<Value, AccessError> {
        let call = self.guard.authorize(ctx, &self.name).await?;
        execute(call, self.handler.as_ref(), args).await
    }
}

async fn execute(
    call: AuthorizedCall,
    handler: &dyn CapabilityHandler,
    args: Value,
) -> Result<Value, AccessError> {
    let AuthorizedCall {
        capability,
        claims,
        tenant_id,
        mut lease,
        ..
    } = call;

    let invocation = Invocation {
        capability,
        claims,
        tenant_id,
        params: CapabilityParams::from_value(args)?,
    };

    let result = handler.handle(&invocation, lease.scope_mut()).await;
    lease.release();

    debug!(
        tenant_id = %invocation.tenant_id,
        capability = %invocation.capability,
        ok = result.is_ok(),
        "Capability handler finished"
    );
    result
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("Capability '{0}' is not in the catalog")]
    UnknownCapability(String),

    #[error("Capability '{0}' already has a handler")]
    AlreadyRegistered(String),
}

/// Name → handler table in front of the guard.
pub struct CapabilityRouter {
    guard: Arc<CapabilityGuard>,
    discovery: Arc<DiscoveryFilter>,
    handlers: HashMap<String, Arc<dyn CapabilityHandler>>,
}

impl CapabilityRouter {
    pub fn new(guard: Arc<CapabilityGuard>, discovery: Arc<DiscoveryFilter>) -> Self {
        Self {
            guard,
            discovery,
            handlers: HashMap::new(),
        }
    }

    /// Only catalogued names can be registered, each at most once.
    pub fn register(
        &mut self,
        name: &str,
        handler: Arc<dyn CapabilityHandler>,
    ) -> Result<(), RouterError> {
        if !self.guard.catalog().contains(name) {
            return Err(RouterError::UnknownCapability(name.to_string()));
        }
        if self.handlers.contains_key(name) {
            return Err(RouterError::AlreadyRegistered(name.to_string()));
        }
        self.handlers.insert(name.to_string(), handler);
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn guarded(&self, name: &str) -> Option<GuardedCapability> {
        self.handlers
            .get(name)
            .map(|handler| GuardedCapability::new(name, self.guard.clone(), handler.clone()))
    }

    /// Capability names the caller may invoke, in catalog order.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<String>, AccessError> {
        self.discovery.filter_names(ctx, self.guard.catalog()).await
    }

    pub async fn invoke(
        &self,
        ctx: &RequestContext,
        name: &str,
        args: Value,
    ) -> Result<Value, AccessError> {
        // Authorize before looking at the table so that denials never depend
        // on what happens to be registered.
        let call = self.guard.authorize(ctx, name).await?;
        let Some(handler) = self.handlers.get(name) else {
            return Err(AccessError::Handler(format!(
                "no handler registered for '{}'",
                name
            )));
        };
        execute(call, handler.as_ref(), args).await
    }
}
