// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Static integration-presence oracle, seeded from `spec.tenants[].integrationInstalled`.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::caller::TenantId;
use crate::domain::repository::IntegrationOracle;

#[derive(Clone, Default)]
pub struct StaticIntegrationOracle {
    installed: Arc<RwLock<HashSet<TenantId>>>,
}

impl StaticIntegrationOracle {
    pub fn new(installed: impl IntoIterator<Item = TenantId>) -> Self {
        Self {
            installed: Arc::new(RwLock::new(installed.into_iter().collect())),
        }
    }

    pub fn set_installed(&self, tenant_id: TenantId, installed: bool) {
        let mut set = self.installed.write();
        if installed {
            set.insert(tenant_id);
        } else {
            set.remove(&tenant_id);
        }
    }
}

#[async_trait]
impl IntegrationOracle for StaticIntegrationOracle {
    async fn is_integration_installed(&self, tenant_id: TenantId) -> anyhow::Result<bool> {
        Ok(self.installed.read().contains(&tenant_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_and_uninstall() {
        let tenant = TenantId::new();
        let oracle = StaticIntegrationOracle::default();
        assert!(!oracle.is_integration_installed(tenant).await.unwrap());

        oracle.set_installed(tenant, true);
        assert!(oracle.is_integration_installed(tenant).await.unwrap());

        oracle.set_installed(tenant, false);
        assert!(!oracle.is_integration_installed(tenant).await.unwrap());
    }
}
