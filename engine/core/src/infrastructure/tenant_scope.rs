// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Tenant Scope Providers
//!
//! - [`PgTenantResourceProvider`]: checks a connection out of the pool and
//!   pins it to the tenant with `set_config('app.tenant_id', ..)` so that
//!   row-level security policies apply. Release resets the setting and
//!   returns the connection.
//! - [`InMemoryTenantResourceProvider`]: no real resource; counts
//!   outstanding scopes so callers can assert nothing leaked.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, Postgres};
use sqlx::PgConnection;

use crate::domain::caller::TenantId;
use crate::domain::repository::{RepositoryError, TenantResourceProvider, TenantScope};

pub struct PgTenantResourceProvider {
    pool: PgPool,
}

impl PgTenantResourceProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantResourceProvider for PgTenantResourceProvider {
    async fn acquire(&self, tenant_id: TenantId) -> Result<Box<dyn TenantScope>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query("SELECT set_config('app.tenant_id', $1, false)")
            .bind(tenant_id.to_string())
            .execute(&mut *conn)
            .await?;

        tracing::trace!(tenant_id = %tenant_id, "Tenant connection acquired");
        Ok(Box::new(PgTenantScope {
            tenant_id,
            conn: Some(conn),
        }))
    }
}

pub struct PgTenantScope {
    tenant_id: TenantId,
    conn: Option<PoolConnection<Postgres>>,
}

impl PgTenantScope {
    /// The pinned connection, until released.
    pub fn connection(&mut self) -> Option<&mut PgConnection> {
        self.conn.as_deref_mut()
    }
}

impl TenantScope for PgTenantScope {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    fn release(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = sqlx::query("RESET app.tenant_id")
                        .execute(&mut *conn)
                        .await
                    {
                        tracing::warn!(error = %e, "Failed to reset tenant setting; closing connection");
                        conn.close_on_drop();
                    }
                });
            }
            // No runtime to reset on: never hand a tenant-pinned connection back.
            Err(_) => conn.close_on_drop(),
        }
        tracing::trace!(tenant_id = %self.tenant_id, "Tenant connection released");
    }

    fn is_released(&self) -> bool {
        self.conn.is_none()
    }
}

#[derive(Clone, Default)]
pub struct InMemoryTenantResourceProvider {
    outstanding: Arc<AtomicUsize>,
    acquired: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl InMemoryTenantResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every `acquire` fails.
    pub fn failing() -> Self {
        let provider = Self::default();
        provider.set_failing(true);
        provider
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Scopes acquired and not yet released.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    pub fn acquired_total(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TenantResourceProvider for InMemoryTenantResourceProvider {
    async fn acquire(&self, tenant_id: TenantId) -> Result<Box<dyn TenantScope>, RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(format!(
                "no tenant resource available for {}",
                tenant_id
            )));
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryTenantScope {
            tenant_id,
            released: false,
            outstanding: self.outstanding.clone(),
        }))
    }
}

pub struct InMemoryTenantScope {
    tenant_id: TenantId,
    released: bool,
    outstanding: Arc<AtomicUsize>,
}

impl TenantScope for InMemoryTenantScope {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.outstanding.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_outstanding_scopes() {
        let provider = InMemoryTenantResourceProvider::new();
        let tenant = TenantId::new();

        let mut first = provider.acquire(tenant).await.unwrap();
        let mut second = provider.acquire(tenant).await.unwrap();
        assert_eq!(provider.outstanding(), 2);

        first.release();
        first.release();
        assert!(first.is_released());
        assert_eq!(provider.outstanding(), 1);

        second.release();
        assert_eq!(provider.outstanding(), 0);
        assert_eq!(provider.acquired_total(), 2);
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider = InMemoryTenantResourceProvider::failing();
        assert!(matches!(
            provider.acquire(TenantId::new()).await,
            Err(RepositoryError::Unavailable(_))
        ));
        assert_eq!(provider.outstanding(), 0);
    }
}
