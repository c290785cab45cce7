// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Tenant Policy Repository
//!
//! One JSONB document per tenant in `tenant_policies`. A missing row is the
//! "unconfigured" state; the document is deserialized with serde defaults so
//! rows written by older versions with fewer toggles stay readable.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::caller::TenantId;
use crate::domain::repository::{RepositoryError, TenantPolicyRepository};
use crate::domain::tenant_policy::TenantPolicyConfiguration;

pub struct PostgresTenantPolicyRepository {
    pool: PgPool,
}

impl PostgresTenantPolicyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantPolicyRepository for PostgresTenantPolicyRepository {
    async fn get_policy_configuration(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<TenantPolicyConfiguration>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT configuration
            FROM tenant_policies
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let value: serde_json::Value = row.try_get("configuration")?;
                let config = TenantPolicyConfiguration::from_json(value).map_err(|e| {
                    RepositoryError::Serialization(format!(
                        "Failed to deserialize policy for tenant {}: {}",
                        tenant_id, e
                    ))
                })?;
                Ok(Some(config))
            }
            None => Ok(None),
        }
    }

    async fn save_policy_configuration(
        &self,
        tenant_id: TenantId,
        config: &TenantPolicyConfiguration,
    ) -> Result<(), RepositoryError> {
        let document = serde_json::to_value(config)?;

        sqlx::query(
            r#"
            INSERT INTO tenant_policies (tenant_id, configuration, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            ON CONFLICT (tenant_id) DO UPDATE SET
                configuration = EXCLUDED.configuration,
                updated_at = NOW()
            "#,
        )
        .bind(tenant_id.0)
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to save tenant policy: {}", e)))?;

        Ok(())
    }

    async fn delete_policy_configuration(&self, tenant_id: TenantId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM tenant_policies WHERE tenant_id = $1")
            .bind(tenant_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
