// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Metadata Repository
//!
//! `metadata_records` holds one row per (tenant, target path, field). The
//! target itself is kept as JSONB next to its textual path so rows can be
//! queried by table or column without parsing the path.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::metadata::{MetadataKey, MetadataOrigin, MetadataRecord};
use crate::domain::repository::{MetadataRepository, RepositoryError};

pub struct PostgresMetadataRepository {
    pool: PgPool,
}

impl PostgresMetadataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataRepository for PostgresMetadataRepository {
    async fn get_existing(&self, key: &MetadataKey) -> Result<Option<MetadataRecord>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT value, origin, updated_at
            FROM metadata_records
            WHERE tenant_id = $1 AND target_path = $2 AND field = $3
            "#,
        )
        .bind(key.tenant_id.0)
        .bind(key.target.path())
        .bind(&key.field)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let origin_str: String = row.try_get("origin")?;
        let origin: MetadataOrigin = origin_str
            .parse()
            .map_err(RepositoryError::Serialization)?;

        Ok(Some(MetadataRecord {
            value: row.try_get("value")?,
            origin,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    async fn put(&self, key: &MetadataKey, record: &MetadataRecord) -> Result<(), RepositoryError> {
        let target = serde_json::to_value(&key.target)?;

        sqlx::query(
            r#"
            INSERT INTO metadata_records (tenant_id, target_path, field, target, value, origin, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (tenant_id, target_path, field) DO UPDATE SET
                value = EXCLUDED.value,
                origin = EXCLUDED.origin,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(key.tenant_id.0)
        .bind(key.target.path())
        .bind(&key.field)
        .bind(target)
        .bind(&record.value)
        .bind(record.origin.as_str())
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to save metadata record: {}", e)))?;

        Ok(())
    }
}
