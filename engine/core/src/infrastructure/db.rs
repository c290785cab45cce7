// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Connection Pool
//!
//! Wraps `sqlx::postgres::PgPool` in a thin `Database` newtype that is
//! injected into the PostgreSQL repositories and the tenant scope provider.
//! Only used when `spec.storage.backend` is `postgres`.

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Tables the engine owns. Idempotent.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS tenant_policies (
        tenant_id     UUID PRIMARY KEY,
        configuration JSONB NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS metadata_records (
        tenant_id   UUID NOT NULL,
        target_path TEXT NOT NULL,
        field       TEXT NOT NULL,
        target      JSONB NOT NULL,
        value       JSONB NOT NULL,
        origin      TEXT NOT NULL CHECK (origin IN ('manual', 'automated')),
        updated_at  TIMESTAMPTZ NOT NULL,
        PRIMARY KEY (tenant_id, target_path, field)
    )
    "#,
];

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await
            .context("Failed to connect to PostgreSQL")?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to apply schema")?;
        }
        tracing::info!("Database schema ready");
        Ok(())
    }
}
