// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Built-in capability handlers shipped with the engine.
//!
//! - `health`: engine status and version
//! - `echo`: returns its `message` argument (developer diagnostics)
//! - `update_table`, `update_column`, `update_relationship`: write one
//!   annotation field through [`MetadataWriter`]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::handler::{CapabilityHandler, CapabilityRouter, Invocation, RouterError};
use super::metadata_writer::MetadataWriter;
use crate::domain::capability::HEALTH_CAPABILITY;
use crate::domain::error::AccessError;
use crate::domain::metadata::{MetadataKey, MetadataTarget};
use crate::domain::parameters::CapabilityParams;
use crate::domain::repository::TenantScope;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Annotation field written when the caller does not name one.
pub const DEFAULT_ANNOTATION_FIELD: &str = "description";

pub struct HealthHandler;

#[async_trait]
impl CapabilityHandler for HealthHandler {
    async fn handle(
        &self,
        invocation: &Invocation,
        _scope: &mut dyn TenantScope,
    ) -> Result<Value, AccessError> {
        Ok(json!({
            "status": "ok",
            "version": ENGINE_VERSION,
            "tenantId": invocation.tenant_id,
        }))
    }
}

pub struct EchoHandler;

#[async_trait]
impl CapabilityHandler for EchoHandler {
    async fn handle(
        &self,
        invocation: &Invocation,
        _scope: &mut dyn TenantScope,
    ) -> Result<Value, AccessError> {
        let message = invocation.params.required_str("message")?;
        Ok(json!({ "message": message }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    Table,
    Column,
    Relationship,
}

impl AnnotationKind {
    pub fn capability(&self) -> &'static str {
        match self {
            Self::Table => "update_table",
            Self::Column => "update_column",
            Self::Relationship => "update_relationship",
        }
    }

    fn target(&self, params: &CapabilityParams) -> Result<MetadataTarget, AccessError> {
        Ok(match self {
            Self::Table => MetadataTarget::Table {
                table: params.required_str("table")?.to_string(),
            },
            Self::Column => MetadataTarget::Column {
                table: params.required_str("table")?.to_string(),
                column: params.required_str("column")?.to_string(),
            },
            Self::Relationship => MetadataTarget::Relationship {
                from_table: params.required_str("from_table")?.to_string(),
                from_column: params.required_str("from_column")?.to_string(),
                to_table: params.required_str("to_table")?.to_string(),
                to_column: params.required_str("to_column")?.to_string(),
            },
        })
    }
}

/// Writes `value` into `field` (default `description`) of one schema object.
pub struct MetadataAnnotationHandler {
    kind: AnnotationKind,
    writer: MetadataWriter,
}

impl MetadataAnnotationHandler {
    pub fn new(kind: AnnotationKind, writer: MetadataWriter) -> Self {
        Self { kind, writer }
    }
}

#[async_trait]
impl CapabilityHandler for MetadataAnnotationHandler {
    async fn handle(
        &self,
        invocation: &Invocation,
        scope: &mut dyn TenantScope,
    ) -> Result<Value, AccessError> {
        let params = &invocation.params;
        let target = self.kind.target(params)?;
        let field = params
            .optional_str("field")?
            .unwrap_or(DEFAULT_ANNOTATION_FIELD);
        let value = params.required_value("value")?.clone();

        let key = MetadataKey::new(scope.tenant_id(), target, field);
        let record = self
            .writer
            .write(&key, value, invocation.actor_origin())
            .await?;

        Ok(json!({
            "key": key.to_string(),
            "origin": record.origin,
            "updatedAt": record.updated_at,
        }))
    }
}

/// Register every built-in handler on `router`.
pub fn register_builtins(
    router: &mut CapabilityRouter,
    writer: MetadataWriter,
) -> Result<(), RouterError> {
    router.register(HEALTH_CAPABILITY, Arc::new(HealthHandler))?;
    router.register("echo", Arc::new(EchoHandler))?;
    for kind in [
        AnnotationKind::Table,
        AnnotationKind::Column,
        AnnotationKind::Relationship,
    ] {
        router.register(
            kind.capability(),
            Arc::new(MetadataAnnotationHandler::new(kind, writer.clone())),
        )?;
    }
    Ok(())
}
