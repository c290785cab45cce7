// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Metadata Writer
//!
//! Read existing → arbitrate → put, for every mutating capability that
//! touches shared metadata. Capability access must already have been granted
//! by the guard; this only decides whether the overwrite is allowed.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::domain::error::AccessError;
use crate::domain::metadata::{check_overwrite, MetadataKey, MetadataOrigin, MetadataRecord};
use crate::domain::repository::MetadataRepository;

#[derive(Clone)]
pub struct MetadataWriter {
    store: Arc<dyn MetadataRepository>,
}

impl MetadataWriter {
    pub fn new(store: Arc<dyn MetadataRepository>) -> Self {
        Self { store }
    }

    pub async fn read(&self, key: &MetadataKey) -> Result<Option<MetadataRecord>, AccessError> {
        self.store
            .get_existing(key)
            .await
            .map_err(|e| AccessError::MetadataStoreUnavailable(e.to_string()))
    }

    /// Write `value` as `actor`, returning the committed record.
    pub async fn write(
        &self,
        key: &MetadataKey,
        value: Value,
        actor: MetadataOrigin,
    ) -> Result<MetadataRecord, AccessError> {
        let existing = self.read(key).await?;

        if let Err(e) = check_overwrite(existing.as_ref(), actor) {
            metrics::counter!("loadout_precedence_blocked_total").increment(1);
            warn!(key = %key, actor = %actor, "Metadata write blocked by precedence");
            return Err(e);
        }

        let record = MetadataRecord::new(value, actor);
        self.store
            .put(key, &record)
            .await
            .map_err(|e| AccessError::MetadataStoreUnavailable(e.to_string()))?;

        info!(
            key = %key,
            origin = %actor,
            replaced = existing.is_some(),
            "Metadata written"
        );
        Ok(record)
    }
}
