// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure
//!
//! Adapters for the boundary contracts in `crate::domain::repository`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Stores, tenant scopes, integration lookup, claims

pub mod claims;
pub mod db;
pub mod integrations;
pub mod repositories;
pub mod tenant_scope;
