// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Pure policy model: loadouts, the capability catalog, caller identity,
//! tenant policy toggles, the resolver, the access checker and the
//! write-arbitration rule. Nothing in this layer performs I/O.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Policy types, decisions and boundary traits

pub mod access;
pub mod caller;
pub mod capability;
pub mod engine_config;
pub mod error;
pub mod loadout;
pub mod metadata;
pub mod parameters;
pub mod repository;
pub mod resolver;
pub mod tenant_policy;
