// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Lib
//!
//! Capability-access policy engine.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Decides which capabilities a caller may discover and invoke
//!   for a tenant, and arbitrates writes to shared metadata

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
