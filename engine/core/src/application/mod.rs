// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application
//!
//! Orchestrates the domain decisions around the boundary collaborators.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Guard, discovery, handler routing, metadata writes and
//!   policy administration

pub mod builtin;
pub mod discovery;
pub mod guard;
pub mod handler;
pub mod metadata_writer;
pub mod policy_admin;
pub mod policy_loader;
