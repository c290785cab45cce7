// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Access Checker
//!
//! The single allow/deny decision consulted by discovery and by every
//! invocation guard, so the two can never disagree.
//!
//! A capability is accessible iff one of its loadouts is in the resolved
//! [`GroupState`]. Unknown names are simply not accessible; the catalog is
//! closed, so this is never an error.
//!
//! For agent callers the check only counts `Default` and `AgentTools`, even if
//! a wider state was handed in. The resolver already guarantees this; the
//! checker enforces it independently.

use super::capability::CapabilityCatalog;
use super::loadout::GroupState;

pub fn is_accessible(
    catalog: &CapabilityCatalog,
    capability: &str,
    state: &GroupState,
    is_agent: bool,
) -> bool {
    let Some(spec) = catalog.get(capability) else {
        return false;
    };

    spec.loadouts
        .iter()
        .filter(|loadout| !is_agent || loadout.is_agent_reachable())
        .any(|loadout| state.contains(*loadout))
}
