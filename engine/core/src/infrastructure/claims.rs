// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Claims carried on the request context.
//!
//! The transport layer verifies identity and stores the resulting claims on
//! [`RequestContext`]; this source just reads them back.

use crate::domain::caller::{Claims, RequestContext};
use crate::domain::repository::ClaimsSource;

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestClaimsSource;

impl ClaimsSource for RequestClaimsSource {
    fn claims(&self, ctx: &RequestContext) -> Option<Claims> {
        ctx.claims.clone()
    }
}
