// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Lifecycle of the access/refresh token pair of a user session: issuance
//! from a provider response, refresh decisions, serialization of concurrent
//! refreshes and a background keep-alive scheduler.

#![deny(rustdoc::broken_intra_doc_links)]
#![allow(clippy::module_name_repetitions)]

mod issue;
mod latch;
mod lifecycle;
mod scheduler;

pub use self::{
    issue::issue_session,
    latch::{DEFAULT_GRACE_PERIOD, RefreshLatch},
    lifecycle::{RefreshError, Refresher, TokenLifecycle},
    scheduler::{DEFAULT_KEEP_ALIVE_INTERVAL, RefreshScheduler, SessionUpdate},
};
