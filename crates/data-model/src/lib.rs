// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

#![allow(clippy::module_name_repetitions)]

pub(crate) mod claims;
pub mod clock;
pub(crate) mod session;
pub(crate) mod tokens;

pub use self::{
    claims::{ClientAccess, IdentityClaims},
    clock::{Clock, MockClock, SystemClock},
    session::{
        PROJECT_GROUP_PREFIX, SessionUser, SessionView, StoredSession, derive_session_view,
        project_roles, should_force_reauth,
    },
    tokens::{DEFAULT_SAFETY_MARGIN, SessionError, TokenPair},
};
