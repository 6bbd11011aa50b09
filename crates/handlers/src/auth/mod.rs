// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

pub(crate) mod callback;
pub(crate) mod logout;
pub(crate) mod session;
pub(crate) mod signin;

/// Cookie holding the state and PKCE verifier between the redirect to the
/// provider and the callback
const AUTH_STATE_COOKIE: &str = "cadok-auth-state";
