// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Methods to interact with the provider's endpoints.

pub mod authorization_code;
pub mod logout;
pub mod refresh_token;
pub mod token;
