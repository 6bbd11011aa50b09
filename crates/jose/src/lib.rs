// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

#![deny(rustdoc::broken_intra_doc_links)]
#![allow(clippy::module_name_repetitions)]

pub mod claims;
pub mod jwt;

pub use self::claims::{MalformedTokenError, decode_identity_claims};
