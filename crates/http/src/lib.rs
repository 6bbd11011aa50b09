// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Utilities to do HTTP requests

#![deny(rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

mod reqwest;

pub use self::reqwest::{
    ClientBuildError, RequestBuilderExt, client as reqwest_client, install_crypto_provider,
};
