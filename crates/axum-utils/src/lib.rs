// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

#![deny(clippy::future_not_send)]
#![allow(clippy::module_name_repetitions)]

pub mod cookies;
pub mod error_wrapper;
pub mod sentry;
pub mod session;

pub use axum;

pub use self::{
    cookies::{CookieDecodeError, CookieJar, CookieManager},
    error_wrapper::ErrorWrapper,
    session::SessionCookieExt,
};
