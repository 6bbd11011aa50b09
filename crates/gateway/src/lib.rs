// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Forwarding of browser requests to the backend API, on behalf of a signed-in
//! user.
//!
//! Every call carries the user's access token, is bounded by a timeout and
//! retried on network failures. Backend failures are normalized into a
//! [`GatewayError`], which never leaks the backend's error details in
//! production.

#![deny(rustdoc::broken_intra_doc_links)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod gateway;
mod policy;
mod response;

pub use self::{
    error::GatewayError,
    gateway::{Environment, Gateway},
    policy::{ForwardOptions, ForwardPolicy, RawKind, ResponseKind},
    response::{GatewayBody, GatewayResponse},
};
