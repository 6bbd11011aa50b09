// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! An [OpenID Connect] client for the identity provider of the CADOK portal.
//!
//! # Scope
//!
//! Only the parts of the protocol the portal relies on are supported, with
//! the endpoint layout of a Keycloak realm:
//!
//! - Grant Types:
//!   - [Authorization Code](https://openid.net/specs/openid-connect-core-1_0.html#CodeFlowAuth)
//!   - [Refresh Token](https://openid.net/specs/openid-connect-core-1_0.html#RefreshTokens)
//! - [PKCE](https://www.rfc-editor.org/rfc/rfc7636), always with `S256`
//! - Back-channel logout of the session tied to a refresh token
//!
//! ID tokens are not verified: the identity of the user is read from the
//! access token, which is received directly from the token endpoint.
//!
//! [OpenID Connect]: https://openid.net/connect/

#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod requests;
pub mod types;
