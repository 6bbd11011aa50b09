// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Decoding of the identity claims carried by a provider access token.

use std::collections::{BTreeMap, BTreeSet};

use base64ct::{Base64Unpadded, Base64UrlUnpadded, Encoding};
use cadok_data_model::{ClientAccess, IdentityClaims};
use serde::Deserialize;
use thiserror::Error;

use crate::jwt::{JwtShapeError, RawJwt};

/// The access token could not be turned into [`IdentityClaims`]
#[derive(Debug, Error)]
pub enum MalformedTokenError {
    #[error("access token is not a compact JWT")]
    Shape(#[from] JwtShapeError),

    #[error("access token payload is not valid base64")]
    Base64(#[from] base64ct::Error),

    #[error("access token payload is not a JSON object")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
struct AccessTokenClaims {
    #[serde(default)]
    username: Option<String>,

    #[serde(default)]
    first_name: Option<String>,

    #[serde(default)]
    last_name: Option<String>,

    #[serde(default)]
    roles: BTreeSet<String>,

    #[serde(default)]
    groups: Vec<String>,

    #[serde(default)]
    resource_access: BTreeMap<String, ClientAccess>,
}

impl From<AccessTokenClaims> for IdentityClaims {
    fn from(claims: AccessTokenClaims) -> Self {
        let display_name = [claims.first_name, claims.last_name]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>();

        let display_name = if display_name.is_empty() {
            None
        } else {
            Some(display_name.join(" "))
        };

        Self {
            username: claims.username,
            display_name,
            roles: claims.roles,
            groups: claims.groups,
            resource_access: claims.resource_access,
        }
    }
}

/// Decode a base64url payload segment.
///
/// Trailing padding is tolerated, and the standard alphabet is accepted as a
/// fallback.
fn decode_segment(segment: &str) -> Result<Vec<u8>, base64ct::Error> {
    let segment = segment.trim_end_matches('=');
    Base64UrlUnpadded::decode_vec(segment).or_else(|_| Base64Unpadded::decode_vec(segment))
}

/// Decode the identity claims out of an access token, without verifying its
/// signature.
///
/// # Errors
///
/// Returns an error if the token doesn't have three segments, if the payload
/// isn't valid base64, or if it doesn't decode to a JSON object.
pub fn decode_identity_claims(access_token: &str) -> Result<IdentityClaims, MalformedTokenError> {
    let jwt = RawJwt::try_from(access_token)?;
    let payload = decode_segment(jwt.payload())?;
    let claims: AccessTokenClaims = serde_json::from_slice(&payload)?;
    Ok(claims.into())
}
