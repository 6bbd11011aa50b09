// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! OAuth 2.0 and OpenID Connect types.

pub mod client_credentials;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::EndpointsError;

/// The endpoints of the provider used by this crate.
///
/// They are derived from the issuer URL with the layout of a Keycloak realm,
/// instead of being discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    /// The URL of the Authorization endpoint.
    pub authorization_endpoint: Url,

    /// The URL of the Token endpoint.
    pub token_endpoint: Url,

    /// The URL of the back-channel logout endpoint.
    pub logout_endpoint: Url,
}

impl ProviderEndpoints {
    /// Derive the endpoints from the issuer URL, like
    /// `https://sso.example.com/realms/cadok`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting URLs are invalid.
    pub fn for_issuer(issuer: &Url) -> Result<Self, EndpointsError> {
        let base = issuer.as_str().trim_end_matches('/');
        let endpoint =
            |name: &str| Url::parse(&format!("{base}/protocol/openid-connect/{name}"));

        Ok(Self {
            authorization_endpoint: endpoint("auth")?,
            token_endpoint: endpoint("token")?,
            logout_endpoint: endpoint("logout")?,
        })
    }
}

/// A successful response from the Token endpoint.
///
/// On top of the standard fields, the provider includes the lifetime of the
/// refresh token in `refresh_expires_in`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token to use for requests to the backend.
    pub access_token: String,

    /// The token to use to get a new access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// The ID token, which is not verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// The type of the access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// The absolute expiry of the access token, in seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,

    /// The lifetime of the access token, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// The lifetime of the refresh token, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_expires_in: Option<i64>,

    /// The scope granted to the access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("expires_in", &self.expires_in)
            .field("refresh_expires_in", &self.refresh_expires_in)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
