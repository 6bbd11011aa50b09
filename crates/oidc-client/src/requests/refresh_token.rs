// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Requests for using [Refresh Tokens].
//!
//! [Refresh Tokens]: https://openid.net/specs/openid-connect-core-1_0.html#RefreshTokens

use url::Url;

use crate::{
    error::TokenRefreshError,
    requests::token::{AccessTokenRequest, RefreshTokenGrant, request_access_token},
    types::{TokenResponse, client_credentials::ClientCredentials},
};

/// Redeem a refresh token for a new access token.
///
/// # Arguments
///
/// * `http_client` - The reqwest client to use for making HTTP requests.
///
/// * `client_credentials` - The credentials obtained when registering the
///   client.
///
/// * `token_endpoint` - The URL of the issuer's Token endpoint.
///
/// * `refresh_token` - The token used to refresh the access token returned at
///   the Token endpoint. An empty token is sent as-is, and left to the provider
///   to reject.
///
/// * `scope` - The scope of the access token. If omitted, it is treated as
///   equal to the scope originally granted by the issuer.
///
/// # Errors
///
/// Returns an error if the request fails, or if the provider rejects the
/// refresh token.
#[tracing::instrument(skip_all, fields(token_endpoint = %token_endpoint))]
pub async fn refresh_access_token(
    http_client: &reqwest::Client,
    client_credentials: &ClientCredentials,
    token_endpoint: &Url,
    refresh_token: String,
    scope: Option<String>,
) -> Result<TokenResponse, TokenRefreshError> {
    tracing::debug!("Refreshing access token...");

    let token_response = request_access_token(
        http_client,
        client_credentials,
        token_endpoint,
        AccessTokenRequest::RefreshToken(RefreshTokenGrant {
            refresh_token,
            scope,
        }),
    )
    .await?;

    Ok(token_response)
}
