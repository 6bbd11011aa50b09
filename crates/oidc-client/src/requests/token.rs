// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Requests for the Token endpoint.

use cadok_http::RequestBuilderExt;
use reqwest::header::ACCEPT;
use serde::Serialize;
use url::Url;

use crate::{
    error::{ErrorBody, TokenRequestError},
    types::{TokenResponse, client_credentials::ClientCredentials},
};

/// The parameters of an `authorization_code` grant.
#[derive(Clone, Serialize)]
pub struct AuthorizationCodeGrant {
    /// The code returned at the Authorization endpoint.
    pub code: String,

    /// The redirect URI used in the authorization request.
    pub redirect_uri: Url,

    /// The PKCE code verifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
}

/// The parameters of a `refresh_token` grant.
#[derive(Clone, Serialize)]
pub struct RefreshTokenGrant {
    /// The refresh token to redeem. It is sent even if empty.
    pub refresh_token: String,

    /// The scope to request, if it should be narrowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// A request to the Token endpoint.
#[derive(Clone, Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
pub enum AccessTokenRequest {
    /// Exchange an authorization code.
    AuthorizationCode(AuthorizationCodeGrant),

    /// Redeem a refresh token.
    RefreshToken(RefreshTokenGrant),
}

impl AccessTokenRequest {
    /// The `grant_type` of this request.
    #[must_use]
    pub fn grant_type(&self) -> &'static str {
        match self {
            Self::AuthorizationCode(_) => "authorization_code",
            Self::RefreshToken(_) => "refresh_token",
        }
    }
}

/// Request an access token.
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
/// * `request` - The request to make at the Token endpoint.
///
/// # Errors
///
/// Returns an error if the request fails, if the provider answers with an
/// error status, or if the response is invalid.
#[tracing::instrument(
    skip_all,
    fields(
        token_endpoint = %token_endpoint,
        grant_type = request.grant_type(),
    ),
)]
pub async fn request_access_token(
    http_client: &reqwest::Client,
    client_credentials: &ClientCredentials,
    token_endpoint: &Url,
    request: AccessTokenRequest,
) -> Result<TokenResponse, TokenRequestError> {
    tracing::debug!("Requesting access token...");

    let token_request = http_client
        .post(token_endpoint.as_str())
        .header(ACCEPT, "application/json");

    let response = client_credentials
        .authenticated_form(token_request, &request)
        .send_traced()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.json::<ErrorBody>().await.ok();
        return Err(TokenRequestError::Status { status, body });
    }

    let token_response = response.json().await?;

    Ok(token_response)
}
