// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Requests for the [Authorization Code flow].
//!
//! [Authorization Code flow]: https://openid.net/specs/openid-connect-core-1_0.html#CodeFlowAuth

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{
    Rng,
    distributions::{Alphanumeric, DistString},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::{
    error::{AuthorizationError, TokenAuthorizationCodeError},
    requests::token::{AccessTokenRequest, AuthorizationCodeGrant, request_access_token},
    types::{TokenResponse, client_credentials::ClientCredentials},
};

/// The data necessary to build an authorization request.
#[derive(Debug, Clone)]
pub struct AuthorizationRequestData {
    /// The ID obtained when registering the client.
    pub client_id: String,

    /// The space-separated scope to authorize.
    pub scope: String,

    /// The URI to redirect the end-user to after the authorization.
    ///
    /// It must be one of the redirect URIs allowed for the client.
    pub redirect_uri: Url,
}

impl AuthorizationRequestData {
    /// Constructs a new `AuthorizationRequestData` with all the required
    /// fields.
    #[must_use]
    pub fn new(client_id: String, scope: String, redirect_uri: Url) -> Self {
        Self {
            client_id,
            scope,
            redirect_uri,
        }
    }
}

/// The data necessary to validate a response from the Authorization endpoint
/// and to redeem the code it returns.
///
/// It has to be kept by the client between the redirect to the provider and
/// the callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationValidationData {
    /// A unique identifier for the request.
    pub state: String,

    /// The URI where the end-user will be redirected after authorization.
    pub redirect_uri: Url,

    /// A string to correlate the authorization request to the token request.
    pub code_challenge_verifier: String,
}

#[derive(Serialize)]
struct AuthorizationRequest<'a> {
    response_type: &'static str,
    client_id: &'a str,
    redirect_uri: &'a Url,
    scope: &'a str,
    state: &'a str,
    code_challenge: &'a str,
    code_challenge_method: &'static str,
}

/// Compute the `S256` PKCE challenge of the given verifier.
#[must_use]
pub fn compute_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    Base64UrlUnpadded::encode_string(&hash)
}

/// Build the URL for authenticating at the Authorization endpoint.
///
/// # Arguments
///
/// * `authorization_endpoint` - The URL of the issuer's authorization endpoint.
///
/// * `authorization_data` - The data necessary to build the authorization
///   request.
///
/// * `rng` - A random number generator.
///
/// # Returns
///
/// A URL to be opened in a web browser where the end-user will be able to
/// authorize the given scope, and the [`AuthorizationValidationData`] to
/// validate this request.
///
/// The redirect URI will receive parameters in its query:
///
/// * A successful response will receive a `code` and a `state`.
///
/// * If the authorization fails, it should receive an `error` parameter and
///   optionally an `error_description`.
///
/// # Errors
///
/// Returns an error if preparing the URL fails.
pub fn build_authorization_url(
    authorization_endpoint: Url,
    authorization_data: AuthorizationRequestData,
    rng: &mut impl Rng,
) -> Result<(Url, AuthorizationValidationData), AuthorizationError> {
    tracing::debug!(scope = %authorization_data.scope, "Authorizing...");

    let AuthorizationRequestData {
        client_id,
        scope,
        redirect_uri,
    } = authorization_data;

    // Generate a random CSRF "state" token
    let state = Alphanumeric.sample_string(rng, 16);

    let mut verifier = [0u8; 32];
    rng.fill(&mut verifier);
    let code_challenge_verifier = Base64UrlUnpadded::encode_string(&verifier);
    let code_challenge = compute_code_challenge(&code_challenge_verifier);

    let authorization_query = serde_urlencoded::to_string(AuthorizationRequest {
        response_type: "code",
        client_id: &client_id,
        redirect_uri: &redirect_uri,
        scope: &scope,
        state: &state,
        code_challenge: &code_challenge,
        code_challenge_method: "S256",
    })?;

    let mut authorization_url = authorization_endpoint;

    // Add our parameters to the query, because the URL might already have one.
    let mut full_query = authorization_url
        .query()
        .map(ToOwned::to_owned)
        .unwrap_or_default();
    if !full_query.is_empty() {
        full_query.push('&');
    }
    full_query.push_str(&authorization_query);

    authorization_url.set_query(Some(&full_query));

    let validation_data = AuthorizationValidationData {
        state,
        redirect_uri,
        code_challenge_verifier,
    };

    Ok((authorization_url, validation_data))
}

/// Exchange an authorization code for an access token.
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
/// * `code` - The authorization code returned at the Authorization endpoint.
///
/// * `validation_data` - The validation data that was returned when building
///   the Authorization URL, for the state returned at the Authorization
///   endpoint.
///
/// # Errors
///
/// Returns an error if the request fails or the response is invalid.
#[tracing::instrument(skip_all, fields(token_endpoint = %token_endpoint))]
pub async fn access_token_with_authorization_code(
    http_client: &reqwest::Client,
    client_credentials: &ClientCredentials,
    token_endpoint: &Url,
    code: String,
    validation_data: AuthorizationValidationData,
) -> Result<TokenResponse, TokenAuthorizationCodeError> {
    tracing::debug!("Exchanging authorization code for access token...");

    let token_response = request_access_token(
        http_client,
        client_credentials,
        token_endpoint,
        AccessTokenRequest::AuthorizationCode(AuthorizationCodeGrant {
            code,
            redirect_uri: validation_data.redirect_uri,
            code_verifier: Some(validation_data.code_challenge_verifier),
        }),
    )
    .await?;

    Ok(token_response)
}
