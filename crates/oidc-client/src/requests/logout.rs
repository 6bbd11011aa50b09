// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Requests for ending a session at the provider.

use cadok_http::RequestBuilderExt;
use serde::Serialize;
use url::Url;

use crate::{error::LogoutError, types::client_credentials::ClientCredentials};

#[derive(Serialize)]
struct LogoutBody<'a> {
    refresh_token: &'a str,
}

/// End the provider session tied to the given refresh token.
///
/// # Arguments
///
/// * `http_client` - The reqwest client to use for making HTTP requests.
///
/// * `client_credentials` - The credentials obtained when registering the
///   client.
///
/// * `logout_endpoint` - The URL of the issuer's logout endpoint.
///
/// * `access_token` - The current access token, sent as a bearer token.
///
/// * `refresh_token` - The refresh token of the session to end.
///
/// # Errors
///
/// Returns an error if the request fails, or if the provider answers with an
/// error status. [`LogoutError::Status`] carries the status so that it can be
/// relayed as-is.
#[tracing::instrument(skip_all, fields(logout_endpoint = %logout_endpoint))]
pub async fn logout(
    http_client: &reqwest::Client,
    client_credentials: &ClientCredentials,
    logout_endpoint: &Url,
    access_token: &str,
    refresh_token: &str,
) -> Result<(), LogoutError> {
    tracing::debug!("Ending session at the provider...");

    let request = http_client
        .post(logout_endpoint.as_str())
        .bearer_auth(access_token);

    let response = client_credentials
        .authenticated_form(request, &LogoutBody { refresh_token })
        .send_traced()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(LogoutError::Status { status });
    }

    Ok(())
}
