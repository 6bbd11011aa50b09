// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use cadok_axum_utils::{CookieJar, ErrorWrapper};
use cadok_oidc_client::{
    error::AuthorizationError,
    requests::authorization_code::{AuthorizationRequestData, build_authorization_url},
    types::ProviderEndpoints,
};

use super::AUTH_STATE_COOKIE;
use crate::SiteConfig;

#[tracing::instrument(name = "handlers.auth.signin.get", skip_all)]
pub(crate) async fn get(
    State(site): State<Arc<SiteConfig>>,
    State(endpoints): State<Arc<ProviderEndpoints>>,
    cookie_jar: CookieJar,
) -> Result<impl IntoResponse, ErrorWrapper<AuthorizationError>> {
    let data = AuthorizationRequestData::new(
        site.client_id.clone(),
        site.scope.clone(),
        site.callback_url.clone(),
    );

    let (url, validation_data) = build_authorization_url(
        endpoints.authorization_endpoint.clone(),
        data,
        &mut rand::thread_rng(),
    )?;

    let cookie_jar = cookie_jar.save(AUTH_STATE_COOKIE, &validation_data);

    Ok((cookie_jar, Redirect::to(url.as_str())))
}
