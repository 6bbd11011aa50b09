// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use cadok_axum_utils::{CookieJar, SessionCookieExt};
use cadok_oidc_client::{error::LogoutError, requests::logout::logout, types::ProviderEndpoints};
use cadok_session::TokenLifecycle;
use http::StatusCode;
use serde_json::json;

use crate::SiteConfig;

/// End the session at the provider, then forget it.
///
/// Always answers with an empty JSON array: only the status tells the
/// outcome. When the provider refuses, its status is relayed and the session
/// is kept.
#[tracing::instrument(name = "handlers.auth.logout.get", skip_all)]
pub(crate) async fn get(
    State(site): State<Arc<SiteConfig>>,
    State(endpoints): State<Arc<ProviderEndpoints>>,
    State(lifecycle): State<TokenLifecycle>,
    State(http_client): State<reqwest::Client>,
    cookie_jar: CookieJar,
) -> Response {
    let empty = Json(json!([]));

    let Some(session) = cookie_jar.load_session(&site.session_cookie) else {
        return (StatusCode::UNAUTHORIZED, empty).into_response();
    };

    let result = logout(
        &http_client,
        lifecycle.credentials(),
        &endpoints.logout_endpoint,
        &session.tokens.access_token,
        &session.tokens.refresh_token,
    )
    .await;

    match result {
        Ok(()) => {
            tracing::info!(
                username = session.claims.username.as_deref(),
                "User signed out"
            );
            let cookie_jar = cookie_jar.clear_session(&site.session_cookie);
            (StatusCode::OK, cookie_jar, empty).into_response()
        }

        Err(LogoutError::Status { status }) => {
            tracing::warn!(status = status.as_u16(), "Provider refused the logout");
            (status, empty).into_response()
        }

        Err(err @ LogoutError::Http(_)) => {
            tracing::error!(
                error = &err as &dyn std::error::Error,
                "Could not reach the provider to log out"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, empty).into_response()
        }
    }
}
