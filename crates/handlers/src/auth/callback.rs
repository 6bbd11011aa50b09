// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use cadok_axum_utils::{CookieJar, SessionCookieExt, sentry::SentryEventID};
use cadok_oidc_client::{
    error::{TokenAuthorizationCodeError, TokenRequestError},
    requests::authorization_code::{
        AuthorizationValidationData, access_token_with_authorization_code,
    },
    types::ProviderEndpoints,
};
use cadok_session::TokenLifecycle;
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use super::AUTH_STATE_COOKIE;
use crate::{SiteConfig, impl_from_error_for_route};

#[derive(Debug, Deserialize)]
pub(crate) struct Params {
    state: Option<String>,
    code: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Error)]
pub(crate) enum RouteError {
    #[error("Error from the provider: {0}")]
    Provider(String),

    #[error("Missing authorization state cookie")]
    MissingCookie,

    #[error("State parameter mismatch")]
    StateMismatch,

    #[error("Missing authorization code")]
    MissingCode,

    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl_from_error_for_route!(cadok_oidc_client::error::TokenRequestError);
impl_from_error_for_route!(cadok_jose::MalformedTokenError);

impl From<TokenAuthorizationCodeError> for RouteError {
    fn from(err: TokenAuthorizationCodeError) -> Self {
        let TokenAuthorizationCodeError::Token(err) = err;
        match err {
            TokenRequestError::Status {
                body: Some(body), ..
            } => Self::Provider(body.error),
            err => err.into(),
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let error = match &self {
            Self::Provider(code) => code.as_str(),
            Self::MissingCookie => "missing_state",
            Self::StateMismatch => "state_mismatch",
            Self::MissingCode => "missing_code",
            Self::Internal(_) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = &self as &dyn std::error::Error,
                    "Failed to complete the sign-in"
                );
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SentryEventID::from(event_id),
                    Json(json!({ "error": "Internal error" })),
                )
                    .into_response();
            }
        };

        tracing::warn!(error = &self as &dyn std::error::Error, "Sign-in failed");
        (StatusCode::BAD_REQUEST, Json(json!({ "error": error }))).into_response()
    }
}

#[tracing::instrument(name = "handlers.auth.callback.get", skip_all)]
pub(crate) async fn get(
    State(site): State<Arc<SiteConfig>>,
    State(endpoints): State<Arc<ProviderEndpoints>>,
    State(lifecycle): State<TokenLifecycle>,
    State(http_client): State<reqwest::Client>,
    cookie_jar: CookieJar,
    Query(params): Query<Params>,
) -> Result<impl IntoResponse, RouteError> {
    if let Some(error) = params.error {
        return Err(RouteError::Provider(error));
    }

    let validation_data: AuthorizationValidationData = cookie_jar
        .load(AUTH_STATE_COOKIE)
        .ok()
        .flatten()
        .ok_or(RouteError::MissingCookie)?;

    if params.state.as_deref() != Some(validation_data.state.as_str()) {
        return Err(RouteError::StateMismatch);
    }

    let code = params.code.ok_or(RouteError::MissingCode)?;

    let response = access_token_with_authorization_code(
        &http_client,
        lifecycle.credentials(),
        &endpoints.token_endpoint,
        code,
        validation_data,
    )
    .await?;

    let session = lifecycle.issue_from_authorization_response(&response)?;
    tracing::info!(username = session.claims.username.as_deref(), "User signed in");

    let cookie_jar = cookie_jar
        .remove(AUTH_STATE_COOKIE)
        .store_session(&site.session_cookie, &session);

    Ok((cookie_jar, Redirect::to(site.public_base.path())))
}
