// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Routes passing requests through to the backend API on behalf of the
//! signed-in user

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use cadok_axum_utils::{CookieJar, SessionCookieExt};
use cadok_gateway::{ForwardOptions, ForwardPolicy, Gateway, GatewayError};
use cadok_session::TokenLifecycle;
use http::Method;

use crate::SiteConfig;

/// What the passthrough routes need from the state
#[derive(Clone)]
pub(crate) struct Passthrough {
    site: Arc<SiteConfig>,
    lifecycle: TokenLifecycle,
    gateway: Gateway,
    policy: ForwardPolicy,
}

impl axum::extract::FromRef<crate::AppState> for Passthrough {
    fn from_ref(state: &crate::AppState) -> Self {
        Self {
            site: state.site.clone(),
            lifecycle: state.lifecycle.clone(),
            gateway: state.gateway.clone(),
            policy: state.policy,
        }
    }
}

impl Passthrough {
    /// Refresh the session if its access token expired, then forward the
    /// request with it. The refreshed session is written back to the cookie.
    ///
    /// A session whose refresh failed is rejected without calling the
    /// backend.
    async fn forward(
        &self,
        cookie_jar: CookieJar,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Response {
        let mut cookie_jar = cookie_jar;
        let mut access_token = None;

        if let Some(session) = cookie_jar.load_session(&self.site.session_cookie) {
            match self.lifecycle.ensure_fresh(session, false).await {
                Ok(session) => {
                    cookie_jar = cookie_jar.store_session(&self.site.session_cookie, &session);

                    // Its access token is stale, and only a new sign-in can help
                    if session.tokens.is_failed() {
                        return (cookie_jar, GatewayError::Unauthenticated).into_response();
                    }

                    access_token = Some(session.tokens.access_token.clone());
                }
                Err(err) => {
                    tracing::error!(
                        error = &err as &dyn std::error::Error,
                        "Dropping session after a failed refresh"
                    );
                    cookie_jar = cookie_jar.clear_session(&self.site.session_cookie);
                }
            }
        }

        let mut options = ForwardOptions::new();
        if let Some(body) = body.filter(|body| !body.is_empty()) {
            options = options.with_json_body(body);
        }

        let result = self
            .gateway
            .forward(access_token.as_deref(), path, method, options, &self.policy)
            .await;

        (cookie_jar, result).into_response()
    }
}

/// Backend identifiers are opaque, but must stay a single path segment
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[tracing::instrument(name = "handlers.resources.list_projects", skip_all)]
pub(crate) async fn list_projects(
    State(passthrough): State<Passthrough>,
    cookie_jar: CookieJar,
) -> Response {
    passthrough
        .forward(cookie_jar, Method::GET, "v1/projects", None)
        .await
}

#[tracing::instrument(name = "handlers.resources.create_project", skip_all)]
pub(crate) async fn create_project(
    State(passthrough): State<Passthrough>,
    cookie_jar: CookieJar,
    body: Bytes,
) -> Response {
    passthrough
        .forward(cookie_jar, Method::POST, "admin/v1/projects", Some(body))
        .await
}

#[tracing::instrument(name = "handlers.resources.request_project", skip_all)]
pub(crate) async fn request_project(
    State(passthrough): State<Passthrough>,
    cookie_jar: CookieJar,
    body: Bytes,
) -> Response {
    passthrough
        .forward(cookie_jar, Method::POST, "v1/requests", Some(body))
        .await
}

#[tracing::instrument(
    name = "handlers.resources.update_request",
    fields(request.id = %id),
    skip_all,
)]
pub(crate) async fn update_request(
    State(passthrough): State<Passthrough>,
    cookie_jar: CookieJar,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    if !is_valid_id(&id) {
        return GatewayError::NotFound.into_response();
    }

    passthrough
        .forward(
            cookie_jar,
            Method::PUT,
            &format!("v1/requests/{id}"),
            Some(body),
        )
        .await
}

#[tracing::instrument(name = "handlers.resources.available_forms", skip_all)]
pub(crate) async fn available_forms(
    State(passthrough): State<Passthrough>,
    cookie_jar: CookieJar,
) -> Response {
    passthrough
        .forward(cookie_jar, Method::GET, "v1/forms/available", None)
        .await
}
