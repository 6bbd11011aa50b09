// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use cadok_axum_utils::{CookieJar, SessionCookieExt};
use cadok_data_model::{Clock, SessionView, should_force_reauth};
use cadok_session::TokenLifecycle;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::SiteConfig;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Params {
    trigger: Option<String>,
}

impl Params {
    /// Whether the client asked for a refresh, like when a browser tab becomes
    /// visible again
    fn is_triggered(&self) -> bool {
        self.trigger
            .as_deref()
            .is_some_and(|value| !matches!(value, "" | "0" | "false"))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    #[serde(flatten)]
    view: SessionView,
    force_reauth: bool,
}

fn no_session(cookie_jar: CookieJar) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        cookie_jar,
        Json(json!({ "forceReauth": true })),
    )
        .into_response()
}

#[tracing::instrument(name = "handlers.auth.session.get", skip_all)]
pub(crate) async fn get(
    State(site): State<Arc<SiteConfig>>,
    State(lifecycle): State<TokenLifecycle>,
    State(clock): State<Arc<dyn Clock + Send>>,
    cookie_jar: CookieJar,
    Query(params): Query<Params>,
) -> Response {
    let Some(session) = cookie_jar.load_session(&site.session_cookie) else {
        return no_session(cookie_jar);
    };

    let session = match lifecycle.ensure_fresh(session, params.is_triggered()).await {
        Ok(session) => session,
        Err(err) => {
            tracing::error!(
                error = &err as &dyn std::error::Error,
                "Dropping session after a failed refresh"
            );
            return no_session(cookie_jar.clear_session(&site.session_cookie));
        }
    };

    let view = session.view(&site.client_id);
    let force_reauth = should_force_reauth(Some(&view), clock.now());
    let cookie_jar = cookie_jar.store_session(&site.session_cookie, &session);

    (cookie_jar, Json(SessionResponse { view, force_reauth })).into_response()
}
