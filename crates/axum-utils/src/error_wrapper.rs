// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde_json::json;

use crate::sentry::SentryEventID;

/// A simple wrapper around an unexpected error that implements
/// [`IntoResponse`].
///
/// The error is logged, and the client only gets a generic message.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ErrorWrapper<T>(#[from] pub T);

impl<T> IntoResponse for ErrorWrapper<T>
where
    T: std::error::Error + 'static,
{
    fn into_response(self) -> Response {
        tracing::error!(
            error = &self.0 as &dyn std::error::Error,
            "Unexpected error"
        );
        let event_id = SentryEventID::for_last_event();

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            event_id,
            Json(json!({ "error": "Internal error" })),
        )
            .into_response()
    }
}
