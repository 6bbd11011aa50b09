// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Why a forwarded call failed, in the shape exposed to the browser
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// There is no access token to call the backend with
    #[error("no access token available")]
    Unauthorized,

    /// The backend rejected the access token
    #[error("the backend rejected the access token")]
    Unauthenticated,

    #[error("access to the resource was denied by the backend")]
    Forbidden,

    #[error("the resource was not found on the backend")]
    NotFound,

    /// The backend could not be reached after all attempts
    #[error("the backend could not be reached")]
    NetworkError,

    /// Any other error returned by the backend
    #[error("the backend answered with status {status}")]
    ApiError {
        status: StatusCode,

        /// The message from the backend. Only set outside of production.
        detail: Option<String>,
    },
}

impl GatewayError {
    /// The status code this error is exposed with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NetworkError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ApiError { status, .. } => *status,
        }
    }

    /// The stable, user-facing message of this error
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::Unauthenticated => "Niet ingelogd",
            Self::Forbidden => "Geen toegang",
            Self::NotFound => "Niet gevonden",
            Self::NetworkError => "Netwerkfout",
            Self::ApiError { .. } => "API error",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse<'a> {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dev_error: Option<&'a str>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let dev_error = match &self {
            Self::ApiError { detail, .. } => detail.as_deref(),
            _ => None,
        };

        let body = Json(ErrorResponse {
            error: self.message(),
            dev_error,
        });

        (self.status(), body).into_response()
    }
}
