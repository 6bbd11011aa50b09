// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use reqwest::{
    StatusCode,
    header::{CONTENT_TYPE, HeaderValue},
};

/// The body of a successful backend response, decoded according to the
/// requested [`ResponseKind`](crate::ResponseKind)
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayBody {
    Json(serde_json::Value),
    Blob {
        content_type: Option<HeaderValue>,
        data: Bytes,
    },
    Plain(String),
    Empty,
}

/// A successful backend response
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub body: GatewayBody,
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        match self.body {
            GatewayBody::Json(value) => (self.status, Json(value)).into_response(),
            GatewayBody::Blob { content_type, data } => {
                let mut response = (self.status, data).into_response();
                if let Some(content_type) = content_type {
                    response.headers_mut().insert(CONTENT_TYPE, content_type);
                }
                response
            }
            GatewayBody::Plain(text) => (self.status, text).into_response(),
            GatewayBody::Empty => self.status.into_response(),
        }
    }
}
