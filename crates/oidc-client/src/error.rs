// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! The error types used in this crate.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// The error body returned by the provider, as defined in [RFC 6749 section
/// 5.2].
///
/// [RFC 6749 section 5.2]: https://www.rfc-editor.org/rfc/rfc6749#section-5.2
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    /// The error code.
    pub error: String,

    /// A human-readable description of the error.
    #[serde(default)]
    pub error_description: Option<String>,
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{}: {description}", self.error),
            None => f.write_str(&self.error),
        }
    }
}

/// All possible errors when building the provider endpoints.
#[derive(Debug, Error)]
#[error("invalid issuer URL")]
pub struct EndpointsError(#[from] pub url::ParseError);

/// All possible errors when building the authorization URL.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// An error occurred serializing the request.
    #[error(transparent)]
    UrlEncoded(#[from] serde_urlencoded::ser::Error),
}

/// All possible errors when requesting an access token.
#[derive(Debug, Error)]
pub enum TokenRequestError {
    /// The HTTP client returned an error.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The provider answered with an error status code.
    #[error("token endpoint returned status {status}")]
    Status {
        /// The status code returned by the provider.
        status: StatusCode,

        /// The error body, if it could be parsed.
        body: Option<ErrorBody>,
    },
}

impl TokenRequestError {
    /// The status code returned by the provider, if it answered.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http(err) => err.status(),
            Self::Status { status, .. } => Some(*status),
        }
    }
}

/// All possible errors when exchanging a code for an access token.
#[derive(Debug, Error)]
pub enum TokenAuthorizationCodeError {
    /// An error occurred requesting the access token.
    #[error(transparent)]
    Token(#[from] TokenRequestError),
}

/// All possible errors when refreshing an access token.
#[derive(Debug, Error)]
pub enum TokenRefreshError {
    /// An error occurred requesting the access token.
    #[error(transparent)]
    Token(#[from] TokenRequestError),
}

/// All possible errors when ending a session at the provider.
#[derive(Debug, Error)]
pub enum LogoutError {
    /// The HTTP client returned an error.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The provider answered with an error status code.
    #[error("logout endpoint returned status {status}")]
    Status {
        /// The status code returned by the provider.
        status: StatusCode,
    },
}
