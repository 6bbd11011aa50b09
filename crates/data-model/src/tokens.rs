// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How much earlier than announced by the provider tokens are considered
/// expired.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::seconds(15);

/// Error marker carried by a session whose tokens can no longer be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SessionError {
    /// Redeeming the refresh token failed. Only a new sign-in can recover.
    #[error("RefreshAccessTokenError")]
    RefreshAccessTokenError,
}

impl SessionError {
    /// The name of the error, as exposed to clients
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RefreshAccessTokenError => "RefreshAccessTokenError",
        }
    }
}

/// The access/refresh token pair of a user session.
///
/// Both expiry timestamps already have the safety margin subtracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub access_token_expires_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub refresh_token_expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SessionError>,
}

impl TokenPair {
    /// Whether the access token must not be used anymore
    ///
    /// # Parameters
    ///
    /// * `now` - The current time
    #[must_use]
    pub fn is_access_token_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.access_token_expires_at
    }

    /// Tag the pair with an error, keeping all the other fields
    #[must_use]
    pub fn with_error(mut self, error: SessionError) -> Self {
        self.error = Some(error);
        self
    }

    /// Whether the pair has been tagged with an error
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}
