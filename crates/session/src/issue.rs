// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use cadok_data_model::{StoredSession, TokenPair};
use cadok_jose::{MalformedTokenError, decode_identity_claims};
use cadok_oidc_client::types::TokenResponse;
use chrono::{DateTime, Duration, Utc};

fn after(now: DateTime<Utc>, seconds: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(seconds).and_then(|delta| now.checked_add_signed(delta))
}

/// Build a new session out of a successful token endpoint response.
///
/// The access token expires at `expires_at` if the provider sent it, else
/// `expires_in` seconds from `now`, else at the epoch. The refresh token
/// expires `refresh_expires_in` seconds from `now`. Both have the safety
/// margin subtracted.
///
/// # Errors
///
/// Returns an error if the claims can't be decoded out of the access token.
pub fn issue_session(
    response: &TokenResponse,
    now: DateTime<Utc>,
    safety_margin: Duration,
) -> Result<StoredSession, MalformedTokenError> {
    let claims = decode_identity_claims(&response.access_token)?;

    let access_token_expires_at = match (response.expires_at, response.expires_in) {
        (Some(expires_at), _) => DateTime::from_timestamp_millis(expires_at.saturating_mul(1000)),
        (None, Some(expires_in)) => after(now, expires_in),
        (None, None) => None,
    }
    .unwrap_or_default();

    let refresh_token_expires_at =
        after(now, response.refresh_expires_in.unwrap_or_default()).unwrap_or_default();

    let tokens = TokenPair {
        access_token: response.access_token.clone(),
        refresh_token: response.refresh_token.clone().unwrap_or_default(),
        access_token_expires_at: access_token_expires_at - safety_margin,
        refresh_token_expires_at: refresh_token_expires_at - safety_margin,
        error: None,
    };

    Ok(StoredSession { tokens, claims })
}
