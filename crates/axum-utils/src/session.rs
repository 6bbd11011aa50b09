// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use cadok_data_model::{StoredSession, TokenPair};
use cadok_jose::decode_identity_claims;

use crate::cookies::CookieJar;

/// Storage of the user session in a private cookie.
///
/// Only the token pair is stored: the claims are decoded again from the access
/// token when loading.
pub trait SessionCookieExt: Sized {
    /// Load the session stored under the given cookie name.
    ///
    /// A cookie which can't be decrypted or decoded is treated as no session.
    fn load_session(&self, name: &str) -> Option<StoredSession>;

    #[must_use]
    fn store_session(self, name: &str, session: &StoredSession) -> Self;

    #[must_use]
    fn clear_session(self, name: &str) -> Self;
}

impl SessionCookieExt for CookieJar {
    fn load_session(&self, name: &str) -> Option<StoredSession> {
        let tokens: TokenPair = match self.load(name) {
            Ok(tokens) => tokens?,
            Err(err) => {
                tracing::warn!(
                    error = &err as &dyn std::error::Error,
                    "Ignoring invalid session cookie"
                );
                return None;
            }
        };

        match decode_identity_claims(&tokens.access_token) {
            Ok(claims) => Some(StoredSession { tokens, claims }),
            Err(err) => {
                tracing::warn!(
                    error = &err as &dyn std::error::Error,
                    "Ignoring session with a malformed access token"
                );
                None
            }
        }
    }

    fn store_session(self, name: &str, session: &StoredSession) -> Self {
        self.save(name, &session.tokens)
    }

    fn clear_session(self, name: &str) -> Self {
        self.remove(name)
    }
}
