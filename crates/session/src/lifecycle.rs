// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use cadok_data_model::{Clock, DEFAULT_SAFETY_MARGIN, SessionError, StoredSession};
use cadok_jose::MalformedTokenError;
use cadok_oidc_client::{
    requests::refresh_token::refresh_access_token,
    types::{TokenResponse, client_credentials::ClientCredentials},
};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use url::Url;

use crate::{RefreshLatch, issue::issue_session};

/// A refresh went through at the provider, but the new session could not be
/// built out of its response.
#[derive(Debug, Clone, Error)]
pub enum RefreshError {
    #[error("the provider issued a malformed access token")]
    MalformedToken(#[source] Arc<MalformedTokenError>),
}

impl From<MalformedTokenError> for RefreshError {
    fn from(err: MalformedTokenError) -> Self {
        Self::MalformedToken(Arc::new(err))
    }
}

/// Something able to keep a session fresh
pub trait Refresher: Send + Sync + 'static {
    /// The OAuth client ID, used to resolve the roles of the session
    fn client_id(&self) -> &str;

    /// The current time
    fn now(&self) -> DateTime<Utc>;

    /// Refresh the session if `trigger` is set or if its access token expired
    fn ensure_fresh(
        &self,
        session: StoredSession,
        trigger: bool,
    ) -> impl Future<Output = Result<StoredSession, RefreshError>> + Send;
}

/// Issues and refreshes the token pairs of user sessions.
#[derive(Clone)]
pub struct TokenLifecycle {
    http_client: reqwest::Client,
    credentials: ClientCredentials,
    token_endpoint: Url,
    clock: Arc<dyn Clock + Send>,
    safety_margin: Duration,
    latch: Arc<RefreshLatch<Result<StoredSession, RefreshError>>>,
}

impl TokenLifecycle {
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        credentials: ClientCredentials,
        token_endpoint: Url,
        clock: Arc<dyn Clock + Send>,
    ) -> Self {
        Self {
            http_client,
            credentials,
            token_endpoint,
            clock,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            latch: Arc::default(),
        }
    }

    /// Set how much earlier than announced tokens are considered expired
    #[must_use]
    pub fn with_safety_margin(mut self, safety_margin: Duration) -> Self {
        self.safety_margin = safety_margin;
        self
    }

    /// Set how long refresh results are shared with callers still holding the
    /// previous refresh token
    #[must_use]
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.latch = Arc::new(RefreshLatch::new(grace_period));
        self
    }

    #[must_use]
    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// Create a session from the response of the provider's token endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token in the response can't be decoded.
    pub fn issue_from_authorization_response(
        &self,
        response: &TokenResponse,
    ) -> Result<StoredSession, MalformedTokenError> {
        issue_session(response, self.clock.now(), self.safety_margin)
    }

    /// Redeem the refresh token of the session for a new token pair.
    ///
    /// If the provider rejects the refresh token, or can't be reached, the
    /// previous session is returned tagged with
    /// [`SessionError::RefreshAccessTokenError`]. This is terminal: the
    /// session has to be recreated through a new sign-in.
    ///
    /// Concurrent refreshes of the same session generation are coalesced. A
    /// session without a refresh token is never coalesced with another one.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider issued a token which can't be decoded.
    #[tracing::instrument(name = "session.refresh", skip_all)]
    pub async fn refresh(&self, session: &StoredSession) -> Result<StoredSession, RefreshError> {
        if session.tokens.refresh_token.is_empty() {
            return self.refresh_uncoordinated(session).await;
        }

        // The access token ties the entry to the session which holds the
        // refresh token
        let key = format!(
            "{}\0{}",
            session.tokens.refresh_token, session.tokens.access_token
        );

        self.latch
            .run(&key, self.clock.now(), || self.refresh_uncoordinated(session))
            .await
    }

    async fn refresh_uncoordinated(
        &self,
        session: &StoredSession,
    ) -> Result<StoredSession, RefreshError> {
        let result = refresh_access_token(
            &self.http_client,
            &self.credentials,
            &self.token_endpoint,
            session.tokens.refresh_token.clone(),
            None,
        )
        .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    error = &err as &dyn std::error::Error,
                    "Failed to refresh the access token"
                );

                return Ok(StoredSession {
                    tokens: session
                        .tokens
                        .clone()
                        .with_error(SessionError::RefreshAccessTokenError),
                    claims: session.claims.clone(),
                });
            }
        };

        let mut refreshed = issue_session(&response, self.clock.now(), self.safety_margin)
            .inspect_err(|err| {
                tracing::error!(
                    error = err as &dyn std::error::Error,
                    "Provider issued a malformed access token"
                );
            })?;

        // Keep the previous refresh token if the provider didn't rotate it
        if response.refresh_token.is_none() {
            refreshed
                .tokens
                .refresh_token
                .clone_from(&session.tokens.refresh_token);
        }

        tracing::info!(
            access_token_expires_at = %refreshed.tokens.access_token_expires_at,
            "Refreshed the access token"
        );

        Ok(refreshed)
    }

    /// Apply the refresh decision to a session.
    ///
    /// The session is refreshed if `trigger` is set, or if its access token
    /// expired. A session which already failed to refresh is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider issued a token which can't be decoded.
    pub async fn ensure_fresh(
        &self,
        session: StoredSession,
        trigger: bool,
    ) -> Result<StoredSession, RefreshError> {
        if session.tokens.is_failed() {
            return Ok(session);
        }

        if trigger || session.tokens.is_access_token_expired(self.clock.now()) {
            return self.refresh(&session).await;
        }

        Ok(session)
    }
}

impl Refresher for TokenLifecycle {
    fn client_id(&self) -> &str {
        self.credentials.client_id()
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    async fn ensure_fresh(
        &self,
        session: StoredSession,
        trigger: bool,
    ) -> Result<StoredSession, RefreshError> {
        TokenLifecycle::ensure_fresh(self, session, trigger).await
    }
}
