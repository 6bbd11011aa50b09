// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use axum::extract::FromRef;
use cadok_axum_utils::CookieManager;
use cadok_config::{AppConfig, DeploymentEnvironment};
use cadok_data_model::Clock;
use cadok_gateway::{Environment, ForwardPolicy, Gateway};
use cadok_oidc_client::{
    error::EndpointsError,
    types::{ProviderEndpoints, client_credentials::ClientCredentials},
};
use cadok_session::TokenLifecycle;
use http::{HeaderValue, header::InvalidHeaderValue};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid provider issuer")]
    Endpoints(#[from] EndpointsError),

    #[error("invalid Accept-Language value")]
    AcceptLanguage(#[from] InvalidHeaderValue),
}

/// Settings of the portal the routes need
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub public_base: Url,
    pub callback_url: Url,
    pub client_id: String,
    pub scope: String,
    pub session_cookie: String,
}

/// State shared by all the routes
#[derive(Clone)]
pub struct AppState {
    pub(crate) site: Arc<SiteConfig>,
    pub(crate) cookie_manager: CookieManager,
    pub(crate) http_client: reqwest::Client,
    pub(crate) endpoints: Arc<ProviderEndpoints>,
    pub(crate) lifecycle: TokenLifecycle,
    pub(crate) gateway: Gateway,
    pub(crate) policy: ForwardPolicy,
    pub(crate) clock: Arc<dyn Clock + Send>,
}

impl AppState {
    /// Build the state out of the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the provider endpoints or the `Accept-Language`
    /// header can't be derived from the configuration.
    pub fn new(
        config: &AppConfig,
        http_client: reqwest::Client,
        clock: Arc<dyn Clock + Send>,
    ) -> Result<Self, StateError> {
        let endpoints = ProviderEndpoints::for_issuer(&config.provider.issuer)?;
        let credentials = ClientCredentials::ClientSecretPost {
            client_id: config.provider.client_id.clone(),
            client_secret: config.provider.client_secret.clone(),
        };

        let safety_margin = chrono::Duration::from_std(config.session.safety_margin)
            .unwrap_or(cadok_data_model::DEFAULT_SAFETY_MARGIN);
        let lifecycle = TokenLifecycle::new(
            http_client.clone(),
            credentials,
            endpoints.token_endpoint.clone(),
            clock.clone(),
        )
        .with_safety_margin(safety_margin);

        let environment = match config.backend.environment {
            DeploymentEnvironment::Development => Environment::Development,
            DeploymentEnvironment::Production => Environment::Production,
        };
        let gateway = Gateway::new(
            http_client.clone(),
            &config.backend.base_url,
            HeaderValue::try_from(config.backend.accept_language.as_str())?,
            environment,
        );
        let policy = ForwardPolicy::default()
            .with_timeout(config.backend.timeout)
            .with_retry_count(config.backend.retry_count)
            .with_retry_delay(config.backend.retry_delay);

        let cookie_manager =
            CookieManager::derive_from(&config.http.public_base, &config.session.secret);

        let site = SiteConfig {
            public_base: config.http.public_base.clone(),
            callback_url: config.http.callback_url(),
            client_id: config.provider.client_id.clone(),
            scope: config.provider.scope.clone(),
            session_cookie: config.session.cookie_name.clone(),
        };

        Ok(Self {
            site: Arc::new(site),
            cookie_manager,
            http_client,
            endpoints: Arc::new(endpoints),
            lifecycle,
            gateway,
            policy,
            clock,
        })
    }

    /// The token lifecycle, shared with the keep-alive scheduler
    #[must_use]
    pub fn lifecycle(&self) -> &TokenLifecycle {
        &self.lifecycle
    }
}

impl FromRef<AppState> for CookieManager {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_manager.clone()
    }
}

impl FromRef<AppState> for Arc<SiteConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.site.clone()
    }
}

impl FromRef<AppState> for reqwest::Client {
    fn from_ref(state: &AppState) -> Self {
        state.http_client.clone()
    }
}

impl FromRef<AppState> for Arc<ProviderEndpoints> {
    fn from_ref(state: &AppState) -> Self {
        state.endpoints.clone()
    }
}

impl FromRef<AppState> for TokenLifecycle {
    fn from_ref(state: &AppState) -> Self {
        state.lifecycle.clone()
    }
}

impl FromRef<AppState> for Gateway {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.clone()
    }
}

impl FromRef<AppState> for ForwardPolicy {
    fn from_ref(state: &AppState) -> Self {
        state.policy
    }
}

impl FromRef<AppState> for Arc<dyn Clock + Send> {
    fn from_ref(state: &AppState) -> Self {
        state.clock.clone()
    }
}
