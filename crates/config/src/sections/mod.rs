// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod backend;
mod http;
mod provider;
mod session;
mod telemetry;

pub use self::{
    backend::{BackendConfig, DeploymentEnvironment},
    http::HttpConfig,
    provider::ProviderConfig,
    session::SessionConfig,
    telemetry::{SentryConfig, TelemetryConfig},
};
use crate::util::{ConfigError, ConfigurationSection};

/// Application configuration root
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RootConfig {
    /// Configuration of the HTTP server
    #[serde(default)]
    pub http: HttpConfig,

    /// Identity provider the users sign in with
    pub provider: ProviderConfig,

    /// Backend API the requests are forwarded to
    #[serde(default)]
    pub backend: BackendConfig,

    /// User sessions
    pub session: SessionConfig,

    /// Configuration related to sending monitoring data
    #[serde(default, skip_serializing_if = "TelemetryConfig::is_default")]
    pub telemetry: TelemetryConfig,
}

impl ConfigurationSection for RootConfig {
    fn validate(&self, figment: &figment::Figment) -> Result<(), ConfigError> {
        self.http.validate(figment)?;
        self.provider.validate(figment)?;
        self.backend.validate(figment)?;
        self.session.validate(figment)?;
        self.telemetry.validate(figment)?;

        Ok(())
    }
}

impl RootConfig {
    /// Generate a sample configuration with a random session secret
    #[must_use]
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            http: HttpConfig::default(),
            provider: ProviderConfig::example(),
            backend: BackendConfig::default(),
            session: SessionConfig::generate(rng),
            telemetry: TelemetryConfig::default(),
        }
    }

    /// Configuration used in tests
    #[must_use]
    pub fn test() -> Self {
        Self {
            http: HttpConfig::default(),
            provider: ProviderConfig::example(),
            backend: BackendConfig::default(),
            session: SessionConfig::test(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Partial configuration actually used by the server
#[allow(missing_docs)]
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,

    pub provider: ProviderConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    pub session: SessionConfig,
}

impl ConfigurationSection for AppConfig {
    fn validate(&self, figment: &figment::Figment) -> Result<(), ConfigError> {
        self.http.validate(figment)?;
        self.provider.validate(figment)?;
        self.backend.validate(figment)?;
        self.session.validate(figment)?;

        Ok(())
    }
}

impl From<RootConfig> for AppConfig {
    fn from(config: RootConfig) -> Self {
        Self {
            http: config.http,
            provider: config.provider,
            backend: config.backend,
            session: config.session,
        }
    }
}
