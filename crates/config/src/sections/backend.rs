// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use url::Url;

use crate::{
    ConfigurationSection,
    util::{ConfigError, invalid},
};

fn default_base_url() -> Url {
    Url::parse("http://localhost:8081/").unwrap()
}

fn default_accept_language() -> String {
    "nl".to_owned()
}

fn default_timeout() -> Duration {
    Duration::from_millis(5000)
}

fn default_retry_delay() -> Duration {
    Duration::from_millis(250)
}

/// Which kind of deployment this is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentEnvironment {
    /// Backend error details are passed on to the browser
    Development,

    /// Backend error details are only logged
    #[default]
    Production,
}

/// Configuration of the calls to the backend API
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BackendConfig {
    /// Base URL of the backend. Requests go to `{base_url}/api/{path}`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Value of the `Accept-Language` header sent on every request
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Bound on each attempt, in milliseconds
    #[serde(default = "default_timeout")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[schemars(with = "u64")]
    pub timeout: Duration,

    /// How many more attempts are made after a network failure
    #[serde(default)]
    pub retry_count: u32,

    /// Pause between two attempts, in milliseconds
    #[serde(default = "default_retry_delay")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[schemars(with = "u64")]
    pub retry_delay: Duration,

    /// Whether this is a development or a production deployment
    #[serde(default)]
    pub environment: DeploymentEnvironment,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            accept_language: default_accept_language(),
            timeout: default_timeout(),
            retry_count: 0,
            retry_delay: default_retry_delay(),
            environment: DeploymentEnvironment::default(),
        }
    }
}

impl ConfigurationSection for BackendConfig {
    const PATH: Option<&'static str> = Some("backend");

    fn validate(&self, _figment: &figment::Figment) -> Result<(), ConfigError> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(invalid(
                "backend",
                "base_url",
                "Backend URL must use http or https",
            ));
        }

        if self.accept_language.is_empty()
            || !self
                .accept_language
                .bytes()
                .all(|b| b.is_ascii_graphic() || b == b' ')
        {
            return Err(invalid(
                "backend",
                "accept_language",
                "Accept-Language must be a non-empty ASCII string",
            ));
        }

        if self.timeout.is_zero() {
            return Err(invalid("backend", "timeout", "Timeout can't be zero"));
        }

        Ok(())
    }
}
