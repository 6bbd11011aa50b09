// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    ConfigurationSection,
    util::{ConfigError, invalid},
};

fn sample_rate_example() -> f64 {
    0.5
}

fn sentry_dsn_example() -> &'static str {
    "https://public@host:port/1"
}

fn sentry_environment_example() -> &'static str {
    "production"
}

/// Configuration related to the Sentry integration
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct SentryConfig {
    /// Sentry DSN. Nothing is reported when it is not set.
    #[schemars(url, example = "sentry_dsn_example")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dsn: Option<String>,

    /// Environment to use when sending events to Sentry
    ///
    /// Defaults to `production` if not set.
    #[schemars(example = "sentry_environment_example")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    /// Sample rate for event submissions
    ///
    /// Defaults to `1.0` if not set.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(example = "sample_rate_example", range(min = 0.0, max = 1.0))]
    pub sample_rate: Option<f32>,
}

impl SentryConfig {
    fn is_default(&self) -> bool {
        self.dsn.is_none() && self.environment.is_none() && self.sample_rate.is_none()
    }
}

/// Configuration related to sending monitoring data
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct TelemetryConfig {
    /// Configuration related to the Sentry integration
    #[serde(default, skip_serializing_if = "SentryConfig::is_default")]
    pub sentry: SentryConfig,
}

impl TelemetryConfig {
    /// Returns true if all fields are at their default values
    pub(crate) fn is_default(&self) -> bool {
        self.sentry.is_default()
    }
}

impl ConfigurationSection for TelemetryConfig {
    const PATH: Option<&'static str> = Some("telemetry");

    fn validate(&self, _figment: &figment::Figment) -> Result<(), ConfigError> {
        if let Some(sample_rate) = self.sentry.sample_rate
            && !(0.0..=1.0).contains(&sample_rate)
        {
            return Err(invalid(
                "telemetry",
                "sentry.sample_rate",
                "Sentry sample rate must be between 0.0 and 1.0",
            ));
        }

        Ok(())
    }
}
