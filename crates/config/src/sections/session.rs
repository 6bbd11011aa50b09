// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::time::Duration;

use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};

use crate::{
    ConfigurationSection,
    util::{ConfigError, invalid},
};

fn example_secret() -> &'static str {
    "0000111122223333444455556666777788889999aaaabbbbccccddddeeeeffff"
}

fn default_cookie_name() -> String {
    "cadok-session".to_owned()
}

fn default_safety_margin() -> Duration {
    Duration::from_secs(15)
}

fn default_keep_alive_interval() -> Duration {
    Duration::from_secs(50)
}

/// Configuration of the user sessions
#[serde_as]
#[derive(Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionConfig {
    /// Secret the session cookies are encrypted with
    #[schemars(
        with = "String",
        regex(pattern = r"[0-9a-fA-F]{64}"),
        example = "example_secret"
    )]
    #[serde_as(as = "serde_with::hex::Hex")]
    pub secret: [u8; 32],

    /// Name of the session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// How much earlier than announced by the provider tokens are considered
    /// expired, in seconds
    #[serde(default = "default_safety_margin")]
    #[serde_as(as = "DurationSeconds<u64>")]
    #[schemars(with = "u64")]
    pub safety_margin: Duration,

    /// How often an open browser session checks its tokens, in seconds
    #[serde(default = "default_keep_alive_interval")]
    #[serde_as(as = "DurationSeconds<u64>")]
    #[schemars(with = "u64")]
    pub keep_alive_interval: Duration,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("cookie_name", &self.cookie_name)
            .field("safety_margin", &self.safety_margin)
            .field("keep_alive_interval", &self.keep_alive_interval)
            .finish_non_exhaustive()
    }
}

impl ConfigurationSection for SessionConfig {
    const PATH: Option<&'static str> = Some("session");

    fn validate(&self, _figment: &figment::Figment) -> Result<(), ConfigError> {
        if self.cookie_name.is_empty() {
            return Err(invalid(
                "session",
                "cookie_name",
                "Cookie name can't be empty",
            ));
        }

        if self.keep_alive_interval.is_zero() {
            return Err(invalid(
                "session",
                "keep_alive_interval",
                "Keep-alive interval can't be zero",
            ));
        }

        Ok(())
    }
}

impl SessionConfig {
    pub(crate) fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            secret: rng.r#gen(),
            cookie_name: default_cookie_name(),
            safety_margin: default_safety_margin(),
            keep_alive_interval: default_keep_alive_interval(),
        }
    }

    pub(crate) fn test() -> Self {
        Self {
            secret: [0xEA; 32],
            cookie_name: default_cookie_name(),
            safety_margin: default_safety_margin(),
            keep_alive_interval: default_keep_alive_interval(),
        }
    }
}
