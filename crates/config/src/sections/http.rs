// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::net::{Ipv4Addr, SocketAddr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ConfigurationSection, util::invalid};

fn default_listen() -> SocketAddr {
    (Ipv4Addr::UNSPECIFIED, 8080).into()
}

fn default_public_base() -> Url {
    Url::parse("http://localhost:8080/").unwrap()
}

/// Configuration of the HTTP server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HttpConfig {
    /// Address the server listens on
    #[serde(default = "default_listen")]
    #[schemars(with = "String", example = "default_listen")]
    pub listen: SocketAddr,

    /// Public URL of the portal, as seen by browsers. The provider redirects
    /// to `{public_base}api/auth/callback` after sign-in.
    #[serde(default = "default_public_base")]
    pub public_base: Url,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            public_base: default_public_base(),
        }
    }
}

impl HttpConfig {
    /// The redirect URI registered on the provider
    #[must_use]
    pub fn callback_url(&self) -> Url {
        let mut url = self.public_base.clone();
        let path = format!("{}/api/auth/callback", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url
    }
}

impl ConfigurationSection for HttpConfig {
    const PATH: Option<&'static str> = Some("http");

    fn validate(&self, _figment: &figment::Figment) -> Result<(), crate::util::ConfigError> {
        if !matches!(self.public_base.scheme(), "http" | "https") {
            return Err(invalid(
                "http",
                "public_base",
                "Public base URL must use http or https",
            ));
        }

        Ok(())
    }
}
