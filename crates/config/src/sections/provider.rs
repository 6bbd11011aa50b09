// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    ConfigurationSection,
    util::{ConfigError, invalid},
};

fn default_scope() -> String {
    "openid cadok".to_owned()
}

fn issuer_example() -> &'static str {
    "https://sso.example.com/realms/cadok"
}

/// Configuration of the identity provider the portal signs users in with
#[derive(Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProviderConfig {
    /// Issuer URL of the realm. The OpenID Connect endpoints are under
    /// `{issuer}/protocol/openid-connect/`.
    #[schemars(example = "issuer_example")]
    pub issuer: Url,

    /// Client ID of the portal. Roles granted on this client are exposed in
    /// the session.
    pub client_id: String,

    /// Client secret, sent in the body of token and logout requests
    pub client_secret: String,

    /// Scope requested on sign-in
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("issuer", &self.issuer)
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl ConfigurationSection for ProviderConfig {
    const PATH: Option<&'static str> = Some("provider");

    fn validate(&self, _figment: &figment::Figment) -> Result<(), ConfigError> {
        if !matches!(self.issuer.scheme(), "http" | "https") {
            return Err(invalid("provider", "issuer", "Issuer must use http or https"));
        }

        if self.client_id.is_empty() {
            return Err(invalid("provider", "client_id", "Client ID can't be empty"));
        }

        if self.client_secret.is_empty() {
            return Err(invalid(
                "provider",
                "client_secret",
                "Client secret can't be empty",
            ));
        }

        Ok(())
    }
}

impl ProviderConfig {
    pub(crate) fn example() -> Self {
        Self {
            issuer: Url::parse(issuer_example()).unwrap(),
            client_id: "cadok-portal".to_owned(),
            client_secret: "change-me".to_owned(),
            scope: default_scope(),
        }
    }
}
