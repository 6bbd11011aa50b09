// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Roles granted to the user on a single OAuth client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAccess {
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

/// Identity attributes carried by an access token.
///
/// They are recomputed every time a new access token is issued, and never
/// edited on their own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub roles: BTreeSet<String>,

    /// Group paths, in the order the provider listed them
    #[serde(default)]
    pub groups: Vec<String>,

    /// Roles per OAuth client ID, as keyed by the provider
    #[serde(default)]
    pub resource_access: BTreeMap<String, ClientAccess>,
}

impl IdentityClaims {
    /// Look up the roles granted on the given client.
    ///
    /// The provider does not guarantee the casing of the client ID keys, so
    /// the lookup ignores ASCII case. Returns `None` if no key matches.
    #[must_use]
    pub fn client_access(&self, client_id: &str) -> Option<&ClientAccess> {
        self.resource_access
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(client_id))
            .map(|(_, access)| access)
    }
}
