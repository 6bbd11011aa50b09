// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{IdentityClaims, SessionError, TokenPair};

/// Groups describing a role on a project start with this prefix, followed by
/// `{project_id}/{role}`.
pub const PROJECT_GROUP_PREFIX: &str = "/CADOK/";

/// The authoritative state of a user session: the token pair and the claims
/// decoded from the access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub tokens: TokenPair,
    pub claims: IdentityClaims,
}

impl StoredSession {
    /// Derive the [`SessionView`] exposed to the rest of the application
    #[must_use]
    pub fn view(&self, client_id: &str) -> SessionView {
        derive_session_view(&self.tokens, &self.claims, client_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub username: Option<String>,
    pub display_name: Option<String>,
}

/// What the rest of the application sees of a session.
///
/// It is never stored, and is recomputed from a [`StoredSession`] on every
/// read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user: SessionUser,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub access_token_expires_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub refresh_token_expires_at: DateTime<Utc>,
    pub roles: BTreeSet<String>,
    pub projects: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SessionError>,
}

/// Derive a [`SessionView`] from a token pair and its claims.
///
/// Roles are the ones granted on `client_id`, looked up ignoring case. Projects
/// are read from the groups under [`PROJECT_GROUP_PREFIX`]; when a project
/// appears more than once, the last group wins.
#[must_use]
pub fn derive_session_view(
    tokens: &TokenPair,
    claims: &IdentityClaims,
    client_id: &str,
) -> SessionView {
    let roles = claims
        .client_access(client_id)
        .map(|access| access.roles.clone())
        .unwrap_or_default();

    SessionView {
        user: SessionUser {
            username: claims.username.clone(),
            display_name: claims.display_name.clone(),
        },
        access_token_expires_at: tokens.access_token_expires_at,
        refresh_token_expires_at: tokens.refresh_token_expires_at,
        roles,
        projects: project_roles(&claims.groups),
        error: tokens.error,
    }
}

/// Extract the `project ID -> role` mapping out of a list of groups.
///
/// Groups outside of [`PROJECT_GROUP_PREFIX`], or which don't have exactly a
/// project ID and a role after it, are ignored.
#[must_use]
pub fn project_roles<I>(groups: I) -> BTreeMap<String, String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut projects = BTreeMap::new();

    for group in groups {
        let Some(rest) = group.as_ref().strip_prefix(PROJECT_GROUP_PREFIX) else {
            continue;
        };

        let mut parts = rest.split('/');
        let (Some(project_id), Some(role), None) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };

        projects.insert(project_id.to_owned(), role.to_owned());
    }

    projects
}

/// Whether the user must go through the provider's sign-in again.
///
/// This is the case when there is no session, when refreshing the tokens
/// failed, or when the refresh token itself expired.
#[must_use]
pub fn should_force_reauth(view: Option<&SessionView>, now: DateTime<Utc>) -> bool {
    match view {
        None => true,
        Some(view) => view.error.is_some() || now >= view.refresh_token_expires_at,
    }
}
