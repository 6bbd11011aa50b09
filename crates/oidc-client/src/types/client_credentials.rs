// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Types and methods for client credentials.

use std::fmt;

use serde::Serialize;

/// The credentials obtained during registration, to authenticate a client on
/// endpoints that require it.
#[derive(Clone)]
pub enum ClientCredentials {
    /// No client authentication is used.
    ///
    /// This is used if the client is public.
    None {
        /// The unique ID for the client.
        client_id: String,
    },

    /// The client authentication is sent via the Authorization HTTP header.
    ClientSecretBasic {
        /// The unique ID for the client.
        client_id: String,

        /// The secret of the client.
        client_secret: String,
    },

    /// The client authentication is sent with the body of the request.
    ClientSecretPost {
        /// The unique ID for the client.
        client_id: String,

        /// The secret of the client.
        client_secret: String,
    },
}

impl ClientCredentials {
    /// Get the client ID of these `ClientCredentials`.
    #[must_use]
    pub fn client_id(&self) -> &str {
        match self {
            ClientCredentials::None { client_id }
            | ClientCredentials::ClientSecretBasic { client_id, .. }
            | ClientCredentials::ClientSecretPost { client_id, .. } => client_id,
        }
    }

    /// Get the client secret, if these credentials have one.
    #[must_use]
    pub fn client_secret(&self) -> Option<&str> {
        match self {
            ClientCredentials::None { .. } => None,
            ClientCredentials::ClientSecretBasic { client_secret, .. }
            | ClientCredentials::ClientSecretPost { client_secret, .. } => Some(client_secret),
        }
    }

    /// Apply these [`ClientCredentials`] to the given request with the given
    /// form.
    pub(crate) fn authenticated_form<T: Serialize>(
        &self,
        request: reqwest::RequestBuilder,
        form: &T,
    ) -> reqwest::RequestBuilder {
        match self {
            ClientCredentials::None { client_id } => request.form(&RequestWithClientCredentials {
                body: form,
                client_id: Some(client_id),
                client_secret: None,
            }),

            ClientCredentials::ClientSecretBasic {
                client_id,
                client_secret,
            } => {
                let username =
                    form_urlencoded::byte_serialize(client_id.as_bytes()).collect::<String>();
                let password =
                    form_urlencoded::byte_serialize(client_secret.as_bytes()).collect::<String>();
                request
                    .basic_auth(username, Some(password))
                    .form(&RequestWithClientCredentials {
                        body: form,
                        client_id: None,
                        client_secret: None,
                    })
            }

            ClientCredentials::ClientSecretPost {
                client_id,
                client_secret,
            } => request.form(&RequestWithClientCredentials {
                body: form,
                client_id: Some(client_id),
                client_secret: Some(client_secret),
            }),
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None { client_id } => f
                .debug_struct("None")
                .field("client_id", client_id)
                .finish(),
            Self::ClientSecretBasic { client_id, .. } => f
                .debug_struct("ClientSecretBasic")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
            Self::ClientSecretPost { client_id, .. } => f
                .debug_struct("ClientSecretPost")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Clone, Serialize)]
struct RequestWithClientCredentials<'a, T> {
    #[serde(flatten)]
    body: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
}
