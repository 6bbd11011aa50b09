// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use cadok_oidc_client::types::{ProviderEndpoints, client_credentials::ClientCredentials};
use url::Url;
use wiremock::MockServer;

mod requests;
mod types;

const REDIRECT_URI: &str = "http://localhost/api/auth/callback";
const CLIENT_ID: &str = "client!+ID";
const CLIENT_SECRET: &str = "SECRET?%Gclient";
const AUTHORIZATION_CODE: &str = "authC0D3";
const CODE_VERIFIER: &str = "cODEv3R1f1ER";
const ACCESS_TOKEN: &str = "AccessToken1";
const REFRESH_TOKEN: &str = "RefreshToken1";
const REALM_PATH: &str = "/realms/cadok";

async fn init_test() -> (reqwest::Client, MockServer, ProviderEndpoints) {
    cadok_http::install_crypto_provider();

    let client = cadok_http::reqwest_client().expect("Couldn't build the HTTP client");
    let mock_server = MockServer::start().await;
    let issuer =
        Url::parse(&format!("{}{REALM_PATH}", mock_server.uri())).expect("Couldn't parse URL");
    let endpoints = ProviderEndpoints::for_issuer(&issuer).expect("Couldn't build endpoints");

    (client, mock_server, endpoints)
}

fn token_path() -> String {
    format!("{REALM_PATH}/protocol/openid-connect/token")
}

fn logout_path() -> String {
    format!("{REALM_PATH}/protocol/openid-connect/logout")
}

fn client_secret_post() -> ClientCredentials {
    ClientCredentials::ClientSecretPost {
        client_id: CLIENT_ID.to_owned(),
        client_secret: CLIENT_SECRET.to_owned(),
    }
}
