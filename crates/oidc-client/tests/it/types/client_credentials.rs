// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::collections::HashMap;

use base64ct::Encoding;
use cadok_oidc_client::{
    requests::refresh_token::refresh_access_token,
    types::client_credentials::ClientCredentials,
};
use serde_json::json;
use wiremock::{
    Mock, Request, ResponseTemplate,
    matchers::{header, method, path},
};

use crate::{ACCESS_TOKEN, CLIENT_ID, CLIENT_SECRET, REFRESH_TOKEN, init_test, token_path};

fn token_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": ACCESS_TOKEN,
        "refresh_token": REFRESH_TOKEN,
        "expires_in": 300,
    }))
}

#[tokio::test]
async fn pass_none() {
    let (http_client, mock_server, endpoints) = init_test().await;
    let client_credentials = ClientCredentials::None {
        client_id: CLIENT_ID.to_owned(),
    };

    Mock::given(method("POST"))
        .and(path(token_path()))
        .and(|req: &Request| {
            let body = form_urlencoded::parse(&req.body).collect::<HashMap<_, _>>();
            body.get("client_id").is_some_and(|s| s == CLIENT_ID)
                && !body.contains_key("client_secret")
        })
        .respond_with(token_response())
        .expect(1)
        .mount(&mock_server)
        .await;

    refresh_access_token(
        &http_client,
        &client_credentials,
        &endpoints.token_endpoint,
        REFRESH_TOKEN.to_owned(),
        None,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn pass_client_secret_basic() {
    let (http_client, mock_server, endpoints) = init_test().await;
    let client_credentials = ClientCredentials::ClientSecretBasic {
        client_id: CLIENT_ID.to_owned(),
        client_secret: CLIENT_SECRET.to_owned(),
    };

    let username = form_urlencoded::byte_serialize(CLIENT_ID.as_bytes()).collect::<String>();
    let password = form_urlencoded::byte_serialize(CLIENT_SECRET.as_bytes()).collect::<String>();
    let enc_user_pass =
        base64ct::Base64::encode_string(format!("{username}:{password}").as_bytes());
    let authorization_header = format!("Basic {enc_user_pass}");

    Mock::given(method("POST"))
        .and(path(token_path()))
        .and(header("authorization", authorization_header.as_str()))
        .and(|req: &Request| {
            let body = form_urlencoded::parse(&req.body).collect::<HashMap<_, _>>();
            !body.contains_key("client_id") && !body.contains_key("client_secret")
        })
        .respond_with(token_response())
        .expect(1)
        .mount(&mock_server)
        .await;

    refresh_access_token(
        &http_client,
        &client_credentials,
        &endpoints.token_endpoint,
        REFRESH_TOKEN.to_owned(),
        None,
    )
    .await
    .unwrap();
}

#[test]
fn debug_hides_secret() {
    let client_credentials = ClientCredentials::ClientSecretPost {
        client_id: CLIENT_ID.to_owned(),
        client_secret: CLIENT_SECRET.to_owned(),
    };

    let debug = format!("{client_credentials:?}");
    assert!(debug.contains(CLIENT_ID));
    assert!(!debug.contains(CLIENT_SECRET));
    assert_eq!(client_credentials.client_secret(), Some(CLIENT_SECRET));
}
