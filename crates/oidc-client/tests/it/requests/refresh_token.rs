// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::collections::HashMap;

use assert_matches::assert_matches;
use cadok_oidc_client::{
    error::{TokenRefreshError, TokenRequestError},
    requests::refresh_token::refresh_access_token,
};
use serde_json::json;
use wiremock::{
    Mock, Request, ResponseTemplate,
    matchers::{body_string_contains, method, path},
};

use crate::{
    ACCESS_TOKEN, CLIENT_ID, CLIENT_SECRET, REFRESH_TOKEN, client_secret_post, init_test,
    token_path,
};

#[tokio::test]
async fn pass_refresh_access_token() {
    let (http_client, mock_server, endpoints) = init_test().await;

    Mock::given(method("POST"))
        .and(path(token_path()))
        .and(|req: &Request| {
            let query_pairs = form_urlencoded::parse(&req.body).collect::<HashMap<_, _>>();

            if query_pairs
                .get("grant_type")
                .filter(|s| *s == "refresh_token")
                .is_none()
            {
                println!("Wrong or missing grant type");
                return false;
            }
            if query_pairs
                .get("refresh_token")
                .filter(|s| *s == REFRESH_TOKEN)
                .is_none()
            {
                println!("Wrong or missing refresh token");
                return false;
            }
            if query_pairs
                .get("client_id")
                .filter(|s| *s == CLIENT_ID)
                .is_none()
            {
                println!("Wrong or missing client ID");
                return false;
            }
            if query_pairs
                .get("client_secret")
                .filter(|s| *s == CLIENT_SECRET)
                .is_none()
            {
                println!("Wrong or missing client secret");
                return false;
            }

            true
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "refresh_token": "RefreshToken2",
            "token_type": "Bearer",
            "expires_at": 1_700_000_000,
            "refresh_expires_in": 1800,
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = refresh_access_token(
        &http_client,
        &client_secret_post(),
        &endpoints.token_endpoint,
        REFRESH_TOKEN.to_owned(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(response.access_token, ACCESS_TOKEN);
    assert_eq!(response.refresh_token.as_deref(), Some("RefreshToken2"));
    assert_eq!(response.expires_at, Some(1_700_000_000));
    assert_eq!(response.expires_in, None);
}

#[tokio::test]
async fn empty_refresh_token_is_still_sent() {
    let (http_client, mock_server, endpoints) = init_test().await;

    Mock::given(method("POST"))
        .and(path(token_path()))
        .and(body_string_contains("refresh_token=&"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_request",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let error = refresh_access_token(
        &http_client,
        &client_secret_post(),
        &endpoints.token_endpoint,
        String::new(),
        None,
    )
    .await
    .unwrap_err();

    assert_matches!(
        error,
        TokenRefreshError::Token(TokenRequestError::Status { status, .. }) if status.as_u16() == 400
    );
}

#[tokio::test]
async fn fail_refresh_with_non_json_error() {
    let (http_client, mock_server, endpoints) = init_test().await;

    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&mock_server)
        .await;

    let error = refresh_access_token(
        &http_client,
        &client_secret_post(),
        &endpoints.token_endpoint,
        REFRESH_TOKEN.to_owned(),
        None,
    )
    .await
    .unwrap_err();

    assert_matches!(
        error,
        TokenRefreshError::Token(TokenRequestError::Status { status, body: None }) if status.as_u16() == 502
    );
}
