// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::collections::HashMap;

use assert_matches::assert_matches;
use cadok_oidc_client::{error::LogoutError, requests::logout::logout};
use wiremock::{
    Mock, Request, ResponseTemplate,
    matchers::{header, method, path},
};

use crate::{
    ACCESS_TOKEN, CLIENT_ID, CLIENT_SECRET, REFRESH_TOKEN, client_secret_post, init_test,
    logout_path,
};

#[tokio::test]
async fn pass_logout() {
    let (http_client, mock_server, endpoints) = init_test().await;

    Mock::given(method("POST"))
        .and(path(logout_path()))
        .and(header("authorization", format!("Bearer {ACCESS_TOKEN}")))
        .and(|req: &Request| {
            let body = form_urlencoded::parse(&req.body).collect::<HashMap<_, _>>();
            body.get("client_id").is_some_and(|s| s == CLIENT_ID)
                && body.get("client_secret").is_some_and(|s| s == CLIENT_SECRET)
                && body.get("refresh_token").is_some_and(|s| s == REFRESH_TOKEN)
        })
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    logout(
        &http_client,
        &client_secret_post(),
        &endpoints.logout_endpoint,
        ACCESS_TOKEN,
        REFRESH_TOKEN,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn logout_relays_provider_status() {
    let (http_client, mock_server, endpoints) = init_test().await;

    Mock::given(method("POST"))
        .and(path(logout_path()))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&mock_server)
        .await;

    let error = logout(
        &http_client,
        &client_secret_post(),
        &endpoints.logout_endpoint,
        ACCESS_TOKEN,
        "",
    )
    .await
    .unwrap_err();

    assert_matches!(error, LogoutError::Status { status } if status.as_u16() == 400);
}
