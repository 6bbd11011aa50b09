// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::collections::HashMap;

use assert_matches::assert_matches;
use cadok_oidc_client::{
    error::{TokenAuthorizationCodeError, TokenRequestError},
    requests::authorization_code::{
        AuthorizationRequestData, AuthorizationValidationData,
        access_token_with_authorization_code, build_authorization_url, compute_code_challenge,
    },
};
use rand::SeedableRng;
use serde_json::json;
use url::Url;
use wiremock::{
    Mock, Request, ResponseTemplate,
    matchers::{method, path},
};

use crate::{
    ACCESS_TOKEN, AUTHORIZATION_CODE, CLIENT_ID, CLIENT_SECRET, CODE_VERIFIER, REDIRECT_URI,
    REFRESH_TOKEN, client_secret_post, init_test, token_path,
};

#[test]
fn pass_authorization_url() {
    let authorization_endpoint =
        Url::parse("http://localhost/realms/cadok/protocol/openid-connect/auth?kc_idp_hint=x")
            .unwrap();
    let redirect_uri = Url::parse(REDIRECT_URI).unwrap();
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);

    let (url, validation_data) = build_authorization_url(
        authorization_endpoint,
        AuthorizationRequestData::new(
            CLIENT_ID.to_owned(),
            "openid cadok".to_owned(),
            redirect_uri.clone(),
        ),
        &mut rng,
    )
    .unwrap();

    assert_eq!(validation_data.state.len(), 16);
    assert_eq!(validation_data.redirect_uri, redirect_uri);
    assert_eq!(validation_data.code_challenge_verifier.len(), 43);

    assert_eq!(url.path(), "/realms/cadok/protocol/openid-connect/auth");

    let query_pairs = url.query_pairs().collect::<HashMap<_, _>>();
    assert_eq!(query_pairs.get("kc_idp_hint").unwrap(), "x");
    assert_eq!(query_pairs.get("scope").unwrap(), "openid cadok");
    assert_eq!(query_pairs.get("response_type").unwrap(), "code");
    assert_eq!(query_pairs.get("client_id").unwrap(), CLIENT_ID);
    assert_eq!(query_pairs.get("redirect_uri").unwrap(), REDIRECT_URI);
    assert_eq!(*query_pairs.get("state").unwrap(), validation_data.state);
    assert_eq!(
        *query_pairs.get("code_challenge").unwrap(),
        compute_code_challenge(&validation_data.code_challenge_verifier)
    );
    assert_eq!(query_pairs.get("code_challenge_method").unwrap(), "S256");
}

#[test]
fn authorization_url_is_random() {
    let endpoint = Url::parse("http://localhost/auth").unwrap();
    let redirect_uri = Url::parse(REDIRECT_URI).unwrap();
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
    let data = AuthorizationRequestData::new(
        CLIENT_ID.to_owned(),
        "openid".to_owned(),
        redirect_uri,
    );

    let (_, first) = build_authorization_url(endpoint.clone(), data.clone(), &mut rng).unwrap();
    let (_, second) = build_authorization_url(endpoint, data, &mut rng).unwrap();

    assert_ne!(first.state, second.state);
    assert_ne!(first.code_challenge_verifier, second.code_challenge_verifier);
}

/// Check if the given request to the token endpoint is valid.
fn is_valid_token_endpoint_request(req: &Request) -> bool {
    let body = form_urlencoded::parse(&req.body).collect::<HashMap<_, _>>();

    if body.get("client_id").filter(|s| *s == CLIENT_ID).is_none() {
        println!("Missing or wrong client ID");
        return false;
    }
    if body
        .get("client_secret")
        .filter(|s| *s == CLIENT_SECRET)
        .is_none()
    {
        println!("Missing or wrong client secret");
        return false;
    }
    if body
        .get("grant_type")
        .filter(|s| *s == "authorization_code")
        .is_none()
    {
        println!("Missing or wrong grant type");
        return false;
    }
    if body
        .get("code")
        .filter(|s| *s == AUTHORIZATION_CODE)
        .is_none()
    {
        println!("Missing or wrong authorization code");
        return false;
    }
    if body
        .get("redirect_uri")
        .filter(|s| *s == REDIRECT_URI)
        .is_none()
    {
        println!("Missing or wrong redirect URI");
        return false;
    }
    if body
        .get("code_verifier")
        .filter(|s| *s == CODE_VERIFIER)
        .is_none()
    {
        println!("Missing or wrong code verifier");
        return false;
    }

    true
}

fn validation_data() -> AuthorizationValidationData {
    AuthorizationValidationData {
        state: "some_state".to_owned(),
        redirect_uri: Url::parse(REDIRECT_URI).unwrap(),
        code_challenge_verifier: CODE_VERIFIER.to_owned(),
    }
}

#[tokio::test]
async fn pass_access_token_with_authorization_code() {
    let (http_client, mock_server, endpoints) = init_test().await;

    Mock::given(method("POST"))
        .and(path(token_path()))
        .and(is_valid_token_endpoint_request)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "refresh_token": REFRESH_TOKEN,
            "token_type": "Bearer",
            "expires_in": 300,
            "refresh_expires_in": 1800,
            "scope": "openid cadok",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = access_token_with_authorization_code(
        &http_client,
        &client_secret_post(),
        &endpoints.token_endpoint,
        AUTHORIZATION_CODE.to_owned(),
        validation_data(),
    )
    .await
    .unwrap();

    assert_eq!(response.access_token, ACCESS_TOKEN);
    assert_eq!(response.refresh_token.as_deref(), Some(REFRESH_TOKEN));
    assert_eq!(response.expires_in, Some(300));
    assert_eq!(response.expires_at, None);
    assert_eq!(response.refresh_expires_in, Some(1800));
}

#[tokio::test]
async fn fail_access_token_with_authorization_code_wrong_code() {
    let (http_client, mock_server, endpoints) = init_test().await;

    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Code not valid",
        })))
        .mount(&mock_server)
        .await;

    let error = access_token_with_authorization_code(
        &http_client,
        &client_secret_post(),
        &endpoints.token_endpoint,
        "WRONG_CODE".to_owned(),
        validation_data(),
    )
    .await
    .unwrap_err();

    assert_matches!(
        error,
        TokenAuthorizationCodeError::Token(TokenRequestError::Status { status, body: Some(body) }) => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(body.error, "invalid_grant");
            assert_eq!(body.error_description.as_deref(), Some("Code not valid"));
        }
    );
}
