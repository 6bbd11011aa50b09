// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::{collections::BTreeMap, time::Duration};

use assert_matches::assert_matches;
use cadok_gateway::{
    Environment, ForwardOptions, ForwardPolicy, Gateway, GatewayBody, GatewayError, RawKind,
    ResponseKind,
};
use reqwest::{
    Method, StatusCode,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde_json::json;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

const ACCESS_TOKEN: &str = "AccessToken1";

async fn init_test(environment: Environment) -> (Gateway, MockServer) {
    cadok_http::install_crypto_provider();

    let client = cadok_http::reqwest_client().expect("Couldn't build the HTTP client");
    let mock_server = MockServer::start().await;
    let base_url = Url::parse(&mock_server.uri()).expect("Couldn't parse URL");
    let gateway = Gateway::new(
        client,
        &base_url,
        HeaderValue::from_static("nl"),
        environment,
    );

    (gateway, mock_server)
}

fn fast_policy() -> ForwardPolicy {
    ForwardPolicy::default()
        .with_timeout(Duration::from_millis(200))
        .with_retry_delay(Duration::from_millis(10))
}

#[tokio::test]
async fn missing_token_sends_nothing() {
    let (gateway, mock_server) = init_test(Environment::Production).await;

    let policy = ForwardPolicy::default().with_retry_count(3);
    for token in [None, Some("")] {
        let error = gateway
            .forward(token, "v1/projects", Method::GET, ForwardOptions::new(), &policy)
            .await
            .unwrap_err();
        assert_eq!(error, GatewayError::Unauthorized);
        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
    }

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn forwards_with_bearer_and_language() {
    let (gateway, mock_server) = init_test(Environment::Production).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/projects/request"))
        .and(header("authorization", "Bearer AccessToken1"))
        .and(header("accept-language", "nl"))
        .and(header("x-custom", "yes"))
        .and(body_json(json!({ "name": "Dijkversterking" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 42 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-custom"),
        HeaderValue::from_static("yes"),
    );
    // Overridden by the gateway
    headers.insert("accept-language", HeaderValue::from_static("en"));
    headers.insert("authorization", HeaderValue::from_static("Bearer nope"));

    let options = ForwardOptions {
        headers,
        ..ForwardOptions::new()
    }
    .with_json_body(r#"{"name":"Dijkversterking"}"#);

    let response = gateway
        .forward(
            Some(ACCESS_TOKEN),
            "/v1/projects/request",
            Method::POST,
            options,
            &ForwardPolicy::default(),
        )
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body, GatewayBody::Json(json!({ "id": 42 })));
}

#[tokio::test]
async fn timeouts_are_retried_then_fail() {
    let (gateway, mock_server) = init_test(Environment::Production).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/forms/available"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let error = gateway
        .forward(
            Some(ACCESS_TOKEN),
            "v1/forms/available",
            Method::GET,
            ForwardOptions::new(),
            &fast_policy().with_retry_count(2),
        )
        .await
        .unwrap_err();

    assert_eq!(error, GatewayError::NetworkError);
    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn retry_then_success() {
    let (gateway, mock_server) = init_test(Environment::Production).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "p1" }])))
        .with_priority(2)
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = gateway
        .forward(
            Some(ACCESS_TOKEN),
            "v1/projects",
            Method::GET,
            ForwardOptions::new(),
            &fast_policy().with_retry_count(1),
        )
        .await
        .unwrap();

    assert_eq!(response.body, GatewayBody::Json(json!([{ "id": "p1" }])));
}

#[tokio::test]
async fn http_errors_are_not_retried() {
    let (gateway, mock_server) = init_test(Environment::Production).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/requests/7"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let error = gateway
        .forward(
            Some(ACCESS_TOKEN),
            "v1/requests/7",
            Method::GET,
            ForwardOptions::new(),
            &fast_policy().with_retry_count(3),
        )
        .await
        .unwrap_err();

    assert_eq!(error, GatewayError::Forbidden);
    assert_eq!(error.message(), "Geen toegang");
}

#[tokio::test]
async fn status_mapping() {
    let (gateway, mock_server) = init_test(Environment::Production).await;

    Mock::given(path("/api/unauthenticated"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(path("/api/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let error = gateway
        .forward(
            Some(ACCESS_TOKEN),
            "unauthenticated",
            Method::GET,
            ForwardOptions::new(),
            &fast_policy(),
        )
        .await
        .unwrap_err();
    assert_eq!(error, GatewayError::Unauthenticated);
    assert_eq!(error.message(), "Niet ingelogd");

    let error = gateway
        .forward(
            Some(ACCESS_TOKEN),
            "missing",
            Method::GET,
            ForwardOptions::new(),
            &fast_policy(),
        )
        .await
        .unwrap_err();
    assert_eq!(error, GatewayError::NotFound);
}

#[tokio::test]
async fn production_hides_backend_details() {
    let (gateway, mock_server) = init_test(Environment::Production).await;

    Mock::given(path("/api/v1/projects"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "message": "NullPointerException at line 12" })),
        )
        .mount(&mock_server)
        .await;

    let error = gateway
        .forward(
            Some(ACCESS_TOKEN),
            "v1/projects",
            Method::GET,
            ForwardOptions::new(),
            &fast_policy(),
        )
        .await
        .unwrap_err();

    assert_eq!(
        error,
        GatewayError::ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: None,
        }
    );
}

#[tokio::test]
async fn development_shows_backend_details() {
    let (gateway, mock_server) = init_test(Environment::Development).await;

    Mock::given(path("/api/json"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "Naam is verplicht" })),
        )
        .mount(&mock_server)
        .await;
    Mock::given(path("/api/text"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let error = gateway
        .forward(
            Some(ACCESS_TOKEN),
            "json",
            Method::POST,
            ForwardOptions::new(),
            &fast_policy(),
        )
        .await
        .unwrap_err();
    assert_matches!(
        error,
        GatewayError::ApiError { status, detail: Some(detail) } => {
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(detail, "Naam is verplicht");
        }
    );

    let error = gateway
        .forward(
            Some(ACCESS_TOKEN),
            "text",
            Method::GET,
            ForwardOptions::new(),
            &fast_policy(),
        )
        .await
        .unwrap_err();
    assert_matches!(
        error,
        GatewayError::ApiError { status, detail: Some(detail) } => {
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(detail, "upstream down");
        }
    );
}

#[tokio::test]
async fn response_kinds() {
    let (gateway, mock_server) = init_test(Environment::Production).await;

    Mock::given(path("/api/broken-json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/api/file"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.7".to_vec(), "application/pdf"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/api/text"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hallo"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/api/nothing"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let forward = |path: &'static str, kind: ResponseKind| {
        let gateway = gateway.clone();
        async move {
            gateway
                .forward(
                    Some(ACCESS_TOKEN),
                    path,
                    Method::GET,
                    ForwardOptions::new().with_response_kind(kind),
                    &fast_policy(),
                )
                .await
                .unwrap()
        }
    };

    let response = forward("broken-json", ResponseKind::Json).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, GatewayBody::Empty);

    let response = forward("file", ResponseKind::Blob).await;
    assert_matches!(response.body, GatewayBody::Blob { content_type, data } => {
        assert_eq!(content_type.unwrap(), "application/pdf");
        assert_eq!(&data[..], b"%PDF-1.7");
    });

    let response = forward("text", ResponseKind::Plain).await;
    assert_eq!(response.body, GatewayBody::Plain("hallo".to_owned()));

    let response = forward("nothing", ResponseKind::None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(response.body, GatewayBody::Empty);
}

#[tokio::test]
async fn fetch_raw_decodes_json_and_yaml() {
    let (gateway, mock_server) = init_test(Environment::Production).await;

    Mock::given(path("/api/v1/forms/intake"))
        .respond_with(ResponseTemplate::new(200).set_body_string("title: Intake\nsteps: 3\n"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/api/v1/forms/meta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "Meta" })))
        .mount(&mock_server)
        .await;
    Mock::given(path("/api/v1/forms/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("title: [unclosed"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/api/v1/forms/failing"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "database down" })),
        )
        .mount(&mock_server)
        .await;

    let yaml: Option<BTreeMap<String, serde_yaml::Value>> = gateway
        .fetch_raw(
            Some(ACCESS_TOKEN),
            "v1/forms/intake",
            Method::GET,
            ForwardOptions::new(),
            &fast_policy(),
            RawKind::Yaml,
        )
        .await
        .unwrap();
    let yaml = yaml.unwrap();
    assert_eq!(yaml["title"], serde_yaml::Value::from("Intake"));
    assert_eq!(yaml["steps"], serde_yaml::Value::from(3));

    let json: Option<serde_json::Value> = gateway
        .fetch_raw(
            Some(ACCESS_TOKEN),
            "v1/forms/meta",
            Method::GET,
            ForwardOptions::new(),
            &fast_policy(),
            RawKind::Json,
        )
        .await
        .unwrap();
    assert_eq!(json, Some(json!({ "title": "Meta" })));

    let broken: Option<BTreeMap<String, String>> = gateway
        .fetch_raw(
            Some(ACCESS_TOKEN),
            "v1/forms/broken",
            Method::GET,
            ForwardOptions::new(),
            &fast_policy(),
            RawKind::Yaml,
        )
        .await
        .unwrap();
    assert_eq!(broken, None);

    // Details are kept even in production, this is never sent to the browser
    let error = gateway
        .fetch_raw::<serde_json::Value>(
            Some(ACCESS_TOKEN),
            "v1/forms/failing",
            Method::GET,
            ForwardOptions::new(),
            &fast_policy(),
            RawKind::Json,
        )
        .await
        .unwrap_err();
    assert_eq!(
        error,
        GatewayError::ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: Some("database down".to_owned()),
        }
    );
}
