// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use axum::body::Body;
use base64ct::{Base64UrlUnpadded, Encoding};
use cadok_axum_utils::SessionCookieExt;
use cadok_config::AppConfig;
use cadok_data_model::{Clock, MockClock, StoredSession, TokenPair};
use http::{
    HeaderName, Request, Response, StatusCode,
    header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
};
use http_body_util::BodyExt;
use serde::{Serialize, de::DeserializeOwned};
use tower::ServiceExt;
use url::Url;
use wiremock::MockServer;

use crate::AppState;

/// An access token carrying the claims the tests expect
pub(crate) fn access_token() -> String {
    let payload = serde_json::json!({
        "username": "jdoe",
        "first_name": "Jan",
        "last_name": "de Vries",
        "groups": ["/CADOK/p1/admin", "/OTHER/x/y"],
        "resource_access": {
            "cadok-portal": { "roles": ["editor"] },
        },
    });
    let payload = Base64UrlUnpadded::encode_string(payload.to_string().as_bytes());
    format!("eyJhbGciOiJSUzI1NiJ9.{payload}.c2lnbmF0dXJl")
}

pub(crate) struct TestState {
    pub app_state: AppState,
    pub clock: Arc<MockClock>,
    pub provider: MockServer,
    pub backend: MockServer,
}

impl TestState {
    pub async fn new() -> Self {
        cadok_http::install_crypto_provider();

        let provider = MockServer::start().await;
        let backend = MockServer::start().await;

        let mut config: AppConfig = cadok_config::RootConfig::test().into();
        config.provider.issuer = Url::parse(&format!("{}/realms/cadok", provider.uri())).unwrap();
        config.provider.client_secret = "hunter2".to_owned();
        config.backend.base_url = Url::parse(&backend.uri()).unwrap();
        config.backend.timeout = std::time::Duration::from_secs(2);

        let clock = Arc::new(MockClock::default());
        let http_client = cadok_http::reqwest_client().unwrap();
        let app_state = AppState::new(&config, http_client, clock.clone()).unwrap();

        Self {
            app_state,
            clock,
            provider,
            backend,
        }
    }

    /// A session whose access token expires after the given delay
    pub fn session(&self, expires_in: chrono::Duration) -> StoredSession {
        let now = self.clock.now();
        let tokens = TokenPair {
            access_token: access_token(),
            refresh_token: "refresh-1".to_owned(),
            access_token_expires_at: now + expires_in,
            refresh_token_expires_at: now + chrono::Duration::minutes(30),
            error: None,
        };
        let claims = cadok_jose::decode_identity_claims(&tokens.access_token).unwrap();

        StoredSession { tokens, claims }
    }

    /// The `Cookie` header value of a request carrying the given session
    pub fn session_cookie(&self, session: &StoredSession) -> String {
        let jar = self
            .app_state
            .cookie_manager
            .cookie_jar()
            .store_session(&self.app_state.site.session_cookie, session);

        let response = axum::response::IntoResponse::into_response((jar, ()));
        cookie_header(&response)
    }

    pub async fn request(&self, request: Request<String>) -> Response<String> {
        let app = crate::router(self.app_state.clone());
        let request = request.map(Body::from);

        let response = app.oneshot(request).await.unwrap();
        let (parts, body) = response.into_parts();
        let body = body.collect().await.unwrap().to_bytes();
        let body = String::from_utf8(body.to_vec()).unwrap();

        Response::from_parts(parts, body)
    }
}

/// Turn the `Set-Cookie` headers of a response into a `Cookie` header value
fn cookie_header<B>(response: &Response<B>) -> String {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) trait RequestBuilderExt {
    /// Builds the request with the given JSON value as body.
    fn json<T: Serialize>(self, body: T) -> Request<String>;

    /// Adds the given `Cookie` header value, if not empty.
    fn cookies(self, cookies: &str) -> Self;

    /// Builds the request with an empty body.
    fn empty(self) -> Request<String>;
}

impl RequestBuilderExt for http::request::Builder {
    fn json<T: Serialize>(self, body: T) -> Request<String> {
        self.header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_string(&body).unwrap())
            .unwrap()
    }

    fn cookies(self, cookies: &str) -> Self {
        if cookies.is_empty() {
            self
        } else {
            self.header(COOKIE, cookies)
        }
    }

    fn empty(self) -> Request<String> {
        self.body(String::new()).unwrap()
    }
}

pub(crate) trait ResponseExt {
    /// Asserts that the response has the given status code.
    ///
    /// # Panics
    ///
    /// Panics if the response has a different status code.
    fn assert_status(&self, status: StatusCode);

    /// Asserts that the response has the given header value.
    ///
    /// # Panics
    ///
    /// Panics if the response does not have the given header or if the header
    /// value does not match.
    fn assert_header_value(&self, header: HeaderName, value: &str);

    /// Get the response body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the response is missing the `Content-Type: application/json`,
    /// or if the body is not valid JSON.
    fn json<T: DeserializeOwned>(&self) -> T;

    /// The cookies set by this response, as a `Cookie` header value for the
    /// next request
    fn set_cookies(&self) -> String;
}

impl ResponseExt for Response<String> {
    #[track_caller]
    fn assert_status(&self, status: StatusCode) {
        assert_eq!(
            self.status(),
            status,
            "HTTP status code mismatch: got {}, expected {}. Body: {}",
            self.status(),
            status,
            self.body()
        );
    }

    #[track_caller]
    fn assert_header_value(&self, header: HeaderName, value: &str) {
        let actual_value = self
            .headers()
            .get(&header)
            .unwrap_or_else(|| panic!("Missing header {header}"));

        assert_eq!(actual_value, value, "Header mismatch for {header}");
    }

    #[track_caller]
    fn json<T: DeserializeOwned>(&self) -> T {
        self.assert_header_value(CONTENT_TYPE, "application/json");
        serde_json::from_str(self.body()).expect("JSON deserialization failed")
    }

    fn set_cookies(&self) -> String {
        cookie_header(self)
    }
}
