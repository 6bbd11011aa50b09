// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use cadok_http::RequestBuilderExt;
use reqwest::{
    Method, StatusCode,
    header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    ForwardOptions, ForwardPolicy, GatewayBody, GatewayError, GatewayResponse, RawKind,
    ResponseKind,
};

/// Whether the backend's error details may be shown to the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

/// Calls the backend API on behalf of a signed-in user.
///
/// Paths are resolved under `{base_url}/api/`.
#[derive(Debug, Clone)]
pub struct Gateway {
    http_client: reqwest::Client,
    api_base: Url,
    accept_language: HeaderValue,
    environment: Environment,
}

/// Read the message out of a backend error response.
///
/// JSON bodies have it in their `message` field, other bodies are the message
/// themselves.
async fn error_detail(response: reqwest::Response) -> Option<String> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));

    if is_json {
        let body: serde_json::Value = response.json().await.ok()?;
        body.get("message")
            .and_then(serde_json::Value::as_str)
            .map(ToOwned::to_owned)
    } else {
        response.text().await.ok()
    }
}

impl Gateway {
    /// Create a gateway to the backend at `base_url`
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: &Url,
        accept_language: HeaderValue,
        environment: Environment,
    ) -> Self {
        let mut api_base = base_url.clone();
        let path = format!("{}/api/", api_base.path().trim_end_matches('/'));
        api_base.set_path(&path);

        Self {
            http_client,
            api_base,
            accept_language,
            environment,
        }
    }

    /// The URL a path is forwarded to
    fn url_for(&self, path: &str) -> Result<Url, GatewayError> {
        self.api_base
            .join(path.trim_start_matches('/'))
            .map_err(|err| {
                tracing::error!(
                    error = &err as &dyn std::error::Error,
                    path,
                    "Invalid backend path"
                );
                GatewayError::NetworkError
            })
    }

    /// Send the request, retrying on network failures, and map error statuses
    async fn execute(
        &self,
        access_token: Option<&str>,
        path: &str,
        method: Method,
        options: &ForwardOptions,
        policy: &ForwardPolicy,
    ) -> Result<reqwest::Response, GatewayError> {
        let access_token = access_token
            .filter(|token| !token.is_empty())
            .ok_or(GatewayError::Unauthorized)?;

        let mut authorization = HeaderValue::try_from(format!("Bearer {access_token}"))
            .map_err(|_| GatewayError::Unauthorized)?;
        authorization.set_sensitive(true);

        let mut headers: HeaderMap = options.headers.clone();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT_LANGUAGE, self.accept_language.clone());

        let url = self.url_for(path)?;

        let mut attempt = 0;
        let response = loop {
            let mut request = self
                .http_client
                .request(method.clone(), url.clone())
                .headers(headers.clone());
            if let Some(body) = &options.body {
                request = request.body(body.clone());
            }

            match tokio::time::timeout(policy.timeout, request.send_traced()).await {
                Ok(Ok(response)) => break response,
                Ok(Err(err)) => {
                    tracing::warn!(
                        error = &err as &dyn std::error::Error,
                        attempt,
                        "Backend request failed"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        attempt,
                        timeout = ?policy.timeout,
                        "Backend request timed out"
                    );
                }
            }

            if attempt >= policy.retry_count {
                tracing::error!(
                    %method,
                    path,
                    attempts = attempt + 1,
                    "Backend unreachable"
                );
                return Err(GatewayError::NetworkError);
            }

            attempt += 1;
            tokio::time::sleep(policy.retry_delay).await;
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(match status {
            StatusCode::UNAUTHORIZED => GatewayError::Unauthenticated,
            StatusCode::FORBIDDEN => GatewayError::Forbidden,
            StatusCode::NOT_FOUND => GatewayError::NotFound,
            status => {
                let detail = error_detail(response).await;
                tracing::error!(
                    %method,
                    path,
                    status = status.as_u16(),
                    detail = detail.as_deref(),
                    "API error"
                );
                GatewayError::ApiError { status, detail }
            }
        })
    }

    /// Forward a request to the backend.
    ///
    /// Without an access token, nothing is sent and
    /// [`GatewayError::Unauthorized`] is returned. Each attempt is bounded by
    /// the policy's timeout, and only network failures are retried.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`GatewayError`] when the call fails. In
    /// production, [`GatewayError::ApiError`] never carries the backend's
    /// error details.
    #[tracing::instrument(
        name = "gateway.forward",
        skip_all,
        fields(http.request.method = %method, gateway.path = path),
    )]
    pub async fn forward(
        &self,
        access_token: Option<&str>,
        path: &str,
        method: Method,
        options: ForwardOptions,
        policy: &ForwardPolicy,
    ) -> Result<GatewayResponse, GatewayError> {
        let response = self
            .execute(access_token, path, method, &options, policy)
            .await
            .map_err(|err| match err {
                GatewayError::ApiError { status, .. }
                    if self.environment == Environment::Production =>
                {
                    GatewayError::ApiError {
                        status,
                        detail: None,
                    }
                }
                err => err,
            })?;

        let status = response.status();
        let body = match options.response_kind {
            ResponseKind::Json => match response.bytes().await {
                Ok(bytes) => serde_json::from_slice(&bytes)
                    .map(GatewayBody::Json)
                    .unwrap_or(GatewayBody::Empty),
                Err(err) => {
                    tracing::warn!(
                        error = &err as &dyn std::error::Error,
                        "Failed to read the backend response"
                    );
                    GatewayBody::Empty
                }
            },

            ResponseKind::Blob => {
                let content_type = response.headers().get(CONTENT_TYPE).cloned();
                let data = response.bytes().await.map_err(|err| {
                    tracing::error!(
                        error = &err as &dyn std::error::Error,
                        "Failed to read the backend response"
                    );
                    GatewayError::NetworkError
                })?;
                GatewayBody::Blob { content_type, data }
            }

            ResponseKind::Plain => {
                let text = response.text().await.map_err(|err| {
                    tracing::error!(
                        error = &err as &dyn std::error::Error,
                        "Failed to read the backend response"
                    );
                    GatewayError::NetworkError
                })?;
                GatewayBody::Plain(text)
            }

            ResponseKind::None => GatewayBody::Empty,
        };

        Ok(GatewayResponse { status, body })
    }

    /// Call the backend and decode its response for use on the server side.
    ///
    /// Authentication, retries and error mapping are the same as
    /// [`Gateway::forward`], except that [`GatewayError::ApiError`] always
    /// carries the backend's message. A body which can't be decoded yields
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`GatewayError`] when the call fails.
    #[tracing::instrument(
        name = "gateway.fetch_raw",
        skip_all,
        fields(http.request.method = %method, gateway.path = path),
    )]
    pub async fn fetch_raw<T: DeserializeOwned>(
        &self,
        access_token: Option<&str>,
        path: &str,
        method: Method,
        options: ForwardOptions,
        policy: &ForwardPolicy,
        kind: RawKind,
    ) -> Result<Option<T>, GatewayError> {
        let response = self
            .execute(access_token, path, method, &options, policy)
            .await?;

        let Ok(bytes) = response.bytes().await else {
            return Ok(None);
        };

        let value = match kind {
            RawKind::Json => serde_json::from_slice(&bytes).ok(),
            RawKind::Yaml => serde_yaml::from_slice(&bytes)
                .inspect_err(|err| {
                    tracing::warn!(
                        error = err as &dyn std::error::Error,
                        "Backend returned invalid YAML"
                    );
                })
                .ok(),
        };

        Ok(value)
    }
}
