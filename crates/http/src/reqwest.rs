// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::time::Duration;

use headers::{ContentLength, HeaderMapExt as _, UserAgent};
use rustls_platform_verifier::ConfigVerifierExt;
use thiserror::Error;
use tokio::time::Instant;
use tracing::Instrument;

static USER_AGENT: &str = concat!("cadok-portal/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("failed to set up the TLS configuration")]
    Tls(#[from] rustls::Error),

    #[error("failed to build the HTTP client")]
    Client(#[from] reqwest::Error),
}

/// Install the process-wide rustls crypto provider.
///
/// This must be called before [`client`]. Calling it more than once is fine.
pub fn install_crypto_provider() {
    // Only fails if a provider was already installed
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Create a new [`reqwest::Client`] with sane parameters
///
/// Individual requests still have their own timeout set by their callers, the
/// one set here only catches requests which would otherwise hang forever.
///
/// # Errors
///
/// Returns an error if the platform certificate verifier can't be set up, or
/// if the client fails to build
pub fn client() -> Result<reqwest::Client, ClientBuildError> {
    // The explicit typing here is because `use_preconfigured_tls` accepts
    // `Any`, but wants a `ClientConfig` under the hood.
    let tls_config: rustls::ClientConfig = rustls::ClientConfig::with_platform_verifier()?;

    let client = reqwest::Client::builder()
        .use_preconfigured_tls(tls_config)
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(30))
        .build()?;

    Ok(client)
}

async fn send_traced(
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, reqwest::Error> {
    let start = Instant::now();
    let (client, request) = request.build_split();
    let request = request?;

    let headers = request.headers();
    let server_address = request.url().host_str().map(ToOwned::to_owned);
    let server_port = request.url().port_or_known_default();
    let user_agent = headers
        .typed_get::<UserAgent>()
        .map(tracing::field::display);
    let content_length = headers.typed_get().map(|ContentLength(len)| len);

    let span = tracing::info_span!(
        "http.client.request",
        "http.request.method" = %request.method(),
        "url.path" = request.url().path(),
        "http.response.status_code" = tracing::field::Empty,
        "http.request.body.size" = content_length,
        "http.response.body.size" = tracing::field::Empty,
        "server.address" = server_address,
        "server.port" = server_port,
        "user_agent.original" = user_agent,
        "duration_ms" = tracing::field::Empty,
        "rust.error" = tracing::field::Empty,
    );

    async move {
        let span = tracing::Span::current();
        let result = client.execute(request).await;

        let duration = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        span.record("duration_ms", duration);

        match &result {
            Ok(response) => {
                span.record("http.response.status_code", response.status().as_u16());

                if let Some(ContentLength(content_length)) = response.headers().typed_get() {
                    span.record("http.response.body.size", content_length);
                }
            }
            Err(err) => {
                span.record("rust.error", err as &dyn std::error::Error);
            }
        }

        result
    }
    .instrument(span)
    .await
}

/// An extension trait implemented for [`reqwest::RequestBuilder`] to send a
/// request within a tracing span.
pub trait RequestBuilderExt {
    /// Send the request within a tracing span
    fn send_traced(self) -> impl Future<Output = Result<reqwest::Response, reqwest::Error>> + Send;
}

impl RequestBuilderExt for reqwest::RequestBuilder {
    fn send_traced(self) -> impl Future<Output = Result<reqwest::Response, reqwest::Error>> + Send {
        send_traced(self)
    }
}
