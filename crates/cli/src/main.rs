// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

#![allow(clippy::module_name_repetitions)]

use std::{io::IsTerminal, process::ExitCode, sync::Arc};

use anyhow::Context;
use cadok_config::{ConfigurationSectionExt, TelemetryConfig};
use clap::Parser;
use sentry_tracing::EventFilter;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod shutdown;

/// The application version
static VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug)]
struct SentryTransportFactory {
    client: reqwest::Client,
}

impl sentry::TransportFactory for SentryTransportFactory {
    fn create_transport(&self, options: &sentry::ClientOptions) -> Arc<dyn sentry::Transport> {
        let transport =
            sentry::transports::ReqwestHttpTransport::with_client(options, self.client.clone());

        Arc::new(transport)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env files
    // We keep the path to log it afterwards
    let dotenv_path: Result<Option<_>, _> = dotenvy::dotenv()
        .map(Some)
        .or_else(|e| if e.not_found() { Ok(None) } else { Err(e) });

    // Logs go to stderr, through a non-blocking writer
    let output = std::io::stderr();
    let with_ansi = output.is_terminal();
    let (log_writer, _guard) = tracing_appender::non_blocking(output);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_writer)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(with_ansi);
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("could not setup logging filter")?;

    cadok_http::install_crypto_provider();

    let opts = self::commands::Options::parse();
    let figment = opts.figment();

    let telemetry_config =
        TelemetryConfig::extract_or_default(&figment).map_err(anyhow::Error::from_boxed)?;

    let http_client = cadok_http::reqwest_client().context("could not build the HTTP client")?;
    let sentry = sentry::init((
        telemetry_config.sentry.dsn.as_deref(),
        sentry::ClientOptions {
            transport: Some(Arc::new(SentryTransportFactory {
                client: http_client,
            })),
            environment: telemetry_config.sentry.environment.clone().map(Into::into),
            release: Some(VERSION.into()),
            sample_rate: telemetry_config.sentry.sample_rate.unwrap_or(1.0),
            ..Default::default()
        },
    ));

    let sentry_layer = sentry.is_enabled().then(|| {
        sentry_tracing::layer().event_filter(|md| {
            // The sign-in routes report their errors themselves
            if md.target().starts_with("cadok_handlers::auth::callback") {
                EventFilter::Breadcrumb
            } else {
                sentry_tracing::default_event_filter(md)
            }
        })
    });

    Registry::default()
        .with(sentry_layer)
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .context("could not initialize logging")?;

    match dotenv_path {
        Ok(Some(path)) => tracing::info!(?path, "Loaded environment variables from .env file"),
        Ok(None) => {}
        Err(e) => tracing::warn!(?e, "Failed to load .env file"),
    }

    tracing::trace!(?opts, "Running command");
    opts.run(&figment).await
}
