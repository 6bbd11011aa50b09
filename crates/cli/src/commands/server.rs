// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use cadok_config::{AppConfig, ConfigurationSection};
use cadok_data_model::SystemClock;
use cadok_handlers::AppState;
use clap::Parser;
use figment::Figment;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span};

use crate::shutdown::ShutdownManager;

#[derive(Parser, Debug, Default)]
pub(super) struct Options {}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        let span = info_span!("cli.run.init").entered();
        let shutdown = ShutdownManager::new()?;
        let config = AppConfig::extract(figment).map_err(anyhow::Error::from_boxed)?;

        info!(version = crate::VERSION, "Starting up");

        let http_client = cadok_http::reqwest_client().context("could not build the HTTP client")?;
        let state = AppState::new(&config, http_client, Arc::new(SystemClock::default()))
            .context("invalid configuration")?;

        let router = cadok_handlers::router(state).layer(TraceLayer::new_for_http());

        let listener = tokio::net::TcpListener::bind(config.http.listen)
            .await
            .with_context(|| format!("could not bind to {}", config.http.listen))?;

        info!(
            address = %config.http.listen,
            public_base = %config.http.public_base,
            "Listening for requests",
        );

        let soft_shutdown_token = shutdown.soft_shutdown_token();
        let hard_shutdown_token = shutdown.hard_shutdown_token();
        shutdown.task_tracker().spawn(async move {
            let server = axum::serve(listener, router)
                .with_graceful_shutdown(soft_shutdown_token.cancelled_owned());

            tokio::select! {
                res = server => {
                    if let Err(err) = res {
                        tracing::error!(
                            error = &err as &dyn std::error::Error,
                            "Server stopped unexpectedly",
                        );
                    }
                }
                () = hard_shutdown_token.cancelled() => {
                    tracing::warn!("Dropping the remaining connections");
                }
            }
        });

        span.exit();

        shutdown.run().await;

        Ok(ExitCode::SUCCESS)
    }
}
