// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use cadok_config::{AppConfig, ConfigurationSection};
use cadok_data_model::{Clock, IdentityClaims, StoredSession, SystemClock, TokenPair};
use cadok_handlers::AppState;
use cadok_session::{RefreshScheduler, SessionUpdate};
use clap::Parser;
use figment::Figment;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, info_span, warn};

#[derive(Parser, Debug)]
pub(super) struct Options {
    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(Parser, Debug)]
enum Subcommand {
    /// Keep a session alive from a refresh token, printing the session every
    /// time it changes. Send SIGHUP to refresh it immediately.
    KeepAlive {
        /// The refresh token to start from
        #[arg(long, env = "CADOK_REFRESH_TOKEN", hide_env_values = true)]
        refresh_token: String,
    },
}

fn print_update(client_id: &str, update: &SessionUpdate) -> anyhow::Result<()> {
    let mut view = serde_json::to_value(update.session.view(client_id))?;
    view["forceReauth"] = update.force_reauth.into();
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

impl Options {
    #[tracing::instrument(skip_all)]
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as SC;
        match self.subcommand {
            SC::KeepAlive { refresh_token } => {
                let span = info_span!("cli.debug.keep_alive").entered();
                let config = AppConfig::extract(figment).map_err(anyhow::Error::from_boxed)?;
                let clock = Arc::new(SystemClock::default());
                let http_client =
                    cadok_http::reqwest_client().context("could not build the HTTP client")?;
                let state = AppState::new(&config, http_client, clock.clone())
                    .context("invalid configuration")?;
                let lifecycle = Arc::new(state.lifecycle().clone());
                let client_id = lifecycle.credentials().client_id().to_owned();

                // Only the refresh token is known, so redeem it right away
                let now = clock.now();
                let placeholder = StoredSession {
                    tokens: TokenPair {
                        access_token: String::new(),
                        refresh_token,
                        access_token_expires_at: now,
                        refresh_token_expires_at: now + chrono::Duration::hours(1),
                        error: None,
                    },
                    claims: IdentityClaims::default(),
                };

                let session = lifecycle
                    .refresh(&placeholder)
                    .await
                    .context("could not redeem the refresh token")?;

                if let Some(error) = session.tokens.error {
                    warn!(%error, "The provider did not accept the refresh token");
                    return Ok(ExitCode::FAILURE);
                }

                let mut scheduler =
                    RefreshScheduler::new(lifecycle, session, config.session.keep_alive_interval);
                let mut updates = scheduler.subscribe();
                print_update(&client_id, &updates.borrow_and_update())?;

                let mut sighup = signal(SignalKind::hangup())?;
                scheduler.start();
                info!(
                    interval = ?config.session.keep_alive_interval,
                    "Keeping the session alive"
                );
                span.exit();

                let code = loop {
                    tokio::select! {
                        res = updates.changed() => {
                            if res.is_err() {
                                break ExitCode::FAILURE;
                            }

                            let update = updates.borrow_and_update().clone();
                            print_update(&client_id, &update)?;
                            if update.force_reauth {
                                warn!("The session expired, a new sign-in is needed");
                                break ExitCode::FAILURE;
                            }
                        }
                        _ = sighup.recv() => {
                            info!("SIGHUP received, refreshing the session");
                            scheduler.wake();
                        }
                        res = tokio::signal::ctrl_c() => {
                            res?;
                            break ExitCode::SUCCESS;
                        }
                    }
                };

                scheduler.stop().await;
                Ok(code)
            }
        }
    }
}
