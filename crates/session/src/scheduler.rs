// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::{sync::Arc, time::Duration};

use cadok_data_model::{StoredSession, should_force_reauth};
use tokio::{
    sync::{Notify, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::Refresher;

/// How often a running [`RefreshScheduler`] checks the session
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(50);

/// The latest state of a session kept alive by a [`RefreshScheduler`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUpdate {
    pub session: StoredSession,

    /// Whether the user has to sign in again. Once set, the scheduler stops.
    pub force_reauth: bool,
}

struct Running {
    cancellation_token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Keeps a session warm by regularly refreshing it.
///
/// The session is checked once when the scheduler starts, refreshing it only
/// if the access token expired. After that, every interval tick and every call
/// to [`RefreshScheduler::wake`] refresh the tokens, even if they are still
/// valid.
pub struct RefreshScheduler<R> {
    refresher: Arc<R>,
    interval: Duration,
    updates: Arc<watch::Sender<SessionUpdate>>,
    wake: Arc<Notify>,
    running: Option<Running>,
}

impl<R: Refresher> RefreshScheduler<R> {
    #[must_use]
    pub fn new(refresher: Arc<R>, session: StoredSession, interval: Duration) -> Self {
        let view = session.view(refresher.client_id());
        let force_reauth = should_force_reauth(Some(&view), refresher.now());
        let (updates, _) = watch::channel(SessionUpdate {
            session,
            force_reauth,
        });

        Self {
            refresher,
            interval,
            updates: Arc::new(updates),
            wake: Arc::new(Notify::new()),
            running: None,
        }
    }

    /// Get notified every time the session was checked
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    /// The latest state of the session
    #[must_use]
    pub fn current(&self) -> SessionUpdate {
        self.updates.borrow().clone()
    }

    /// Whether the background task is still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    /// Start the background task. Does nothing if it is already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        let cancellation_token = CancellationToken::new();
        let handle = tokio::spawn(run(
            self.refresher.clone(),
            self.interval,
            self.updates.clone(),
            self.wake.clone(),
            cancellation_token.clone(),
        ));

        self.running = Some(Running {
            cancellation_token,
            handle,
        });
    }

    /// Check the session now, without waiting for the next tick
    pub fn wake(&self) {
        self.wake.notify_one();
    }

    /// Stop the background task and wait for it to finish
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        running.cancellation_token.cancel();
        if let Err(err) = running.handle.await {
            tracing::error!(
                error = &err as &dyn std::error::Error,
                "Session refresh task failed"
            );
        }
    }
}

impl<R> Drop for RefreshScheduler<R> {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancellation_token.cancel();
        }
    }
}

#[tracing::instrument(name = "session.keep_alive", skip_all)]
async fn run<R: Refresher>(
    refresher: Arc<R>,
    interval: Duration,
    updates: Arc<watch::Sender<SessionUpdate>>,
    wake: Arc<Notify>,
    cancellation_token: CancellationToken,
) {
    let mut interval = tokio::time::interval(interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    // The first tick completes immediately
    let mut first_check = true;

    loop {
        tokio::select! {
            biased;

            () = cancellation_token.cancelled() => {
                return;
            }

            () = wake.notified() => {
                tracing::debug!("Woken up, refreshing the session");
            }

            _ = interval.tick() => {}
        }

        let trigger = !std::mem::take(&mut first_check);
        let session = updates.borrow().session.clone();
        let Some(result) = cancellation_token
            .run_until_cancelled(refresher.ensure_fresh(session, trigger))
            .await
        else {
            return;
        };

        match result {
            Ok(session) => {
                let view = session.view(refresher.client_id());
                let force_reauth = should_force_reauth(Some(&view), refresher.now());
                updates.send_replace(SessionUpdate {
                    session,
                    force_reauth,
                });

                if force_reauth {
                    tracing::info!("Session can't be refreshed anymore, stopping");
                    return;
                }
            }

            Err(err) => {
                tracing::error!(
                    error = &err as &dyn std::error::Error,
                    "Failed to refresh the session, stopping"
                );
                updates.send_modify(|update| update.force_reauth = true);
                return;
            }
        }
    }
}
