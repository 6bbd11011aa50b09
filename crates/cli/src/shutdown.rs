// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::time::Duration;

use tokio::signal::unix::{Signal, SignalKind};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

/// Drives the graceful shutdown of the server.
///
/// The first SIGTERM or SIGINT cancels the soft shutdown token: the server
/// stops accepting connections and finishes in-flight requests. A second
/// signal, or the timeout, cancels the hard shutdown token.
pub struct ShutdownManager {
    hard_shutdown_token: CancellationToken,
    soft_shutdown_token: CancellationToken,
    task_tracker: TaskTracker,
    sigterm: Signal,
    sigint: Signal,
    timeout: Duration,
}

impl ShutdownManager {
    /// Install the signal handlers
    ///
    /// # Errors
    ///
    /// Returns an error if the signal handlers could not be installed
    pub fn new() -> Result<Self, std::io::Error> {
        let hard_shutdown_token = CancellationToken::new();
        let soft_shutdown_token = hard_shutdown_token.child_token();

        Ok(Self {
            hard_shutdown_token,
            soft_shutdown_token,
            task_tracker: TaskTracker::new(),
            sigterm: tokio::signal::unix::signal(SignalKind::terminate())?,
            sigint: tokio::signal::unix::signal(SignalKind::interrupt())?,
            timeout: Duration::from_secs(30),
        })
    }

    #[must_use]
    pub fn task_tracker(&self) -> &TaskTracker {
        &self.task_tracker
    }

    #[must_use]
    pub fn hard_shutdown_token(&self) -> CancellationToken {
        self.hard_shutdown_token.clone()
    }

    #[must_use]
    pub fn soft_shutdown_token(&self) -> CancellationToken {
        self.soft_shutdown_token.clone()
    }

    /// Wait for a shutdown signal, then for the tracked tasks to finish
    pub async fn run(mut self) {
        tokio::select! {
            _ = self.sigterm.recv() => {
                tracing::info!("Shutdown signal received (SIGTERM), shutting down");
            },
            _ = self.sigint.recv() => {
                tracing::info!("Shutdown signal received (SIGINT), shutting down");
            },
        };

        self.soft_shutdown_token.cancel();
        self.task_tracker.close();

        tokio::select! {
            _ = self.sigterm.recv() => {
                tracing::warn!("Second shutdown signal received (SIGTERM), abort");
            },
            _ = self.sigint.recv() => {
                tracing::warn!("Second shutdown signal received (SIGINT), abort");
            },
            () = tokio::time::sleep(self.timeout) => {
                tracing::warn!("Shutdown timeout reached, abort");
            },
            () = self.task_tracker.wait() => {},
        }

        self.hard_shutdown_token.cancel();
        self.task_tracker.wait().await;

        tracing::info!("All tasks are done, exiting");
    }
}
