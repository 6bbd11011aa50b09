// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::OnceCell;

/// How long the result of a refresh is kept around after it started
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::seconds(30);

struct Entry<T> {
    cell: Arc<OnceCell<T>>,
    started_at: DateTime<Utc>,
}

impl<T> Entry<T> {
    /// An entry can go once the grace period is over and nobody is waiting
    /// on it anymore.
    fn is_stale(&self, now: DateTime<Utc>, grace_period: Duration) -> bool {
        now - self.started_at >= grace_period && Arc::strong_count(&self.cell) == 1
    }
}

/// Serializes refreshes of the same session generation.
///
/// The provider rotates refresh tokens: once one is redeemed, redeeming it a
/// second time fails. Concurrent callers refreshing the same token wait for
/// the first one to finish and get its result. Callers arriving shortly after,
/// still holding the old token, also get that result for the duration of the
/// grace period.
///
/// Keys are opaque to the latch. They are hashed so that the tokens they are
/// built from are not kept in memory longer than necessary.
pub struct RefreshLatch<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
    grace_period: Duration,
}

impl<T> Default for RefreshLatch<T> {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_PERIOD)
    }
}

impl<T> RefreshLatch<T> {
    #[must_use]
    pub fn new(grace_period: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            grace_period,
        }
    }

    /// Number of refreshes currently tracked
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> RefreshLatch<T> {
    /// Run `refresh` for the given key, unless another caller already did or
    /// is doing it, in which case its result is returned.
    ///
    /// If the caller running `refresh` gets cancelled, the next one waiting
    /// takes over.
    pub async fn run<F, Fut>(&self, key: &str, now: DateTime<Utc>, refresh: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let key = Base64UrlUnpadded::encode_string(&Sha256::digest(key.as_bytes()));

        let cell = {
            let mut entries = self
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            entries.retain(|_, entry| !entry.is_stale(now, self.grace_period));

            let entry = entries.entry(key).or_insert_with(|| Entry {
                cell: Arc::new(OnceCell::new()),
                started_at: now,
            });

            if entry.cell.initialized() {
                tracing::debug!("Reusing the result of a recent refresh");
            }

            entry.cell.clone()
        };

        cell.get_or_init(refresh).await.clone()
    }
}
