// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

/// Timeout and retry policy of a forwarded call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardPolicy {
    /// How many more attempts are made after a network failure
    pub retry_count: u32,

    /// Bound on each attempt, until the response headers are received
    pub timeout: Duration,

    /// Pause between two attempts
    pub retry_delay: Duration,
}

impl Default for ForwardPolicy {
    fn default() -> Self {
        Self {
            retry_count: 0,
            timeout: Duration::from_millis(5000),
            retry_delay: Duration::from_millis(250),
        }
    }
}

impl ForwardPolicy {
    #[must_use]
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

/// How the body of a successful backend response is passed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    /// Parsed and re-serialized. A body which doesn't parse is dropped.
    #[default]
    Json,

    /// Passed through as bytes, along with its content type
    Blob,

    /// Passed through as text
    Plain,

    /// Dropped, only the status is kept
    None,
}

/// How the body of a successful backend response is decoded by
/// [`Gateway::fetch_raw`](crate::Gateway::fetch_raw)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawKind {
    #[default]
    Json,
    Yaml,
}

/// What the caller adds to a forwarded request
#[derive(Debug, Clone, Default)]
pub struct ForwardOptions {
    /// Extra headers. `Authorization` and `Accept-Language` are always
    /// overridden.
    pub headers: HeaderMap,

    pub body: Option<Bytes>,

    pub response_kind: ResponseKind,
}

impl ForwardOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Send the given bytes as a JSON body
    #[must_use]
    pub fn with_json_body(mut self, body: impl Into<Bytes>) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_response_kind(mut self, response_kind: ResponseKind) -> Self {
        self.response_kind = response_kind;
        self
    }
}
