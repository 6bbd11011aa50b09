// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Private (encrypted and authenticated) cookies, holding JSON payloads.
//!
//! Payloads too large for a single cookie are split over several cookies,
//! named `{key}.0`, `{key}.1` and so on.

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use http::request::Parts;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use url::Url;

/// Browsers silently drop cookies larger than this
const MAX_COOKIE_SIZE: usize = 4096;

/// Plaintext bytes stored per cookie. Once encrypted and base64-encoded, a
/// chunk and its attributes stay under [`MAX_COOKIE_SIZE`].
const CHUNK_SIZE: usize = 2800;

/// Size of a private cookie value: nonce, ciphertext and tag, base64-encoded
const fn encoded_len(plaintext: usize) -> usize {
    (plaintext + 12 + 16).div_ceil(3) * 4
}

fn chunk_name(key: &str, index: usize) -> String {
    format!("{key}.{index}")
}

/// Split a string into parts of at most `size` bytes, on char boundaries
fn split_chunks(value: &str, size: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = value;

    while rest.len() > size {
        let mut at = size;
        while !rest.is_char_boundary(at) {
            at -= 1;
        }
        let (chunk, tail) = rest.split_at(at);
        chunks.push(chunk);
        rest = tail;
    }

    chunks.push(rest);
    chunks
}

#[derive(Debug, Error)]
#[error("could not decode cookie")]
pub enum CookieDecodeError {
    Deserialize(#[from] serde_json::Error),
}

#[derive(Clone)]
struct CookieOption {
    secure: bool,
    path: String,
}

impl CookieOption {
    fn new(public_base: &Url) -> Self {
        Self {
            secure: public_base.scheme() == "https",
            path: public_base.path().to_owned(),
        }
    }

    fn apply<'a>(&self, mut cookie: Cookie<'a>) -> Cookie<'a> {
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_path(self.path.clone());
        cookie.set_same_site(SameSite::Lax);
        cookie
    }
}

/// Builds [`CookieJar`]s sharing the same key and cookie attributes
#[derive(Clone)]
pub struct CookieManager {
    options: CookieOption,
    key: Key,
}

impl CookieManager {
    #[must_use]
    pub fn new(public_base: &Url, key: Key) -> Self {
        let options = CookieOption::new(public_base);
        Self { options, key }
    }

    /// Derive the encryption key from a secret of at least 32 bytes
    #[must_use]
    pub fn derive_from(public_base: &Url, secret: &[u8]) -> Self {
        let key = Key::derive_from(secret);
        Self::new(public_base, key)
    }

    #[must_use]
    pub fn cookie_jar(&self) -> CookieJar {
        let inner = PrivateCookieJar::new(self.key.clone());
        let options = self.options.clone();

        CookieJar { inner, options }
    }

    #[must_use]
    pub fn cookie_jar_from_headers(&self, headers: &http::HeaderMap) -> CookieJar {
        let inner = PrivateCookieJar::from_headers(headers, self.key.clone());
        let options = self.options.clone();

        CookieJar { inner, options }
    }
}

impl<S> FromRequestParts<S> for CookieJar
where
    CookieManager: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookie_manager = CookieManager::from_ref(state);
        Ok(cookie_manager.cookie_jar_from_headers(&parts.headers))
    }
}

/// A jar of private cookies. Cookies which fail to decrypt are invisible.
pub struct CookieJar {
    inner: PrivateCookieJar<Key>,
    options: CookieOption,
}

impl CookieJar {
    /// Save the given payload in a cookie, splitting it in chunks if needed.
    ///
    /// Cookies only live as long as the browser session.
    #[must_use]
    pub fn save<T: Serialize>(self, key: &str, payload: &T) -> Self {
        let serialized = match serde_json::to_string(payload) {
            Ok(serialized) => serialized,
            Err(err) => {
                tracing::error!(
                    error = &err as &dyn std::error::Error,
                    cookie = key,
                    "Failed to serialize cookie payload"
                );
                return self;
            }
        };

        // Drop what was previously stored under that key, in case it had more
        // chunks than the new payload
        let mut jar = self.remove(key);

        let encoded = encoded_len(serialized.len());
        if encoded <= MAX_COOKIE_SIZE - key.len() - 128 {
            let cookie = jar.options.apply(Cookie::new(key.to_owned(), serialized));
            jar.inner = jar.inner.add(cookie);
            return jar;
        }

        let chunks = split_chunks(&serialized, CHUNK_SIZE);
        tracing::warn!(
            cookie = key,
            encoded,
            chunks = chunks.len(),
            "Cookie payload is over 4 KiB, splitting it"
        );

        for (index, chunk) in chunks.into_iter().enumerate() {
            let cookie = jar
                .options
                .apply(Cookie::new(chunk_name(key, index), chunk.to_owned()));
            jar.inner = jar.inner.add(cookie);
        }

        jar
    }

    /// Remove a cookie, and all its chunks
    #[must_use]
    pub fn remove(mut self, key: &str) -> Self {
        if self.inner.get(key).is_some() {
            let cookie = self.options.apply(Cookie::from(key.to_owned()));
            self.inner = self.inner.remove(cookie);
        }

        let mut index = 0;
        while self.inner.get(&chunk_name(key, index)).is_some() {
            let cookie = self.options.apply(Cookie::from(chunk_name(key, index)));
            self.inner = self.inner.remove(cookie);
            index += 1;
        }

        self
    }

    /// Load and deserialize a cookie, joining its chunks back if it was split
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie payload can't be deserialized
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CookieDecodeError> {
        if let Some(cookie) = self.inner.get(key) {
            let decoded = serde_json::from_str(cookie.value())?;
            return Ok(Some(decoded));
        }

        let mut serialized = String::new();
        let mut index = 0;
        while let Some(chunk) = self.inner.get(&chunk_name(key, index)) {
            serialized.push_str(chunk.value());
            index += 1;
        }

        if index == 0 {
            return Ok(None);
        }

        let decoded = serde_json::from_str(&serialized)?;
        Ok(Some(decoded))
    }
}

impl IntoResponseParts for CookieJar {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.inner.into_response_parts(res)
    }
}
