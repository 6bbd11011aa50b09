// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use thiserror::Error;

/// A compact-serialized JWT, split on its two dots.
///
/// The signature is never checked: tokens are only ever received straight from
/// the provider's token endpoint, over TLS.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawJwt<'a> {
    inner: &'a str,
    first_dot: usize,
    second_dot: usize,
}

impl std::fmt::Debug for RawJwt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawJwt")
            .field("header", &self.header())
            .field("payload", &self.payload())
            .finish_non_exhaustive()
    }
}

impl<'a> RawJwt<'a> {
    #[must_use]
    pub fn header(&self) -> &'a str {
        &self.inner[..self.first_dot]
    }

    #[must_use]
    pub fn payload(&self) -> &'a str {
        &self.inner[self.first_dot + 1..self.second_dot]
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum JwtShapeError {
    #[error("no dots found in JWT")]
    NoDots,

    #[error("only one dot found in JWT")]
    OnlyOneDot,

    #[error("too many dots in JWT")]
    TooManyDots,
}

impl<'a> TryFrom<&'a str> for RawJwt<'a> {
    type Error = JwtShapeError;

    fn try_from(inner: &'a str) -> Result<Self, Self::Error> {
        let mut indices = inner
            .char_indices()
            .filter_map(|(idx, c)| (c == '.').then_some(idx));

        let first_dot = indices.next().ok_or(JwtShapeError::NoDots)?;
        let second_dot = indices.next().ok_or(JwtShapeError::OnlyOneDot)?;

        if indices.next().is_some() {
            return Err(JwtShapeError::TooManyDots);
        }

        Ok(Self {
            inner,
            first_dot,
            second_dot,
        })
    }
}
