// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use axum::response::IntoResponse;

pub(crate) async fn get() -> impl IntoResponse {
    "ok"
}
