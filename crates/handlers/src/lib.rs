// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

#![deny(clippy::future_not_send)]
#![allow(clippy::module_name_repetitions)]

use axum::{
    Router,
    routing::{get, post, put},
};

mod auth;
mod health;
mod resources;
mod state;
#[cfg(test)]
mod test_utils;

pub use self::state::{AppState, SiteConfig, StateError};

/// Implement `From<$error>` for a route error, boxing it in its `Internal`
/// variant
#[macro_export]
macro_rules! impl_from_error_for_route {
    ($route_error:ty : $error:ty) => {
        impl From<$error> for $route_error {
            fn from(e: $error) -> Self {
                Self::Internal(Box::new(e))
            }
        }
    };
    ($error:ty) => {
        impl_from_error_for_route!(self::RouteError: $error);
    };
}

/// All the routes of the portal
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(self::health::get))
        .route("/api/auth/signin", get(self::auth::signin::get))
        .route("/api/auth/callback", get(self::auth::callback::get))
        .route("/api/auth/session", get(self::auth::session::get))
        .route("/api/auth/logout", get(self::auth::logout::get))
        .route(
            "/api/projects",
            get(self::resources::list_projects).post(self::resources::create_project),
        )
        .route("/api/projects/request", post(self::resources::request_project))
        .route(
            "/api/projects/request/{id}",
            put(self::resources::update_request),
        )
        .route("/api/forms", get(self::resources::available_forms))
        .with_state(state)
}
