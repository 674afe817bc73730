//! HTTP API handlers for the dashboard wizard.
//!
//! This module provides the endpoints the browser calls, all under `/api`:
//! - POST /api/auth - Sign in with a personal access token
//! - POST /api/search - Search for dashboards
//! - POST /api/getDashboard - Fetch a dashboard as a PNG data URI

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod search;

use axum::Router;

use crate::AppState;

/// Create the API router with all endpoints mounted.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(search::router())
        .merge(dashboard::router())
}
