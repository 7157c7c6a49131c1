// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport for the analyzer API.

pub mod http;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the axum `Router` with all analyzer routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(http::root))
        .route("/api/v1/health", get(http::health))
        // Cached analysis
        .route("/api/v1/agencies/size", get(http::agency_sizes))
        .route("/api/v1/update", get(http::update))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
