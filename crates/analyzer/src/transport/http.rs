// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the analyzer API.
//!
//! Every handler answers 200: upstream failures surface as an empty or
//! shorter result list, never as an error status.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

pub const SERVICE_NAME: &str = "eCFR Analyzer";

// -- Response types -----------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub agency_sizes: &'static str,
    pub health: &'static str,
    pub update: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub message: &'static str,
    pub agencies_analyzed: usize,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /`: service description.
pub async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: "eCFR Regulation Analyzer API",
        status: "running",
        endpoints: Endpoints {
            agency_sizes: "/api/v1/agencies/size",
            health: "/api/v1/health",
            update: "/api/v1/update",
        },
    })
}

/// `GET /api/v1/health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "healthy", service: SERVICE_NAME })
}

/// `GET /api/v1/agencies/size`: cached sizes, computed on first use.
pub async fn agency_sizes(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    let results = s.cached_or_refresh().await;
    Json(results.to_vec())
}

/// `GET /api/v1/update`: rerun the analysis now.
pub async fn update(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    let results = s.refresh().await;
    tracing::info!(agencies_analyzed = results.len(), "manual update complete");
    Json(UpdateResponse {
        message: "Data updated successfully",
        agencies_analyzed: results.len(),
    })
}
