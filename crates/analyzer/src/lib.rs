// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! eCFR analyzer: measures per-agency regulation metadata and serves the
//! sorted sizes over HTTP.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod error;
pub mod size;
pub mod state;
pub mod test_support;
pub mod transport;
pub mod upstream;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::AnalyzerConfig;
use crate::state::AppState;
use crate::transport::build_router;

/// Run the analyzer service until Ctrl-C or SIGTERM.
pub async fn run(config: AnalyzerConfig) -> anyhow::Result<()> {
    config.validate()?;
    let addr = config.bind_addr();
    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    let state = Arc::new(AppState::new(config));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("ecfr-analyzer bound to {addr}");

    serve(listener, state, shutdown).await
}

/// Warm the cache, then serve HTTP on `listener` until `shutdown` fires.
///
/// Connections are not accepted until the initial analysis finishes.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    tracing::info!("Running initial analysis...");
    tokio::select! {
        _ = shutdown.cancelled() => {
            tracing::info!("shutdown requested during initial analysis");
            return Ok(());
        }
        results = state.refresh() => {
            tracing::info!(agencies_analyzed = results.len(), "Initial analysis complete");
        }
    }

    let router = build_router(state);
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;
    tracing::info!("ecfr-analyzer stopped");
    Ok(())
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut term) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = term.recv() => {}
                    }
                }
                Err(e) => {
                    tracing::warn!(err = %e, "failed to install SIGTERM handler");
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
        tracing::info!("shutdown signal received");
        shutdown.cancel();
    });
}
