// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use crate::analysis::{AgencySize, Analyzer};
use crate::cache::AnalysisCache;
use crate::config::AnalyzerConfig;

/// Shared service state.
pub struct AppState {
    pub analyzer: Analyzer,
    pub cache: AnalysisCache,
}

impl AppState {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { analyzer: Analyzer::from_config(&config), cache: AnalysisCache::new() }
    }

    /// Run the pipeline and publish its result.
    pub async fn refresh(&self) -> Arc<[AgencySize]> {
        self.analyzer.analyze(&self.cache).await
    }

    /// Cached result, running the pipeline first if nothing is cached yet.
    pub async fn cached_or_refresh(&self) -> Arc<[AgencySize]> {
        match self.cache.get().await {
            Some(results) => results,
            None => {
                tracing::info!("cache empty, running analysis");
                self.refresh().await
            }
        }
    }
}
