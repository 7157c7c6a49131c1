// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::analysis::AgencySize;

/// Process-wide slot holding the latest analysis result.
///
/// The slot starts empty and is only ever replaced with a complete, sorted
/// list. Readers clone the `Arc`, so a concurrent refresh never exposes a
/// partially built list.
#[derive(Default)]
pub struct AnalysisCache {
    slot: RwLock<Option<Arc<[AgencySize]>>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current result, or `None` before the first run completes.
    pub async fn get(&self) -> Option<Arc<[AgencySize]>> {
        self.slot.read().await.clone()
    }

    /// Publish a new result, replacing the previous one wholesale.
    pub async fn replace(&self, results: Vec<AgencySize>) -> Arc<[AgencySize]> {
        let results: Arc<[AgencySize]> = results.into();
        *self.slot.write().await = Some(Arc::clone(&results));
        results
    }
}
