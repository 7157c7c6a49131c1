// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fetch-measure-cache pipeline over the registry's agencies.
//!
//! Agencies are processed one at a time with a fixed pause between them so
//! the upstream API sees at most one request in flight per run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::AnalysisCache;
use crate::config::AnalyzerConfig;
use crate::error::{json_type_name, AnalysisError};
use crate::size;
use crate::upstream::client::{Agency, RegistryClient};

/// Placeholder when a titles document carries no `last_updated` string.
pub const LAST_UPDATED_UNKNOWN: &str = "N/A";

/// Measured size of one agency's titles metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencySize {
    pub agency_name: String,
    pub agency_slug: String,
    pub regulation_size_mb: f64,
    pub last_updated: String,
}

/// Runs the analysis pipeline against a registry.
#[derive(Clone)]
pub struct Analyzer {
    client: RegistryClient,
    agency_limit: usize,
    throttle: Duration,
}

impl Analyzer {
    pub fn new(client: RegistryClient, agency_limit: usize, throttle: Duration) -> Self {
        Self { client, agency_limit, throttle }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(RegistryClient::from_config(config), config.agency_limit, config.throttle())
    }

    /// Run the pipeline and publish the sorted result to `cache`.
    pub async fn analyze(&self, cache: &AnalysisCache) -> Arc<[AgencySize]> {
        let results = self.collect().await;
        cache.replace(results).await
    }

    /// Run the pipeline and return the result sorted by size, largest first.
    pub async fn collect(&self) -> Vec<AgencySize> {
        let started = Instant::now();
        let entries: Vec<Value> =
            self.client.list_agencies().await.into_iter().take(self.agency_limit).collect();
        tracing::info!(agency_count = entries.len(), "analyzing agencies");

        let mut results = Vec::with_capacity(entries.len());
        let last = entries.len().saturating_sub(1);

        for (i, entry) in entries.iter().enumerate() {
            let agency = match Agency::from_entry(entry) {
                Ok(agency) => agency,
                Err(e) => {
                    tracing::error!(position = i, err = %e, "error analyzing agency");
                    continue;
                }
            };
            let titles = self.client.titles_for_agency(&agency.slug).await;
            match measure_agency(&agency, &titles) {
                Ok(Some(row)) => {
                    tracing::debug!(
                        agency = %row.agency_name,
                        size_mb = row.regulation_size_mb,
                        "measured agency"
                    );
                    results.push(row);
                }
                Ok(None) => {
                    tracing::debug!(agency = %agency.name, slug = %agency.slug, "no titles data");
                }
                Err(e) => {
                    tracing::error!(agency = %agency.name, err = %e, "error analyzing agency");
                    continue;
                }
            }

            if i < last && !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }
        }

        sort_by_size_desc(&mut results);
        tracing::info!(
            analyzed = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );
        results
    }
}

/// Build the result row for one agency.
///
/// Returns `Ok(None)` when the registry had no titles data for it.
pub fn measure_agency(agency: &Agency, titles: &Value) -> Result<Option<AgencySize>, AnalysisError> {
    if size::is_empty(titles) {
        return Ok(None);
    }
    let Some(doc) = titles.as_object() else {
        return Err(AnalysisError::UnexpectedTitlesShape {
            slug: agency.slug.clone(),
            found: json_type_name(titles),
        });
    };
    let last_updated = doc
        .get("last_updated")
        .and_then(|v| v.as_str())
        .unwrap_or(LAST_UPDATED_UNKNOWN)
        .to_owned();

    Ok(Some(AgencySize {
        agency_name: agency.name.clone(),
        agency_slug: agency.slug.clone(),
        regulation_size_mb: size::calculate_size(titles),
        last_updated,
    }))
}

/// Stable sort, largest first. Ties keep collection order.
pub fn sort_by_size_desc(results: &mut [AgencySize]) {
    results.sort_by(|a, b| b.regulation_size_mb.total_cmp(&a.regulation_size_mb));
}

#[cfg(test)]
#[path = "analysis_tests.rs"]
mod tests;
