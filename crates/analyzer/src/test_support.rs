// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: a scripted registry server and state builders.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde_json::Value;

use crate::config::AnalyzerConfig;
use crate::state::AppState;

/// Canned reply for one registry route.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl MockReply {
    pub fn json(body: Value) -> Self {
        Self { status: 200, body: body.to_string(), delay: Duration::ZERO }
    }

    pub fn status(status: u16) -> Self {
        Self { status, body: "{}".to_owned(), delay: Duration::ZERO }
    }

    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into(), delay: Duration::ZERO }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Builder for a scripted registry API served under `/api`.
#[derive(Debug, Clone)]
pub struct MockRegistry {
    agencies: MockReply,
    titles: HashMap<String, MockReply>,
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRegistry {
    pub fn new() -> Self {
        Self { agencies: MockReply::json(serde_json::json!({ "agencies": [] })), titles: HashMap::new() }
    }

    /// Serve `{"agencies": [...]}` built from `(name, slug)` pairs.
    pub fn with_agencies(mut self, agencies: &[(&str, &str)]) -> Self {
        let list: Vec<Value> = agencies
            .iter()
            .map(|(name, slug)| serde_json::json!({ "name": name, "slug": slug }))
            .collect();
        self.agencies = MockReply::json(serde_json::json!({ "agencies": list }));
        self
    }

    pub fn with_agencies_reply(mut self, reply: MockReply) -> Self {
        self.agencies = reply;
        self
    }

    /// Titles reply for `slug`. Unscripted slugs get a 404.
    pub fn with_titles(mut self, slug: &str, reply: MockReply) -> Self {
        self.titles.insert(slug.to_owned(), reply);
        self
    }

    /// Bind to a random local port and serve until the runtime shuts down.
    pub async fn spawn(self) -> anyhow::Result<MockRegistryHandle> {
        let shared = Arc::new(MockShared {
            registry: self,
            agency_calls: AtomicUsize::new(0),
            titles_log: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/api/admin/v1/agencies.json", get(mock_agencies))
            .route("/api/versioner/v1/titles.json", get(mock_titles))
            .with_state(Arc::clone(&shared));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(MockRegistryHandle { addr, shared })
    }
}

struct MockShared {
    registry: MockRegistry,
    agency_calls: AtomicUsize,
    titles_log: Mutex<Vec<(String, Instant)>>,
}

/// Running mock registry with request counters.
#[derive(Clone)]
pub struct MockRegistryHandle {
    pub addr: SocketAddr,
    shared: Arc<MockShared>,
}

impl MockRegistryHandle {
    /// Base URL to hand to the registry client.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn agency_calls(&self) -> usize {
        self.shared.agency_calls.load(Ordering::Relaxed)
    }

    /// Slugs requested from the titles endpoint, in arrival order.
    pub fn titles_requests(&self) -> Vec<String> {
        self.titles_log().into_iter().map(|(slug, _)| slug).collect()
    }

    /// Slugs with their arrival instants.
    pub fn titles_log(&self) -> Vec<(String, Instant)> {
        match self.shared.titles_log.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Config pointing at this registry with no throttle delay.
    pub fn config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            host: "127.0.0.1".to_owned(),
            port: 0,
            base_url: self.base_url(),
            request_timeout_secs: 5,
            throttle_ms: 0,
            ..AnalyzerConfig::default()
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::new(AppState::new(self.config()))
    }
}

async fn reply(r: &MockReply) -> (StatusCode, [(&'static str, &'static str); 1], String) {
    if !r.delay.is_zero() {
        tokio::time::sleep(r.delay).await;
    }
    let status = StatusCode::from_u16(r.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [("content-type", "application/json")], r.body.clone())
}

async fn mock_agencies(
    State(s): State<Arc<MockShared>>,
) -> (StatusCode, [(&'static str, &'static str); 1], String) {
    s.agency_calls.fetch_add(1, Ordering::Relaxed);
    reply(&s.registry.agencies).await
}

async fn mock_titles(
    State(s): State<Arc<MockShared>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, [(&'static str, &'static str); 1], String) {
    let slug = params.get("agency").cloned().unwrap_or_default();
    if let Ok(mut log) = s.titles_log.lock() {
        log.push((slug.clone(), Instant::now()));
    }
    match s.registry.titles.get(&slug) {
        Some(r) => reply(r).await,
        None => reply(&MockReply::status(404)).await,
    }
}

/// State pointing at an address nothing listens on.
pub fn unreachable_state() -> Arc<AppState> {
    let config = AnalyzerConfig {
        base_url: "http://127.0.0.1:9/api".to_owned(),
        request_timeout_secs: 2,
        throttle_ms: 0,
        ..AnalyzerConfig::default()
    };
    Arc::new(AppState::new(config))
}
