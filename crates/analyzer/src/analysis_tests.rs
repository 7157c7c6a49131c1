// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::{Duration, Instant};

use serde_json::json;

use super::*;
use crate::test_support::{MockRegistry, MockRegistryHandle, MockReply};

fn agency(name: &str, slug: &str) -> Agency {
    Agency { name: name.to_owned(), slug: slug.to_owned() }
}

fn row(name: &str, size: f64) -> AgencySize {
    AgencySize {
        agency_name: name.to_owned(),
        agency_slug: name.to_lowercase(),
        regulation_size_mb: size,
        last_updated: LAST_UPDATED_UNKNOWN.to_owned(),
    }
}

fn analyzer_for(registry: &MockRegistryHandle, throttle: Duration) -> Analyzer {
    let mut config = registry.config();
    config.throttle_ms = throttle.as_millis() as u64;
    Analyzer::from_config(&config)
}

/// `{"d": "<n x's>"}` where `n + 9` bytes is exactly `mib` MiB.
fn sized_titles(mib: f64) -> serde_json::Value {
    let n = (mib * 1024.0 * 1024.0) as usize - 9;
    json!({ "d": "x".repeat(n) })
}

// ── measure_agency ────────────────────────────────────────────────────

#[test]
fn measure_extracts_last_updated() -> anyhow::Result<()> {
    let titles = json!({ "data": "x", "last_updated": "2023-01-01" });
    let entry = measure_agency(&agency("A", "a"), &titles)?;
    assert_eq!(
        entry,
        Some(AgencySize {
            agency_name: "A".to_owned(),
            agency_slug: "a".to_owned(),
            regulation_size_mb: 0.0,
            last_updated: "2023-01-01".to_owned(),
        })
    );
    Ok(())
}

#[yare::parameterized(
    missing    = { json!({ "titles": [] }) },
    null       = { json!({ "last_updated": null }) },
    not_string = { json!({ "last_updated": 20230101 }) },
)]
fn measure_defaults_last_updated(titles: serde_json::Value) {
    let entry = measure_agency(&agency("A", "a"), &titles).ok().flatten();
    assert_eq!(entry.map(|e| e.last_updated), Some("N/A".to_owned()));
}

#[test]
fn measure_skips_empty_titles() -> anyhow::Result<()> {
    assert_eq!(measure_agency(&agency("B", "b"), &json!({}))?, None);
    assert_eq!(measure_agency(&agency("B", "b"), &json!([]))?, None);
    Ok(())
}

#[test]
fn measure_rejects_non_object_titles() {
    let err = measure_agency(&agency("C", "c"), &json!([1, 2, 3])).err();
    assert_eq!(
        err,
        Some(AnalysisError::UnexpectedTitlesShape { slug: "c".to_owned(), found: "array" })
    );
}

// ── sort_by_size_desc ─────────────────────────────────────────────────

#[test]
fn sort_is_descending_and_stable() {
    let mut rows = vec![row("A", 0.5), row("B", 2.0), row("C", 0.5), row("D", 1.25)];
    sort_by_size_desc(&mut rows);
    let names: Vec<&str> = rows.iter().map(|r| r.agency_name.as_str()).collect();
    assert_eq!(names, vec!["B", "D", "A", "C"]);

    let once = rows.clone();
    sort_by_size_desc(&mut rows);
    assert_eq!(rows, once);
}

// ── Analyzer ──────────────────────────────────────────────────────────

#[tokio::test]
async fn excludes_agencies_without_titles() -> anyhow::Result<()> {
    let registry = MockRegistry::new()
        .with_agencies(&[("A", "a"), ("B", "b")])
        .with_titles("a", MockReply::json(json!({ "data": "x", "last_updated": "2023-01-01" })))
        .with_titles("b", MockReply::json(json!({})))
        .spawn()
        .await?;
    let cache = AnalysisCache::new();

    let results = analyzer_for(&registry, Duration::ZERO).analyze(&cache).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].agency_name, "A");
    assert_eq!(results[0].regulation_size_mb, 0.0);
    assert_eq!(results[0].last_updated, "2023-01-01");
    assert_eq!(cache.get().await.as_deref(), Some(&results[..]));
    Ok(())
}

#[tokio::test]
async fn results_sorted_largest_first() -> anyhow::Result<()> {
    let registry = MockRegistry::new()
        .with_agencies(&[("Small", "small"), ("Large", "large"), ("Medium", "medium")])
        .with_titles("small", MockReply::json(sized_titles(0.25)))
        .with_titles("large", MockReply::json(sized_titles(1.5)))
        .with_titles("medium", MockReply::json(sized_titles(0.75)))
        .spawn()
        .await?;

    let results = analyzer_for(&registry, Duration::ZERO).collect().await;

    let sizes: Vec<f64> = results.iter().map(|r| r.regulation_size_mb).collect();
    assert_eq!(sizes, vec![1.5, 0.75, 0.25]);
    Ok(())
}

#[tokio::test]
async fn only_first_ten_agencies_are_fetched() -> anyhow::Result<()> {
    let names: Vec<String> = (0..14).map(|i| format!("agency-{i:02}")).collect();
    let pairs: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), n.as_str())).collect();
    let mut mock = MockRegistry::new().with_agencies(&pairs);
    for n in &names {
        mock = mock.with_titles(n, MockReply::json(json!({ "last_updated": n })));
    }
    let registry = mock.spawn().await?;

    let results = analyzer_for(&registry, Duration::ZERO).collect().await;

    assert_eq!(results.len(), 10);
    assert_eq!(registry.titles_requests(), names[..10].to_vec());
    Ok(())
}

#[tokio::test]
async fn malformed_entry_past_the_limit_is_ignored() -> anyhow::Result<()> {
    let mut entries = vec![json!({ "name": "A", "slug": "a" })];
    entries.extend((1..10).map(|i| json!({ "name": format!("Filler {i}"), "slug": format!("f{i}") })));
    entries.push(json!({ "name": "Tail", "slug": 42 }));
    let registry = MockRegistry::new()
        .with_agencies_reply(MockReply::json(json!({ "agencies": entries })))
        .with_titles("a", MockReply::json(json!({ "data": "x" })))
        .spawn()
        .await?;

    let results = analyzer_for(&registry, Duration::ZERO).collect().await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].agency_slug, "a");
    assert_eq!(registry.titles_requests().len(), 10);
    assert!(!registry.titles_requests().contains(&"42".to_owned()));
    Ok(())
}

#[tokio::test]
async fn malformed_entries_inside_the_limit_are_skipped_individually() -> anyhow::Result<()> {
    let registry = MockRegistry::new()
        .with_agencies_reply(MockReply::json(json!({ "agencies": [
            { "name": "A", "slug": "a" },
            null,
            ["not", "an", "agency"],
            { "name": "Numbered", "slug": 42 },
        ] })))
        .with_titles("a", MockReply::json(json!({ "data": "x" })))
        .with_titles("42", MockReply::json(json!({ "data": "y" })))
        .spawn()
        .await?;

    let results = analyzer_for(&registry, Duration::ZERO).collect().await;

    assert_eq!(registry.titles_requests(), vec!["a", "42"]);
    let slugs: Vec<&str> = results.iter().map(|r| r.agency_slug.as_str()).collect();
    assert_eq!(slugs, vec!["a", "42"]);
    Ok(())
}

#[tokio::test]
async fn duplicate_agencies_are_not_deduplicated() -> anyhow::Result<()> {
    let registry = MockRegistry::new()
        .with_agencies(&[("Dup", "dup"), ("Dup", "dup")])
        .with_titles("dup", MockReply::json(json!({ "x": 1 })))
        .spawn()
        .await?;

    let results = analyzer_for(&registry, Duration::ZERO).collect().await;

    assert_eq!(registry.titles_requests(), vec!["dup", "dup"]);
    assert_eq!(results.len(), 2);
    Ok(())
}

#[tokio::test]
async fn empty_agency_list_caches_empty_result() -> anyhow::Result<()> {
    let registry = MockRegistry::new().spawn().await?;
    let cache = AnalysisCache::new();
    assert!(cache.get().await.is_none());

    let results = analyzer_for(&registry, Duration::ZERO).analyze(&cache).await;

    assert!(results.is_empty());
    assert_eq!(cache.get().await.map(|r| r.len()), Some(0));
    assert!(registry.titles_requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn upstream_down_yields_empty_result() {
    let client = RegistryClient::new("http://127.0.0.1:9/api", Duration::from_secs(2));
    let analyzer = Analyzer::new(client, 10, Duration::ZERO);
    assert!(analyzer.collect().await.is_empty());
}

#[tokio::test]
async fn failing_agency_is_skipped() -> anyhow::Result<()> {
    let registry = MockRegistry::new()
        .with_agencies(&[("Bad", "bad"), ("Down", "down"), ("Good", "good")])
        .with_titles("bad", MockReply::json(json!(["not", "an", "object"])))
        .with_titles("down", MockReply::status(500))
        .with_titles("good", MockReply::json(json!({ "last_updated": "2024-05-05" })))
        .spawn()
        .await?;

    let results = analyzer_for(&registry, Duration::ZERO).collect().await;

    assert_eq!(registry.titles_requests(), vec!["bad", "down", "good"]);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].agency_slug, "good");
    Ok(())
}

#[tokio::test]
async fn throttle_spaces_consecutive_agencies() -> anyhow::Result<()> {
    let throttle = Duration::from_millis(150);
    let registry = MockRegistry::new()
        .with_agencies(&[("A", "a"), ("B", "b"), ("C", "c")])
        .with_titles("a", MockReply::json(json!({ "x": 1 })))
        // Empty titles still incur the pause.
        .with_titles("b", MockReply::json(json!({})))
        .with_titles("c", MockReply::json(json!({ "x": 3 })))
        .spawn()
        .await?;

    analyzer_for(&registry, throttle).collect().await;

    let log = registry.titles_log();
    assert_eq!(log.len(), 3);
    for pair in log.windows(2) {
        assert!(pair[1].1.duration_since(pair[0].1) >= throttle);
    }
    Ok(())
}

#[tokio::test]
async fn no_pause_after_last_agency() -> anyhow::Result<()> {
    let throttle = Duration::from_millis(400);
    let registry = MockRegistry::new()
        .with_agencies(&[("A", "a")])
        .with_titles("a", MockReply::json(json!({ "x": 1 })))
        .spawn()
        .await?;

    let started = Instant::now();
    analyzer_for(&registry, throttle).collect().await;

    assert!(started.elapsed() < throttle);
    Ok(())
}

#[tokio::test]
async fn failed_agency_skips_its_pause() -> anyhow::Result<()> {
    let throttle = Duration::from_millis(400);
    let registry = MockRegistry::new()
        .with_agencies(&[("Bad", "bad"), ("Good", "good")])
        .with_titles("bad", MockReply::json(json!("unexpected string body")))
        .with_titles("good", MockReply::json(json!({ "x": 1 })))
        .spawn()
        .await?;

    analyzer_for(&registry, throttle).collect().await;

    let log = registry.titles_log();
    assert_eq!(log.len(), 2);
    assert!(log[1].1.duration_since(log[0].1) < throttle);
    Ok(())
}

#[tokio::test]
async fn refresh_replaces_cache_wholesale() -> anyhow::Result<()> {
    let first = MockRegistry::new()
        .with_agencies(&[("A", "a"), ("B", "b")])
        .with_titles("a", MockReply::json(json!({ "x": 1 })))
        .with_titles("b", MockReply::json(json!({ "x": 2 })))
        .spawn()
        .await?;
    let second = MockRegistry::new()
        .with_agencies(&[("C", "c")])
        .with_titles("c", MockReply::json(json!({ "x": 3 })))
        .spawn()
        .await?;
    let cache = AnalysisCache::new();

    analyzer_for(&first, Duration::ZERO).analyze(&cache).await;
    assert_eq!(cache.get().await.map(|r| r.len()), Some(2));

    analyzer_for(&second, Duration::ZERO).analyze(&cache).await;
    let slugs: Option<Vec<String>> =
        cache.get().await.map(|r| r.iter().map(|e| e.agency_slug.clone()).collect());
    assert_eq!(slugs, Some(vec!["c".to_owned()]));
    Ok(())
}
