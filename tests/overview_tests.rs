// Report overview tests: Apdex, Web Vitals ratings, headline numbers

mod common;

use common::*;
use loadboard::models::{AggregateSnapshot, MetricRegistry, SummaryStat, WebVital};
use loadboard::overview::{
    ApdexRating, DEFAULT_TEST_NAME, VitalRating, apdex, build_overview, rate_vital,
};

fn latency_aggregate(key: &str, count: u64, p50: f64, p75: f64, p95: f64) -> AggregateSnapshot {
    let mut agg = AggregateSnapshot::default();
    agg.summaries.insert(
        key.to_string(),
        SummaryStat {
            count,
            mean: Some(p50),
            p50: Some(p50),
            p75: Some(p75),
            p95: Some(p95),
            ..SummaryStat::default()
        },
    );
    agg
}

#[test]
fn test_apdex_all_satisfied() {
    let agg = latency_aggregate("custom.http_latency", 100, 200.0, 400.0, 900.0);
    let registry = MetricRegistry::classify(&agg);
    let score = apdex(&registry, &agg).unwrap();
    assert_eq!(score.source, "http_latency");
    assert_eq!(score.score, 1.0);
    assert_eq!(score.rating, ApdexRating::Excellent);
}

#[test]
fn test_apdex_mixed_buckets() {
    // p50 satisfied (50), p75 tolerating (25 / 2), p95 frustrated
    let agg = latency_aggregate("custom.page_load_time", 10, 1000.0, 3000.0, 9000.0);
    let registry = MetricRegistry::classify(&agg);
    let score = apdex(&registry, &agg).unwrap();
    assert_eq!(score.source, "page_load_time");
    assert_eq!(score.score, 0.625);
    assert_eq!(score.rating, ApdexRating::Poor);
}

#[test]
fn test_apdex_skips_sources_without_samples() {
    let mut agg = latency_aggregate("custom.http_latency", 0, 9000.0, 9000.0, 9000.0);
    agg.summaries.insert(
        "browser.page.FCP.https://a.example/".to_string(),
        SummaryStat {
            count: 5,
            p50: Some(1200.0),
            p75: Some(1400.0),
            p95: Some(2000.0),
            ..SummaryStat::default()
        },
    );
    let registry = MetricRegistry::classify(&agg);
    let score = apdex(&registry, &agg).unwrap();
    assert_eq!(score.source, "FCP");
    assert_eq!(score.score, 0.875);
    assert_eq!(score.rating, ApdexRating::Good);
}

#[test]
fn test_apdex_none_without_latency_metrics() {
    let agg = AggregateSnapshot::default();
    assert!(apdex(&MetricRegistry::classify(&agg), &agg).is_none());
}

#[test]
fn test_vital_ratings() {
    assert_eq!(rate_vital(WebVital::Lcp, 2500.0), VitalRating::Good);
    assert_eq!(rate_vital(WebVital::Lcp, 3000.0), VitalRating::NeedsImprovement);
    assert_eq!(rate_vital(WebVital::Lcp, 4001.0), VitalRating::Poor);
    assert_eq!(rate_vital(WebVital::Cls, 0.05), VitalRating::Good);
    assert_eq!(rate_vital(WebVital::Cls, 0.3), VitalRating::Poor);
    assert_eq!(
        serde_json::to_string(&VitalRating::NeedsImprovement).unwrap(),
        "\"needs-improvement\""
    );
}

#[test]
fn test_overview_of_full_run() {
    let doc = three_level_document();
    let registry = MetricRegistry::classify(&doc.aggregate);
    let overview = build_overview(&registry, &doc.aggregate, doc.intermediate.len());
    assert_eq!(overview.test_name, "Checkout flow");
    assert_eq!(overview.target_url, "https://shop.example.com");
    assert_eq!(overview.start_time, Some(T0));
    assert_eq!(overview.duration_sec, 110.0);
    assert_eq!(overview.period_count, 12);
    assert_eq!(overview.scenario_count, 1);
    assert_eq!(overview.vusers_created, 56);
    assert_eq!(overview.vusers_completed, 56);
    assert_eq!(overview.http_requests, 280);
    assert_eq!(overview.success_rate, Some(100.0));
    assert_eq!(overview.vitals.len(), 1);
    assert_eq!(overview.vitals[0].vital, WebVital::Fcp);
    assert_eq!(overview.vitals[0].p75, 480.0);
    assert_eq!(overview.vitals[0].rating, VitalRating::Good);
    assert_eq!(overview.apdex.as_ref().map(|a| a.source), Some("FCP"));
}

#[test]
fn test_overview_defaults() {
    let agg = AggregateSnapshot::default();
    let overview = build_overview(&MetricRegistry::classify(&agg), &agg, 0);
    assert_eq!(overview.test_name, DEFAULT_TEST_NAME);
    assert_eq!(overview.target_url, "N/A");
    assert_eq!(overview.duration_sec, 0.0);
    assert_eq!(overview.success_rate, None);
    assert!(overview.apdex.is_none());
    assert!(overview.vitals.is_empty());
    assert!(overview.steps.is_empty());
}

#[test]
fn test_overview_step_means() {
    let mut agg = AggregateSnapshot::default();
    agg.summaries.insert(
        "browser.step.add_to_cart".to_string(),
        SummaryStat {
            mean: Some(321.5),
            count: 7,
            ..SummaryStat::default()
        },
    );
    let overview = build_overview(&MetricRegistry::classify(&agg), &agg, 1);
    assert_eq!(overview.steps.len(), 1);
    assert_eq!(overview.steps[0].name, "add_to_cart");
    assert_eq!(overview.steps[0].mean_ms, 321.5);
}
