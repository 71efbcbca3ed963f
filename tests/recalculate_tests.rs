// Aggregate recalculation and phase statistics tests

mod common;

use common::*;
use loadboard::aggregation::{phase_statistics, recalculate_aggregate};
use loadboard::config::PhaseConfig;
use loadboard::models::Snapshot;
use loadboard::phases::heuristic::phases_from_snapshots;

const LATENCY: &str = "custom.http_latency";

fn latency_series(means: &[f64]) -> Vec<Snapshot> {
    means
        .iter()
        .enumerate()
        .map(|(i, m)| {
            with_summary(
                snapshot(T0 + i as i64 * PERIOD_MS, &[]),
                LATENCY,
                m / 2.0,
                m * 2.0,
                *m,
            )
        })
        .collect()
}

#[test]
fn test_counters_are_summed() {
    let snapshots = vec![
        snapshot(T0, &[("browser.http_requests", 10), ("errors.ETIMEDOUT", 1)]),
        snapshot(T0 + PERIOD_MS, &[("browser.http_requests", 15)]),
        snapshot(T0 + 2 * PERIOD_MS, &[("browser.http_requests", 5)]),
    ];
    let subset: Vec<&Snapshot> = snapshots.iter().collect();
    let agg = recalculate_aggregate(&subset, None);
    assert_eq!(agg.counter("browser.http_requests"), 30);
    assert_eq!(agg.counter("errors.ETIMEDOUT"), 1);
    assert_eq!(agg.first_metric_at, Some(T0));
    assert_eq!(agg.last_metric_at, Some(T0 + 2 * PERIOD_MS));
    // no VUser keys in, none out
    assert!(!agg.counters.contains_key("vusers.completed"));
}

#[test]
fn test_counter_sum_is_additive_over_split() {
    let doc = three_level_document();
    let all: Vec<&Snapshot> = doc.intermediate.iter().collect();
    let (left, right) = all.split_at(5);
    let whole = recalculate_aggregate(&all, None);
    let a = recalculate_aggregate(left, None);
    let b = recalculate_aggregate(right, None);
    for key in ["vusers.created", "browser.http_requests"] {
        assert_eq!(whole.counter(key), a.counter(key) + b.counter(key), "{key}");
    }
}

#[test]
fn test_fully_successful_run_forces_subset_success() {
    // VUsers spanning periods make the subset's own completions look odd
    let snapshots = vec![
        snapshot(T0, &[("vusers.created", 10), ("vusers.completed", 4)]),
        snapshot(T0 + PERIOD_MS, &[("vusers.created", 10), ("vusers.completed", 14)]),
        snapshot(T0 + 2 * PERIOD_MS, &[("vusers.created", 10), ("vusers.completed", 15)]),
    ];
    let subset: Vec<&Snapshot> = snapshots.iter().collect();
    let reference = vusers_aggregate(100, 100, 0);
    let agg = recalculate_aggregate(&subset, Some(&reference));
    assert_eq!(agg.counter("vusers.created"), 30);
    assert_eq!(agg.counter("vusers.completed"), 30);
    assert_eq!(agg.counter("vusers.failed"), 0);
}

#[test]
fn test_partial_success_applies_overall_rate() {
    let snapshots = vec![snapshot(
        T0,
        &[("vusers.created", 10), ("vusers.completed", 10), ("vusers.failed", 0)],
    )];
    let subset: Vec<&Snapshot> = snapshots.iter().collect();
    let reference = vusers_aggregate(100, 80, 20);
    let agg = recalculate_aggregate(&subset, Some(&reference));
    assert_eq!(agg.counter("vusers.completed"), 8);
    assert_eq!(agg.counter("vusers.failed"), 2);
}

#[test]
fn test_completed_never_exceeds_created() {
    let snapshots = vec![snapshot(T0, &[("vusers.created", 3)])];
    let subset: Vec<&Snapshot> = snapshots.iter().collect();
    // rounding 3 * 0.9 = 2.7 -> 3, still within created
    let reference = vusers_aggregate(10, 9, 1);
    let agg = recalculate_aggregate(&subset, Some(&reference));
    assert_eq!(agg.counter("vusers.completed"), 3);
    assert_eq!(agg.counter("vusers.failed"), 0);
}

#[test]
fn test_without_reference_completed_is_clamped() {
    let snapshots = vec![snapshot(
        T0,
        &[("vusers.created", 5), ("vusers.completed", 8), ("vusers.failed", 1)],
    )];
    let subset: Vec<&Snapshot> = snapshots.iter().collect();
    let agg = recalculate_aggregate(&subset, None);
    assert_eq!(agg.counter("vusers.completed"), 4);
    assert_eq!(agg.counter("vusers.failed"), 1);
}

#[test]
fn test_percentiles_single_period() {
    let snapshots = latency_series(&[120.0]);
    let subset: Vec<&Snapshot> = snapshots.iter().collect();
    let agg = recalculate_aggregate(&subset, None);
    let stat = &agg.summaries[LATENCY];
    assert_eq!(stat.p50, Some(120.0));
    assert_eq!(stat.p95, Some(120.0));
    assert_eq!(stat.p99, Some(120.0));
    assert_eq!(stat.count, 1);
}

#[test]
fn test_percentiles_two_periods() {
    let snapshots = latency_series(&[20.0, 10.0]);
    let subset: Vec<&Snapshot> = snapshots.iter().collect();
    let agg = recalculate_aggregate(&subset, None);
    let stat = &agg.summaries[LATENCY];
    assert_eq!(stat.p50, Some(10.0));
    assert_eq!(stat.median, Some(10.0));
    assert_eq!(stat.p95, Some(20.0));
    assert_eq!(stat.mean, Some(15.0));
}

#[test]
fn test_percentiles_twenty_periods() {
    let means: Vec<f64> = (1..=20).rev().map(|v| v as f64).collect();
    let snapshots = latency_series(&means);
    let subset: Vec<&Snapshot> = snapshots.iter().collect();
    let stat = recalculate_aggregate(&subset, None).summaries[LATENCY].clone();
    assert_eq!(stat.p50, Some(10.0));
    assert_eq!(stat.p75, Some(15.0));
    assert_eq!(stat.p90, Some(18.0));
    assert_eq!(stat.p95, Some(19.0));
    assert_eq!(stat.p99, Some(20.0));
    assert_eq!(stat.p999, Some(20.0));
    assert_eq!(stat.mean, Some(10.5));
    assert_eq!(stat.count, 20);
}

#[test]
fn test_min_max_span_all_periods() {
    let snapshots = latency_series(&[100.0, 40.0, 300.0]);
    let subset: Vec<&Snapshot> = snapshots.iter().collect();
    let stat = recalculate_aggregate(&subset, None).summaries[LATENCY].clone();
    assert_eq!(stat.min, Some(20.0));
    assert_eq!(stat.max, Some(600.0));
}

#[test]
fn test_empty_subset_is_empty_aggregate() {
    let agg = recalculate_aggregate(&[], Some(&vusers_aggregate(10, 10, 0)));
    assert!(agg.is_empty());
    assert!(agg.first_metric_at.is_none());
    assert!(agg.last_metric_at.is_none());
}

#[test]
fn test_phase_statistics_per_phase() {
    let doc = three_level_document();
    let phases =
        phases_from_snapshots(&doc.intermediate, doc.bounds().unwrap(), &PhaseConfig::default())
            .unwrap();
    let stats = phase_statistics(&phases, &doc.intermediate);
    assert_eq!(stats.len(), 3);

    assert_eq!(stats[0].id, "phase-0");
    assert_eq!(stats[0].periods, 4);
    assert_eq!(stats[0].vusers_created, 8);
    assert_eq!(stats[0].http_requests, 40);
    assert_eq!(stats[0].success_rate, Some(100.0));

    assert_eq!(stats[1].vusers_created, 40);
    assert_eq!(stats[1].duration_sec, 40);

    // the final period sits on the run end, outside [start, end)
    assert_eq!(stats[2].periods, 3);
    assert_eq!(stats[2].vusers_created, 6);
}

#[test]
fn test_phase_statistics_without_vusers_has_no_rate() {
    let snapshots = vec![snapshot(T0, &[("browser.http_requests", 3)])];
    let phases = vec![loadboard::models::Phase::measured("Only", 0, T0, T0 + PERIOD_MS)];
    let stats = phase_statistics(&phases, &snapshots);
    assert_eq!(stats[0].success_rate, None);
    assert_eq!(stats[0].http_requests, 3);
}
