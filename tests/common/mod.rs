// Shared test helpers
#![allow(dead_code)]

use std::collections::BTreeMap;

use loadboard::models::*;

/// Run start used by most fixtures (epoch-ms).
pub const T0: i64 = 1_700_000_000_000;
/// Period length used by most fixtures.
pub const PERIOD_MS: i64 = 10_000;

pub fn snapshot(period: i64, counters: &[(&str, u64)]) -> Snapshot {
    Snapshot {
        period,
        counters: counters
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect(),
        summaries: BTreeMap::new(),
    }
}

pub fn with_summary(mut s: Snapshot, key: &str, min: f64, max: f64, mean: f64) -> Snapshot {
    s.summaries.insert(
        key.to_string(),
        SummaryStat {
            min: Some(min),
            max: Some(max),
            mean: Some(mean),
            count: 1,
            ..SummaryStat::default()
        },
    );
    s
}

/// One snapshot per period with the given `vusers.created` counts, starting at `T0`.
pub fn created_series(created: &[u64]) -> Vec<Snapshot> {
    created
        .iter()
        .enumerate()
        .map(|(i, c)| snapshot(T0 + i as i64 * PERIOD_MS, &[("vusers.created", *c)]))
        .collect()
}

pub fn vusers_aggregate(created: u64, completed: u64, failed: u64) -> AggregateSnapshot {
    let mut counters = BTreeMap::new();
    counters.insert("vusers.created".to_string(), created);
    counters.insert("vusers.completed".to_string(), completed);
    counters.insert("vusers.failed".to_string(), failed);
    AggregateSnapshot {
        counters,
        ..AggregateSnapshot::default()
    }
}

pub fn bounds_of(snapshots: &[Snapshot]) -> RunBounds {
    RunBounds {
        first_metric_at: snapshots.first().map(|s| s.period).unwrap_or(T0),
        last_metric_at: snapshots.last().map(|s| s.period).unwrap_or(T0),
    }
}

/// 12 periods in three load levels (2, 10, 2 created per period): the creation
/// heuristic splits this into three phases at periods 4 and 8.
pub fn three_level_document() -> ResultsDocument {
    let created = [2, 2, 2, 2, 10, 10, 10, 10, 2, 2, 2, 2];
    let intermediate: Vec<Snapshot> = created
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let s = snapshot(
                T0 + i as i64 * PERIOD_MS,
                &[
                    ("vusers.created", *c),
                    ("vusers.completed", *c),
                    ("vusers.failed", 0),
                    ("browser.http_requests", c * 5),
                ],
            );
            with_summary(
                s,
                "browser.page.FCP.https://shop.example.com/",
                100.0 + i as f64,
                900.0 + i as f64,
                400.0 + i as f64 * 10.0,
            )
        })
        .collect();

    let total: u64 = created.iter().sum();
    let mut aggregate = vusers_aggregate(total, total, 0);
    aggregate
        .counters
        .insert("browser.http_requests".to_string(), total * 5);
    aggregate
        .counters
        .insert("TEST_NAME.Checkout_flow".to_string(), 1);
    aggregate.summaries.insert(
        "browser.page.FCP.https://shop.example.com/".to_string(),
        SummaryStat {
            min: Some(100.0),
            max: Some(911.0),
            mean: Some(455.0),
            count: 12,
            p50: Some(450.0),
            p75: Some(480.0),
            p95: Some(500.0),
            ..SummaryStat::default()
        },
    );
    aggregate.first_metric_at = Some(T0);
    aggregate.last_metric_at = Some(T0 + 11 * PERIOD_MS);

    ResultsDocument {
        aggregate,
        intermediate,
    }
}

pub fn three_level_json() -> String {
    serde_json::to_string(&three_level_document()).expect("serialize fixture")
}

pub fn phase_log_line(name: &str, index: usize, duration_sec: u64) -> String {
    format!(
        "Phase started: {} (index: {}, duration: {}s) 14:21:20(+0000)\n",
        name, index, duration_sec
    )
}
