// Aggregate recalculation: collapse a subset of period snapshots back into one aggregate.
// Only per-period summaries exist, so summary stats are rebuilt from period means:
// mean is an equal-weight mean of period means, and percentiles are nearest-rank
// over the sorted period means. Both approximate the per-request distribution.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{AggregateSnapshot, Phase, Snapshot, SummaryStat};

pub const VUSERS_CREATED: &str = "vusers.created";
pub const VUSERS_COMPLETED: &str = "vusers.completed";
pub const VUSERS_FAILED: &str = "vusers.failed";
pub const HTTP_REQUESTS: &str = "browser.http_requests";

/// Reference success rate at or above which a run with no failures counts as fully successful.
const FULL_SUCCESS_RATE: f64 = 0.999;

/// Rebuild an aggregate for `subset`. `reference` is the full-run aggregate used to
/// attribute VUser outcomes; without it only impossible completions are clamped.
/// Never fails: keys absent from every snapshot are absent from the result.
pub fn recalculate_aggregate(
    subset: &[&Snapshot],
    reference: Option<&AggregateSnapshot>,
) -> AggregateSnapshot {
    let (Some(first), Some(last)) = (subset.first(), subset.last()) else {
        return AggregateSnapshot::default();
    };

    let mut counters = sum_counters(subset);
    match reference {
        Some(reference) => attribute_vusers(&mut counters, reference),
        None => clamp_completed(&mut counters),
    }

    AggregateSnapshot {
        counters,
        summaries: merge_summaries(subset),
        first_metric_at: Some(first.period),
        last_metric_at: Some(last.period),
    }
}

fn sum_counters(subset: &[&Snapshot]) -> BTreeMap<String, u64> {
    let mut counters: BTreeMap<String, u64> = BTreeMap::new();
    for s in subset {
        for (key, value) in &s.counters {
            *counters.entry(key.clone()).or_default() += value;
        }
    }
    counters
}

fn has_vuser_counters(counters: &BTreeMap<String, u64>) -> bool {
    [VUSERS_CREATED, VUSERS_COMPLETED, VUSERS_FAILED]
        .iter()
        .any(|k| counters.contains_key(*k))
}

fn get(counters: &BTreeMap<String, u64>, key: &str) -> u64 {
    counters.get(key).copied().unwrap_or(0)
}

/// VUsers can straddle period and phase boundaries, so summed completions in a subset
/// do not line up with its creations. Redistribute the subset's creations using the
/// full run's success rate instead.
pub fn attribute_vusers(counters: &mut BTreeMap<String, u64>, reference: &AggregateSnapshot) {
    if !has_vuser_counters(counters) {
        return;
    }
    let created = get(counters, VUSERS_CREATED);

    let overall_created = reference.counter(VUSERS_CREATED);
    let overall_completed = reference.counter(VUSERS_COMPLETED);
    let overall_failed = reference.counter(VUSERS_FAILED);
    let rate = if overall_created > 0 {
        overall_completed as f64 / overall_created as f64
    } else {
        1.0
    };

    let (completed, failed) = if overall_failed == 0 && rate >= FULL_SUCCESS_RATE {
        debug!(created, "full run had no failures; filtered range fully successful");
        (created, 0)
    } else {
        let completed = ((created as f64 * rate).round() as u64).min(created);
        debug!(created, rate, completed, "applying full-run success rate to filtered range");
        (completed, created - completed)
    };
    counters.insert(VUSERS_COMPLETED.to_string(), completed);
    counters.insert(VUSERS_FAILED.to_string(), failed);
}

/// Without a reference, only cap completions that exceed creations.
fn clamp_completed(counters: &mut BTreeMap<String, u64>) {
    let created = get(counters, VUSERS_CREATED);
    let completed = get(counters, VUSERS_COMPLETED);
    if completed > created {
        let failed = get(counters, VUSERS_FAILED);
        warn!(
            completed,
            created, "more VUsers completed than created in selected range; VUsers span phases, capping"
        );
        counters.insert(VUSERS_COMPLETED.to_string(), created.saturating_sub(failed));
    }
}

struct SummaryCollector {
    min: f64,
    max: f64,
    means: Vec<f64>,
}

fn merge_summaries(subset: &[&Snapshot]) -> BTreeMap<String, SummaryStat> {
    let mut collectors: BTreeMap<&str, SummaryCollector> = BTreeMap::new();
    for s in subset {
        for (key, summary) in &s.summaries {
            let c = collectors.entry(key.as_str()).or_insert_with(|| SummaryCollector {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
                means: Vec::new(),
            });
            if let Some(min) = summary.min {
                c.min = c.min.min(min);
            }
            if let Some(max) = summary.max {
                c.max = c.max.max(max);
            }
            if let Some(mean) = summary.mean {
                c.means.push(mean);
            }
        }
    }

    collectors
        .into_iter()
        .map(|(key, c)| (key.to_string(), finish_summary(c)))
        .collect()
}

fn finish_summary(mut c: SummaryCollector) -> SummaryStat {
    let mut stat = SummaryStat {
        min: Some(if c.min.is_finite() { c.min } else { 0.0 }),
        max: Some(if c.max.is_finite() { c.max } else { 0.0 }),
        mean: Some(mean_f64(&c.means)),
        count: c.means.len() as u64,
        ..SummaryStat::default()
    };
    if c.means.is_empty() {
        return stat;
    }

    c.means.sort_by(f64::total_cmp);
    let sorted = &c.means;
    stat.p50 = percentile(sorted, 0.5);
    stat.median = stat.p50;
    stat.p75 = percentile(sorted, 0.75);
    stat.p90 = percentile(sorted, 0.9);
    stat.p95 = percentile(sorted, 0.95);
    stat.p99 = percentile(sorted, 0.99);
    stat.p999 = percentile(sorted, 0.999);
    stat
}

/// Nearest-rank percentile of an ascending slice; `p` in 0..=1.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (sorted.len() as f64 * p).ceil() as i64 - 1;
    let index = rank.clamp(0, sorted.len() as i64 - 1) as usize;
    Some(sorted[index])
}

fn mean_f64(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / (v.len() as f64)
}

/// Per-phase headline numbers for the phase table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseStatistics {
    pub id: String,
    pub name: String,
    pub duration_sec: u64,
    pub periods: usize,
    pub vusers_created: u64,
    pub vusers_completed: u64,
    pub vusers_failed: u64,
    pub http_requests: u64,
    /// Percent completed of created; `None` when the phase created no VUsers.
    pub success_rate: Option<f64>,
}

/// Statistics for every phase from the periods strictly inside it, without
/// reference attribution (raw per-phase sums).
pub fn phase_statistics(phases: &[Phase], snapshots: &[Snapshot]) -> Vec<PhaseStatistics> {
    phases
        .iter()
        .map(|phase| {
            let periods: Vec<&Snapshot> =
                snapshots.iter().filter(|s| phase.contains(s.period)).collect();
            let agg = recalculate_aggregate(&periods, None);
            let created = agg.counter(VUSERS_CREATED);
            let completed = agg.counter(VUSERS_COMPLETED);
            PhaseStatistics {
                id: phase.id(),
                name: phase.name.clone(),
                duration_sec: phase.duration_sec,
                periods: periods.len(),
                vusers_created: created,
                vusers_completed: completed,
                vusers_failed: agg.counter(VUSERS_FAILED),
                http_requests: agg.counter(HTTP_REQUESTS),
                success_rate: (created > 0)
                    .then(|| ((completed as f64 / created as f64) * 1000.0).round() / 10.0),
            }
        })
        .collect()
}
