// Result document models: per-period snapshots, summary stats, run-wide aggregate.
// Produced by the load tool; read-only once loaded.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Compact digest of one metric over a time window. Absent fields mean "no data".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default)]
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p50: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p75: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p90: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p95: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p99: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p999: Option<f64>,
}

/// One periodic sample. Counters are per-period, not cumulative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Bucket start, epoch-ms. The load tool writes it as a numeric string.
    #[serde(deserialize_with = "epoch_ms")]
    pub period: i64,
    #[serde(default)]
    pub counters: BTreeMap<String, u64>,
    #[serde(default)]
    pub summaries: BTreeMap<String, SummaryStat>,
}

impl Snapshot {
    pub fn counter(&self, key: &str) -> u64 {
        self.counters.get(key).copied().unwrap_or(0)
    }
}

/// Epoch-ms given either as a JSON number or as a string of digits.
fn epoch_ms<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(i64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(ms) => Ok(ms),
        NumOrStr::Str(s) => s
            .trim()
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("period {:?}: {}", s, e))),
    }
}

/// Run-wide aggregate, or one recalculated for a subset of periods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSnapshot {
    #[serde(default)]
    pub counters: BTreeMap<String, u64>,
    #[serde(default)]
    pub summaries: BTreeMap<String, SummaryStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_metric_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_metric_at: Option<i64>,
}

impl AggregateSnapshot {
    pub fn counter(&self, key: &str) -> u64 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty() && self.summaries.is_empty()
    }
}

/// Top-level results document. Both sections are required; see `ReportRepo::load_document`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsDocument {
    pub aggregate: AggregateSnapshot,
    pub intermediate: Vec<Snapshot>,
}

/// Inclusive run bounds in epoch-ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunBounds {
    pub first_metric_at: i64,
    pub last_metric_at: i64,
}

impl ResultsDocument {
    /// Aggregate bounds, falling back to the first/last period when the aggregate omits them.
    pub fn bounds(&self) -> Option<RunBounds> {
        let first = self
            .aggregate
            .first_metric_at
            .or_else(|| self.intermediate.first().map(|s| s.period))?;
        let last = self
            .aggregate
            .last_metric_at
            .or_else(|| self.intermediate.last().map(|s| s.period))?;
        Some(RunBounds {
            first_metric_at: first,
            last_metric_at: last.max(first),
        })
    }
}
