// Report overview: headline numbers, Apdex and Web Vitals ratings for an aggregate.

use serde::Serialize;

use crate::aggregation::{HTTP_REQUESTS, VUSERS_COMPLETED, VUSERS_CREATED, VUSERS_FAILED};
use crate::models::{AggregateSnapshot, MetricId, MetricRegistry, SummaryStat, WebVital};

pub const DEFAULT_TEST_NAME: &str = "Artillery Load Test";

/// Satisfied threshold in ms; tolerating is up to four times this.
pub const APDEX_THRESHOLD_MS: f64 = 1500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApdexRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ApdexRating {
    fn from_score(score: f64) -> Self {
        if score >= 0.94 {
            ApdexRating::Excellent
        } else if score >= 0.85 {
            ApdexRating::Good
        } else if score >= 0.7 {
            ApdexRating::Fair
        } else {
            ApdexRating::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Apdex {
    /// Metric the score was computed from (`http_latency`, `page_load_time` or `FCP`).
    pub source: &'static str,
    pub score: f64,
    pub rating: ApdexRating,
}

/// Apdex approximated from the p50/p75/p95 split of the best latency metric available.
/// Each quantile stands in for a share of samples: p50 → 50%, p75 → 25%, p95 → 25%.
pub fn apdex(registry: &MetricRegistry, aggregate: &AggregateSnapshot) -> Option<Apdex> {
    let candidates = [
        (MetricId::HttpLatency, "http_latency"),
        (MetricId::PageLoadTime, "page_load_time"),
        (MetricId::Vital(WebVital::Fcp), "FCP"),
    ];
    let (stat, source) = candidates.into_iter().find_map(|(id, label)| {
        registry
            .summary(id, aggregate)
            .filter(|s| s.count > 0)
            .map(|s| (s, label))
    })?;

    let tolerating_limit = APDEX_THRESHOLD_MS * 4.0;
    let mut satisfied = 0.0;
    let mut tolerating = 0.0;
    for (value, weight) in [(stat.p50, 50.0), (stat.p75, 25.0), (stat.p95, 25.0)] {
        let value = value.unwrap_or(0.0);
        if value <= APDEX_THRESHOLD_MS {
            satisfied += weight;
        } else if value <= tolerating_limit {
            tolerating += weight;
        }
    }
    let score = (((satisfied + tolerating / 2.0) / 100.0) * 1000.0_f64).round() / 1000.0;
    Some(Apdex {
        source,
        score,
        rating: ApdexRating::from_score(score),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VitalRating {
    Good,
    NeedsImprovement,
    Poor,
}

pub fn rate_vital(vital: WebVital, value: f64) -> VitalRating {
    let (good, poor) = vital.thresholds();
    if value <= good {
        VitalRating::Good
    } else if value <= poor {
        VitalRating::NeedsImprovement
    } else {
        VitalRating::Poor
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VitalReading {
    pub vital: WebVital,
    pub p75: f64,
    pub rating: VitalRating,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReading {
    pub name: String,
    pub mean_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOverview {
    pub test_name: String,
    pub target_url: String,
    pub start_time: Option<i64>,
    pub duration_sec: f64,
    pub period_count: usize,
    pub scenario_count: usize,
    pub vusers_created: u64,
    pub vusers_completed: u64,
    pub vusers_failed: u64,
    pub http_requests: u64,
    /// Percent of created VUsers that completed; `None` when none were created.
    pub success_rate: Option<f64>,
    pub session_length_mean: Option<f64>,
    pub apdex: Option<Apdex>,
    pub vitals: Vec<VitalReading>,
    pub steps: Vec<StepReading>,
}

/// Overview of `aggregate` using metric names classified for the run.
pub fn build_overview(
    registry: &MetricRegistry,
    aggregate: &AggregateSnapshot,
    period_count: usize,
) -> ReportOverview {
    let created = aggregate.counter(VUSERS_CREATED);
    let completed = aggregate.counter(VUSERS_COMPLETED);

    let duration_sec = match (aggregate.first_metric_at, aggregate.last_metric_at) {
        (Some(first), Some(last)) if last >= first => {
            ((last - first) as f64 / 100.0).round() / 10.0
        }
        _ => 0.0,
    };

    let vitals = WebVital::ALL
        .into_iter()
        .filter_map(|vital| {
            let p75 = registry.summary(MetricId::Vital(vital), aggregate)?.p75?;
            Some(VitalReading {
                vital,
                p75,
                rating: rate_vital(vital, p75),
            })
        })
        .collect();

    let steps = registry
        .steps()
        .iter()
        .filter_map(|(name, key)| {
            let stat: &SummaryStat = aggregate.summaries.get(key)?;
            Some(StepReading {
                name: name.clone(),
                mean_ms: stat.mean.unwrap_or(0.0),
            })
        })
        .collect();

    ReportOverview {
        test_name: registry
            .test_name()
            .unwrap_or(DEFAULT_TEST_NAME)
            .to_string(),
        target_url: registry.target_url().unwrap_or("N/A").to_string(),
        start_time: aggregate.first_metric_at,
        duration_sec,
        period_count,
        scenario_count: registry.scenario_count(),
        vusers_created: created,
        vusers_completed: completed,
        vusers_failed: aggregate.counter(VUSERS_FAILED),
        http_requests: aggregate.counter(HTTP_REQUESTS),
        success_rate: (created > 0)
            .then(|| ((completed as f64 / created as f64) * 1000.0).round() / 10.0),
        session_length_mean: registry
            .summary(MetricId::SessionLength, aggregate)
            .and_then(|s| s.mean),
        apdex: apdex(registry, aggregate),
        vitals,
        steps,
    }
}
