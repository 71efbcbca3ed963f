// Well-known metric registry. Metric names in results are free-form strings
// (e.g. "browser.page.FCP.https://shop.example.com/cart"); one classification pass
// at load time maps them to typed identifiers so lookups never pattern-match again.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{AggregateSnapshot, SummaryStat};

static TARGET_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^/]+").expect("static regex"));

const PAGE_PREFIX: &str = "browser.page.";
const STEP_PREFIX: &str = "browser.step.";
const TEST_NAME_PREFIX: &str = "TEST_NAME.";
const CREATED_BY_NAME: &str = "vusers.created_by_name";

/// Core Web Vitals reported per page by the browser engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WebVital {
    Fcp,
    Lcp,
    Ttfb,
    Fid,
    Cls,
    Inp,
}

impl WebVital {
    pub const ALL: [WebVital; 6] = [
        WebVital::Fcp,
        WebVital::Lcp,
        WebVital::Ttfb,
        WebVital::Fid,
        WebVital::Cls,
        WebVital::Inp,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WebVital::Fcp => "FCP",
            WebVital::Lcp => "LCP",
            WebVital::Ttfb => "TTFB",
            WebVital::Fid => "FID",
            WebVital::Cls => "CLS",
            WebVital::Inp => "INP",
        }
    }

    /// (good, poor) upper bounds; CLS is unitless, the rest are milliseconds.
    pub fn thresholds(self) -> (f64, f64) {
        match self {
            WebVital::Fcp => (1800.0, 3000.0),
            WebVital::Lcp => (2500.0, 4000.0),
            WebVital::Ttfb => (800.0, 1800.0),
            WebVital::Fid => (100.0, 300.0),
            WebVital::Cls => (0.1, 0.25),
            WebVital::Inp => (200.0, 500.0),
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        WebVital::ALL
            .into_iter()
            .find(|v| v.label().eq_ignore_ascii_case(segment))
    }
}

/// Summary metrics the dashboard reads by identity rather than by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricId {
    Vital(WebVital),
    SessionLength,
    HttpLatency,
    PageLoadTime,
}

impl MetricId {
    fn from_exact(key: &str) -> Option<Self> {
        match key {
            "vusers.session_length" => Some(MetricId::SessionLength),
            "custom.http_latency" => Some(MetricId::HttpLatency),
            "custom.page_load_time" => Some(MetricId::PageLoadTime),
            _ => None,
        }
    }
}

/// Result of classifying an aggregate's metric names.
#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    summaries: BTreeMap<MetricId, String>,
    steps: Vec<(String, String)>,
    test_name: Option<String>,
    target_url: Option<String>,
    scenario_count: usize,
}

impl MetricRegistry {
    pub fn classify(aggregate: &AggregateSnapshot) -> Self {
        let mut registry = Self::default();

        for key in aggregate.summaries.keys() {
            if registry.target_url.is_none()
                && let Some(m) = TARGET_URL.find(key)
            {
                registry.target_url = Some(m.as_str().to_string());
            }

            if let Some(id) = MetricId::from_exact(key) {
                registry.summaries.entry(id).or_insert_with(|| key.clone());
                continue;
            }

            if let Some(prefix) = key.get(..PAGE_PREFIX.len())
                && prefix.eq_ignore_ascii_case(PAGE_PREFIX)
            {
                let rest = &key[PAGE_PREFIX.len()..];
                if let Some((segment, _page)) = rest.split_once('.')
                    && let Some(vital) = WebVital::from_segment(segment)
                {
                    registry
                        .summaries
                        .entry(MetricId::Vital(vital))
                        .or_insert_with(|| key.clone());
                }
                continue;
            }

            if let Some(step) = key.strip_prefix(STEP_PREFIX)
                && !step.is_empty()
            {
                registry.steps.push((step.to_string(), key.clone()));
            }
        }

        for key in aggregate.counters.keys() {
            if registry.test_name.is_none()
                && let Some(raw) = key.strip_prefix(TEST_NAME_PREFIX)
            {
                registry.test_name = Some(raw.replace('_', " "));
            }
            if key.contains(CREATED_BY_NAME) {
                registry.scenario_count += 1;
            }
        }

        registry
    }

    /// Original metric name for a well-known metric, if the run reported it.
    pub fn key(&self, id: MetricId) -> Option<&str> {
        self.summaries.get(&id).map(String::as_str)
    }

    /// Look up a well-known metric in any aggregate sharing this run's metric names.
    pub fn summary<'a>(&self, id: MetricId, aggregate: &'a AggregateSnapshot) -> Option<&'a SummaryStat> {
        self.key(id).and_then(|k| aggregate.summaries.get(k))
    }

    /// (step name, metric name) for every `browser.step.*` summary.
    pub fn steps(&self) -> &[(String, String)] {
        &self.steps
    }

    pub fn test_name(&self) -> Option<&str> {
        self.test_name.as_deref()
    }

    pub fn target_url(&self) -> Option<&str> {
        self.target_url.as_deref()
    }

    /// Number of scenarios; runs without per-scenario counters count as one.
    pub fn scenario_count(&self) -> usize {
        self.scenario_count.max(1)
    }
}
