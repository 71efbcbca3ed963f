// Phase models: detected phases, where they came from, validation findings.

use serde::{Deserialize, Serialize};

/// Selection identifier prefix: phase index 2 is "phase-2".
pub const PHASE_ID_PREFIX: &str = "phase-";

/// A named, time-bounded segment of a run. Interval is [start_time, end_time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub name: String,
    pub index: usize,
    pub start_time: i64,
    pub end_time: i64,
    pub duration_ms: i64,
    pub duration_sec: u64,
}

impl Phase {
    /// Phase with timestamps measured from data; duration is derived.
    pub fn measured(name: impl Into<String>, index: usize, start_time: i64, end_time: i64) -> Self {
        let duration_ms = end_time - start_time;
        Self {
            name: name.into(),
            index,
            start_time,
            end_time,
            duration_ms,
            duration_sec: (duration_ms.max(0) as f64 / 1000.0).round() as u64,
        }
    }

    /// Phase known by configured duration; timestamps are derived from it.
    /// `None` when the end time does not fit in epoch-ms.
    pub fn configured(
        name: impl Into<String>,
        index: usize,
        start_time: i64,
        duration_sec: u64,
    ) -> Option<Self> {
        let duration_ms = i64::try_from(duration_sec).ok()?.checked_mul(1000)?;
        let end_time = start_time.checked_add(duration_ms)?;
        Some(Self {
            name: name.into(),
            index,
            start_time,
            end_time,
            duration_ms,
            duration_sec,
        })
    }

    pub fn id(&self) -> String {
        format!("{}{}", PHASE_ID_PREFIX, self.index)
    }

    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.start_time && ts < self.end_time
    }
}

/// Which detection strategy produced the phase list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseSource {
    Log,
    Heuristic,
    Fallback,
}

/// Gap between two consecutive phases (allowed; reported as a warning).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseGap {
    pub after_index: usize,
    pub before_index: usize,
    pub gap_ms: i64,
}

/// Overlap between two consecutive phases; only recorded when overlaps are not rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseOverlap {
    pub first_index: usize,
    pub second_index: usize,
    pub overlap_ms: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseValidation {
    pub gaps: Vec<PhaseGap>,
    pub overlaps: Vec<PhaseOverlap>,
}
