// Phase detection: execution log first, then creation-rate heuristics, then one
// phase for the whole run. First strategy with a result wins; nothing is merged.

pub mod heuristic;
pub mod log;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::PhaseConfig;
use crate::error::PhaseError;
use crate::models::{
    Phase, PhaseGap, PhaseOverlap, PhaseSource, PhaseValidation, RunBounds, Snapshot,
};

pub const FALLBACK_PHASE_NAME: &str = "Entire Test";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedPhases {
    pub source: PhaseSource,
    pub phases: Vec<Phase>,
}

/// Ordered phase list for one run. Never empty.
pub fn detect_phases(
    snapshots: &[Snapshot],
    bounds: RunBounds,
    log: Option<&str>,
    config: &PhaseConfig,
) -> DetectedPhases {
    if let Some(phases) = log.and_then(|text| log::phases_from_log(text, bounds.first_metric_at)) {
        info!(count = phases.len(), "phases detected from execution log");
        return DetectedPhases {
            source: PhaseSource::Log,
            phases,
        };
    }

    if let Some(phases) = heuristic::phases_from_snapshots(snapshots, bounds, config) {
        info!(count = phases.len(), "phases detected from creation rate");
        return DetectedPhases {
            source: PhaseSource::Heuristic,
            phases,
        };
    }

    info!("no phase evidence; treating entire test as one phase");
    DetectedPhases {
        source: PhaseSource::Fallback,
        phases: vec![fallback_phase(bounds)],
    }
}

pub fn fallback_phase(bounds: RunBounds) -> Phase {
    Phase::measured(
        FALLBACK_PHASE_NAME,
        0,
        bounds.first_metric_at,
        bounds.last_metric_at,
    )
}

/// Checks ordering between consecutive phases. Overlaps fail when `reject_overlaps`
/// is set and are otherwise recorded; gaps above the threshold are only recorded.
pub fn validate_phases(phases: &[Phase], config: &PhaseConfig) -> Result<PhaseValidation, PhaseError> {
    if phases.is_empty() {
        warn!("no phases detected");
        return Err(PhaseError::Empty);
    }

    let mut validation = PhaseValidation::default();
    for pair in phases.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.end_time > b.start_time {
            error!(
                first = a.index,
                first_end = a.end_time,
                second = b.index,
                second_start = b.start_time,
                "overlapping phases"
            );
            if config.reject_overlaps {
                return Err(PhaseError::Overlap {
                    first_index: a.index,
                    first_end: a.end_time,
                    second_index: b.index,
                    second_start: b.start_time,
                });
            }
            validation.overlaps.push(PhaseOverlap {
                first_index: a.index,
                second_index: b.index,
                overlap_ms: a.end_time - b.start_time,
            });
            continue;
        }

        let gap_ms = b.start_time - a.end_time;
        if gap_ms > config.gap_warn_threshold_ms {
            warn!(after = a.index, before = b.index, gap_ms, "gap between phases");
            validation.gaps.push(PhaseGap {
                after_index: a.index,
                before_index: b.index,
                gap_ms,
            });
        }
    }

    info!(count = phases.len(), "phases validated");
    Ok(validation)
}

/// Phase whose [start, end) contains `ts`; timestamps past every phase belong to the last one.
pub fn map_period_to_phase(ts: i64, phases: &[Phase]) -> Option<&Phase> {
    phases.iter().find(|p| p.contains(ts)).or(phases.last())
}
