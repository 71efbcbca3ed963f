// Phase boundaries inferred from jumps in the per-period creation rate.

use tracing::debug;

use crate::config::PhaseConfig;
use crate::models::{Phase, RunBounds, Snapshot};

/// Timestamps of periods whose creation count moved by at least
/// `max(prev * relative_change, absolute_floor)` against the previous period.
pub fn rate_transitions(snapshots: &[Snapshot], config: &PhaseConfig) -> Vec<i64> {
    let mut transitions = Vec::new();
    let mut prev: Option<u64> = None;
    for s in snapshots {
        let cur = s.counter(&config.creation_metric);
        if let Some(prev) = prev {
            let diff = (cur as f64 - prev as f64).abs();
            let threshold = (prev as f64 * config.relative_change).max(config.absolute_floor);
            if diff >= threshold {
                debug!(period = s.period, prev, cur, "creation rate transition");
                transitions.push(s.period);
            }
        }
        prev = Some(cur);
    }
    transitions
}

/// Positionally named phases split at each transition; the last one runs to the end of the run.
/// `None` when no transition falls strictly inside the run.
pub fn phases_from_snapshots(
    snapshots: &[Snapshot],
    bounds: RunBounds,
    config: &PhaseConfig,
) -> Option<Vec<Phase>> {
    let mut phases = Vec::new();
    let mut cursor = bounds.first_metric_at;
    for ts in rate_transitions(snapshots, config) {
        if ts <= cursor || ts >= bounds.last_metric_at {
            continue;
        }
        let index = phases.len();
        phases.push(Phase::measured(format!("Phase {}", index + 1), index, cursor, ts));
        cursor = ts;
    }

    if phases.is_empty() {
        return None;
    }

    let index = phases.len();
    phases.push(Phase::measured(
        format!("Phase {}", index + 1),
        index,
        cursor,
        bounds.last_metric_at,
    ));
    Some(phases)
}
