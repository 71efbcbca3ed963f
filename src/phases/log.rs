// Phase lines from the load tool's execution log:
//   "Phase started: Ramp-up for local test (index: 0, duration: 60s) 14:21:20(+0000)"

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::models::Phase;

static PHASE_STARTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Phase started: (.+?) \(index: (\d+), duration: (\d+)s\)").expect("static regex")
});

/// A phase as configured in the run, before timestamps are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedPhase {
    pub name: String,
    pub index: usize,
    pub duration_sec: u64,
}

/// Every `Phase started` line in the log, in log order. Lines whose numbers
/// do not fit are skipped.
pub fn parse_phase_lines(log: &str) -> Vec<LoggedPhase> {
    PHASE_STARTED
        .captures_iter(log)
        .filter_map(|caps| {
            let index = caps[2].parse().ok()?;
            let duration_sec = caps[3].parse().ok()?;
            Some(LoggedPhase {
                name: caps[1].trim().to_string(),
                index,
                duration_sec,
            })
        })
        .collect()
}

/// Log-derived phases laid end to end from `first_metric_at`. `None` when the log has no usable lines.
pub fn phases_from_log(log: &str, first_metric_at: i64) -> Option<Vec<Phase>> {
    let mut logged = parse_phase_lines(log);
    if logged.is_empty() {
        debug!("execution log has no phase lines");
        return None;
    }
    // Multi-worker runs repeat each line once per worker.
    logged.sort_by_key(|p| p.index);
    logged.dedup_by_key(|p| p.index);

    let mut cursor = first_metric_at;
    let mut phases = Vec::with_capacity(logged.len());
    for p in logged {
        if p.duration_sec == 0 {
            warn!(phase = %p.name, index = p.index, "skipping zero-duration phase from log");
            continue;
        }
        let Some(phase) = Phase::configured(&p.name, p.index, cursor, p.duration_sec) else {
            warn!(
                phase = %p.name,
                index = p.index,
                duration_sec = p.duration_sec,
                "skipping phase whose end time overflows"
            );
            continue;
        };
        cursor = phase.end_time;
        phases.push(phase);
    }

    if phases.is_empty() { None } else { Some(phases) }
}
