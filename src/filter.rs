// Phase selection and snapshot filtering. Pure functions over borrowed input:
// filtered results are references into the loaded run, never copies.

use std::collections::BTreeSet;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use tracing::debug;

use crate::models::{PHASE_ID_PREFIX, Phase, Snapshot};
use crate::phases::map_period_to_phase;

/// Selection sentinel for "every phase".
pub const ALL_PHASES: &str = "all";

/// Which phases the dashboard is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhaseSelection {
    #[default]
    All,
    /// Phase indices; empty means "nothing selected".
    Phases(BTreeSet<usize>),
}

/// Index from a `phase-N` identifier.
pub fn parse_phase_id(id: &str) -> Option<usize> {
    id.trim().strip_prefix(PHASE_ID_PREFIX)?.parse().ok()
}

impl PhaseSelection {
    /// Any `all` wins; unknown identifiers select nothing.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = BTreeSet::new();
        for id in ids {
            let id = id.as_ref().trim();
            if id == ALL_PHASES {
                return PhaseSelection::All;
            }
            match parse_phase_id(id) {
                Some(index) => {
                    selected.insert(index);
                }
                None => debug!(id, "ignoring unknown phase id"),
            }
        }
        PhaseSelection::Phases(selected)
    }

    /// Comma-separated identifiers, as sent in `?phases=phase-0,phase-2`.
    pub fn parse_list(list: &str) -> Self {
        Self::from_ids(list.split(',').filter(|s| !s.trim().is_empty()))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, PhaseSelection::All)
    }

    pub fn includes(&self, index: usize) -> bool {
        match self {
            PhaseSelection::All => true,
            PhaseSelection::Phases(set) => set.contains(&index),
        }
    }

    /// Chip toggle: `all` resets; a phase replaces `all`, flips in the set,
    /// and removing the last selected phase falls back to `all`.
    pub fn toggle(&mut self, id: &str) {
        if id.trim() == ALL_PHASES {
            *self = PhaseSelection::All;
            return;
        }
        let Some(index) = parse_phase_id(id) else {
            debug!(id, "ignoring toggle of unknown phase id");
            return;
        };
        match self {
            PhaseSelection::All => *self = PhaseSelection::Phases(BTreeSet::from([index])),
            PhaseSelection::Phases(set) => {
                if set.remove(&index) {
                    if set.is_empty() {
                        *self = PhaseSelection::All;
                    }
                } else {
                    set.insert(index);
                }
            }
        }
    }

    pub fn ids(&self) -> Vec<String> {
        match self {
            PhaseSelection::All => vec![ALL_PHASES.to_string()],
            PhaseSelection::Phases(set) => set
                .iter()
                .map(|i| format!("{}{}", PHASE_ID_PREFIX, i))
                .collect(),
        }
    }
}

/// Snapshots owned by a selected phase, in original order.
pub fn filter_by_phases<'a>(
    selection: &PhaseSelection,
    phases: &[Phase],
    snapshots: &'a [Snapshot],
) -> Vec<&'a Snapshot> {
    match selection {
        PhaseSelection::All => snapshots.iter().collect(),
        PhaseSelection::Phases(set) if set.is_empty() => Vec::new(),
        PhaseSelection::Phases(set) => snapshots
            .iter()
            .filter(|s| {
                map_period_to_phase(s.period, phases).is_some_and(|p| set.contains(&p.index))
            })
            .collect(),
    }
}

/// Snapshot tagged with the phase that owns its period.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhasedSnapshot<'a> {
    #[serde(flatten)]
    pub snapshot: &'a Snapshot,
    pub phase_index: Option<usize>,
    pub phase_name: Option<&'a str>,
}

pub fn annotate_snapshots<'a, I>(phases: &'a [Phase], snapshots: I) -> Vec<PhasedSnapshot<'a>>
where
    I: IntoIterator<Item = &'a Snapshot>,
{
    snapshots
        .into_iter()
        .map(|snapshot| {
            let phase = map_period_to_phase(snapshot.period, phases);
            PhasedSnapshot {
                snapshot,
                phase_index: phase.map(|p| p.index),
                phase_name: phase.map(|p| p.name.as_str()),
            }
        })
        .collect()
}

/// `HH:MM:SS` label for a period start in local time.
pub fn period_label(ts: i64) -> String {
    period_label_in(ts, &Local)
}

pub fn period_label_in<Tz: TimeZone>(ts: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp_millis(ts) {
        Some(dt) => dt.with_timezone(tz).format("%H:%M:%S").to_string(),
        None => "N/A".to_string(),
    }
}
