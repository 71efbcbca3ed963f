// Domain models: result documents, phases, manifests, metric registry

mod manifest;
mod metric;
mod phase;
mod snapshot;

pub use manifest::{LogEntry, LogsMap, ReportEntry, ResultsMap};
pub use metric::{MetricId, MetricRegistry, WebVital};
pub use phase::{PHASE_ID_PREFIX, Phase, PhaseGap, PhaseOverlap, PhaseSource, PhaseValidation};
pub use snapshot::{AggregateSnapshot, ResultsDocument, RunBounds, Snapshot, SummaryStat};
