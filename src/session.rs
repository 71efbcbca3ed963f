// Loaded run cache and per-client dashboard sessions.

use std::borrow::Cow;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::aggregation::recalculate_aggregate;
use crate::config::PhaseConfig;
use crate::error::ReportError;
use crate::filter::{PhaseSelection, PhasedSnapshot, annotate_snapshots, filter_by_phases, period_label};
use crate::models::{
    AggregateSnapshot, MetricRegistry, Phase, PhaseSource, PhaseValidation, ResultsDocument,
    RunBounds, Snapshot,
};
use crate::overview::{ReportOverview, build_overview};
use crate::phases::{DetectedPhases, detect_phases, validate_phases};
use crate::report_repo::{ReportRepo, validate_name};

/// A results document with its phases detected and validated. Immutable once built.
#[derive(Debug)]
pub struct LoadedRun {
    pub result_file: String,
    pub document: ResultsDocument,
    pub bounds: RunBounds,
    pub detected: DetectedPhases,
    pub validation: PhaseValidation,
    pub registry: MetricRegistry,
}

impl LoadedRun {
    pub fn from_document(
        result_file: impl Into<String>,
        document: ResultsDocument,
        log: Option<&str>,
        config: &PhaseConfig,
    ) -> Result<Self, ReportError> {
        let result_file = result_file.into();
        let bounds = document
            .bounds()
            .ok_or_else(|| ReportError::NoData(format!("{}: no run bounds", result_file)))?;
        let detected = detect_phases(&document.intermediate, bounds, log, config);
        let validation = validate_phases(&detected.phases, config)?;
        let registry = MetricRegistry::classify(&document.aggregate);
        Ok(Self {
            result_file,
            document,
            bounds,
            detected,
            validation,
            registry,
        })
    }

    pub fn phases(&self) -> &[Phase] {
        &self.detected.phases
    }
}

/// The currently loaded run. Switching files replaces the whole run at once.
#[derive(Default)]
pub struct RunCache {
    current: RwLock<Option<Arc<LoadedRun>>>,
}

impl RunCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached run for `file`, or load, detect and swap it in.
    #[instrument(skip(self, repo, config), fields(operation = "get_or_load"))]
    pub async fn get_or_load(
        &self,
        repo: &ReportRepo,
        config: &PhaseConfig,
        file: &str,
    ) -> Result<Arc<LoadedRun>, ReportError> {
        validate_name(file)?;
        {
            let current = self.current.read().await;
            if let Some(run) = current.as_ref()
                && run.result_file == file
            {
                return Ok(Arc::clone(run));
            }
        }

        let document = repo.load_document(file).await?;
        let log = repo.fetch_log(file).await;
        let run = Arc::new(LoadedRun::from_document(file, document, log.as_deref(), config)?);
        info!(
            file,
            source = ?run.detected.source,
            phases = run.detected.phases.len(),
            "run loaded"
        );

        *self.current.write().await = Some(Arc::clone(&run));
        Ok(run)
    }

    pub async fn current(&self) -> Option<Arc<LoadedRun>> {
        self.current.read().await.clone()
    }
}

/// What one dashboard client is looking at.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView<'a> {
    pub result_file: &'a str,
    pub phase_source: PhaseSource,
    pub phases: &'a [Phase],
    pub selection: Vec<String>,
    pub labels: Vec<String>,
    pub filtered_snapshots: Vec<PhasedSnapshot<'a>>,
    pub recalculated_aggregate: Cow<'a, AggregateSnapshot>,
    /// Recalculated percentiles are taken over period means, not individual samples.
    pub percentiles_approximate: bool,
    /// No data for the current filter.
    pub empty: bool,
}

pub struct DashboardSession {
    run: Arc<LoadedRun>,
    selection: PhaseSelection,
}

impl DashboardSession {
    pub fn new(run: Arc<LoadedRun>) -> Self {
        Self::with_selection(run, PhaseSelection::All)
    }

    pub fn with_selection(run: Arc<LoadedRun>, selection: PhaseSelection) -> Self {
        Self { run, selection }
    }

    pub fn run(&self) -> &LoadedRun {
        &self.run
    }

    pub fn selection(&self) -> &PhaseSelection {
        &self.selection
    }

    pub fn toggle(&mut self, id: &str) {
        self.selection.toggle(id);
    }

    pub fn select<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.selection = PhaseSelection::from_ids(ids);
    }

    pub fn reset(&mut self) {
        self.selection = PhaseSelection::All;
    }

    fn filtered(&self) -> Vec<&Snapshot> {
        filter_by_phases(
            &self.selection,
            self.run.phases(),
            &self.run.document.intermediate,
        )
    }

    /// `all` keeps the document's own aggregate; anything else is recalculated
    /// against it as the attribution reference.
    fn aggregate_for<'a>(&'a self, filtered: &[&'a Snapshot]) -> Cow<'a, AggregateSnapshot> {
        if self.selection.is_all() {
            Cow::Borrowed(&self.run.document.aggregate)
        } else {
            Cow::Owned(recalculate_aggregate(
                filtered,
                Some(&self.run.document.aggregate),
            ))
        }
    }

    pub fn view(&self) -> DashboardView<'_> {
        let filtered = self.filtered();
        let recalculated_aggregate = self.aggregate_for(&filtered);
        let labels = filtered.iter().map(|s| period_label(s.period)).collect();
        let empty = filtered.is_empty();
        DashboardView {
            result_file: &self.run.result_file,
            phase_source: self.run.detected.source,
            phases: self.run.phases(),
            selection: self.selection.ids(),
            labels,
            filtered_snapshots: annotate_snapshots(self.run.phases(), filtered),
            recalculated_aggregate,
            percentiles_approximate: !self.selection.is_all(),
            empty,
        }
    }

    pub fn overview(&self) -> ReportOverview {
        let filtered = self.filtered();
        let aggregate = self.aggregate_for(&filtered);
        build_overview(&self.run.registry, &aggregate, filtered.len())
    }
}
