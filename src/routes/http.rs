// GET handlers: version, report list, phases, dashboard view, phase stats, overview

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::AppState;
use crate::aggregation::phase_statistics;
use crate::error::ReportError;
use crate::filter::PhaseSelection;
use crate::session::DashboardSession;
use crate::version::{NAME, VERSION};

#[derive(Debug, Default, Deserialize)]
pub(super) struct SelectionQuery {
    /// Comma-separated phase ids; absent means `all`.
    phases: Option<String>,
}

impl SelectionQuery {
    fn selection(&self) -> PhaseSelection {
        self.phases
            .as_deref()
            .map(PhaseSelection::parse_list)
            .unwrap_or_default()
    }
}

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/reports
pub(super) async fn list_reports_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.repo.list_reports().await)
}

/// GET /api/reports/{file}/phases: detected phases with validation findings.
pub(super) async fn phases_handler(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, ReportError> {
    let run = state.run(&file).await?;
    Ok(Json(serde_json::json!({
        "source": run.detected.source,
        "phases": run.phases(),
        "gaps": run.validation.gaps,
        "overlaps": run.validation.overlaps,
    }))
    .into_response())
}

/// GET /api/reports/{file}/view?phases=phase-0,phase-2
pub(super) async fn view_handler(
    State(state): State<AppState>,
    Path(file): Path<String>,
    Query(query): Query<SelectionQuery>,
) -> Result<Response, ReportError> {
    let run = state.run(&file).await?;
    let session = DashboardSession::with_selection(run, query.selection());
    Ok(Json(session.view()).into_response())
}

/// GET /api/reports/{file}/phase-stats
pub(super) async fn phase_stats_handler(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, ReportError> {
    let run = state.run(&file).await?;
    let stats = phase_statistics(run.phases(), &run.document.intermediate);
    Ok(Json(stats).into_response())
}

/// GET /api/reports/{file}/overview?phases=...
pub(super) async fn overview_handler(
    State(state): State<AppState>,
    Path(file): Path<String>,
    Query(query): Query<SelectionQuery>,
) -> Result<Response, ReportError> {
    let run = state.run(&file).await?;
    let session = DashboardSession::with_selection(run, query.selection());
    Ok(Json(session.overview()).into_response())
}
