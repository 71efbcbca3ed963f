// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::error::ReportError;
use crate::report_repo::ReportRepo;
use crate::session::{LoadedRun, RunCache};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) repo: Arc<ReportRepo>,
    pub(crate) cache: Arc<RunCache>,
    pub(crate) config: AppConfig,
}

impl AppState {
    async fn run(&self, file: &str) -> Result<Arc<LoadedRun>, ReportError> {
        self.cache
            .get_or_load(&self.repo, &self.config.phases, file)
            .await
    }
}

pub fn app(repo: Arc<ReportRepo>, cache: Arc<RunCache>, config: AppConfig) -> Router {
    let state = AppState {
        repo,
        cache,
        config,
    };
    Router::new()
        .route("/", get(|| async { crate::version::banner() })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/reports", get(http::list_reports_handler)) // GET /api/reports
        .route("/api/reports/{file}/phases", get(http::phases_handler))
        .route("/api/reports/{file}/view", get(http::view_handler))
        .route("/api/reports/{file}/phase-stats", get(http::phase_stats_handler))
        .route("/api/reports/{file}/overview", get(http::overview_handler))
        .route("/ws/reports/{file}", get(ws::ws_report)) // WS /ws/reports/{file}
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
