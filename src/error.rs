// Error types. Missing evidence (no log, no matching lines) is not an error anywhere;
// only unusable documents and rejected phase lists surface here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Phase list rejected by validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhaseError {
    #[error("no phases detected")]
    Empty,

    #[error("phase {first_index} ends at {first_end} but phase {second_index} starts at {second_start}")]
    Overlap {
        first_index: usize,
        first_end: i64,
        second_index: usize,
        second_start: i64,
    },
}

/// Failures loading or serving a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("invalid report name: {0}")]
    InvalidName(String),

    #[error("report not found: {0}")]
    NotFound(String),

    #[error("no data available: {0}")]
    NoData(String),

    #[error("phase validation failed: {0}")]
    Phase(#[from] PhaseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn status(&self) -> StatusCode {
        match self {
            ReportError::InvalidName(_) => StatusCode::BAD_REQUEST,
            ReportError::NotFound(_) => StatusCode::NOT_FOUND,
            ReportError::NoData(_) | ReportError::Phase(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ReportError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "report request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "report request rejected");
        }
        (
            status,
            axum::Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
