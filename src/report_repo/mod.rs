// Results and execution logs on disk. Results live in `results_dir`, logs and
// logsMap.json in `logs_dir`.

mod manifest;

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::config::ReportsConfig;
use crate::error::ReportError;
use crate::models::{LogsMap, ReportEntry, ResultsDocument, ResultsMap};
use manifest::{LOGS_MAP_FILE, RESULTS_MAP_FILE, read_manifest};

pub struct ReportRepo {
    results_dir: PathBuf,
    logs_dir: PathBuf,
    default_results_file: String,
    default_log_file: String,
    log_fetch_timeout: Duration,
}

/// Report names are a single path component; anything that could leave the directory is rejected.
pub fn validate_name(name: &str) -> Result<(), ReportError> {
    let bad = name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.contains('\0');
    if bad {
        return Err(ReportError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl ReportRepo {
    pub fn new(config: &ReportsConfig) -> Self {
        Self {
            results_dir: PathBuf::from(&config.results_dir),
            logs_dir: PathBuf::from(&config.logs_dir),
            default_results_file: config.default_results_file.clone(),
            default_log_file: config.default_log_file.clone(),
            log_fetch_timeout: Duration::from_millis(config.log_fetch_timeout_ms),
        }
    }

    /// Load and sanity-check a results document. A document without periods is
    /// `NoData`, as is one that does not parse.
    #[instrument(skip(self), fields(repo = "reports", operation = "load_document"))]
    pub async fn load_document(&self, file: &str) -> Result<ResultsDocument, ReportError> {
        validate_name(file)?;
        let path = self.results_dir.join(file);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ReportError::NotFound(file.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let document: ResultsDocument = serde_json::from_str(&raw).map_err(|e| {
            warn!(file, error = %e, "results document unparsable");
            ReportError::NoData(format!("{}: {}", file, e))
        })?;
        if document.intermediate.is_empty() {
            return Err(ReportError::NoData(format!("{}: no intermediate periods", file)));
        }

        debug!(
            file,
            periods = document.intermediate.len(),
            "results document loaded"
        );
        Ok(document)
    }

    /// Reports listed in resultsMap.json; otherwise the default report alone, if present.
    #[instrument(skip(self), fields(repo = "reports", operation = "list_reports"))]
    pub async fn list_reports(&self) -> Vec<ReportEntry> {
        if let Some(map) =
            read_manifest::<ResultsMap>(&self.results_dir.join(RESULTS_MAP_FILE)).await
            && !map.files.is_empty()
        {
            return map.files;
        }

        let default_path = self.results_dir.join(&self.default_results_file);
        match tokio::fs::try_exists(&default_path).await {
            Ok(true) => vec![ReportEntry {
                filename: self.default_results_file.clone(),
                ..ReportEntry::default()
            }],
            _ => Vec::new(),
        }
    }

    /// Execution log text for a results file, bounded by the fetch timeout.
    /// `None` on timeout, missing log or read error; detection then proceeds without it.
    #[instrument(skip(self), fields(repo = "reports", operation = "fetch_log"))]
    pub async fn fetch_log(&self, result_file: &str) -> Option<String> {
        match tokio::time::timeout(self.log_fetch_timeout, self.read_log(result_file)).await {
            Ok(log) => log,
            Err(_) => {
                warn!(
                    result_file,
                    timeout_ms = self.log_fetch_timeout.as_millis() as u64,
                    "execution log fetch timed out"
                );
                None
            }
        }
    }

    async fn read_log(&self, result_file: &str) -> Option<String> {
        let log_file = self.log_file_for(result_file).await;
        if validate_name(&log_file).is_err() {
            warn!(result_file, log_file = %log_file, "logsMap entry is not a plain file name");
            return None;
        }
        let path = self.logs_dir.join(&log_file);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                debug!(log_file = %log_file, bytes = text.len(), "execution log loaded");
                Some(text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(log_file = %log_file, "no execution log");
                None
            }
            Err(e) => {
                warn!(log_file = %log_file, error = %e, "execution log unreadable");
                None
            }
        }
    }

    async fn log_file_for(&self, result_file: &str) -> String {
        if result_file == self.default_results_file {
            return self.default_log_file.clone();
        }
        read_manifest::<LogsMap>(&self.logs_dir.join(LOGS_MAP_FILE))
            .await
            .and_then(|map| map.log_for(result_file).map(str::to_string))
            .unwrap_or_else(|| self.default_log_file.clone())
    }
}
