// Manifest files written by the runner next to results and logs.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

pub(super) const LOGS_MAP_FILE: &str = "logsMap.json";
pub(super) const RESULTS_MAP_FILE: &str = "resultsMap.json";

/// Parsed manifest, or `None` when it is missing or unreadable. Manifests are
/// optional, so failures only log at debug.
pub(super) async fn read_manifest<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "manifest not available");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "manifest unparsable");
            None
        }
    }
}
