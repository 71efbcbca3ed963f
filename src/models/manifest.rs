// Run manifests written next to the results and logs by the test runner.
// logsMap.json ties each results file to the execution log of the same run.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub filename: String,
    #[serde(default)]
    pub timestamp: String,
    pub result_file: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogsMap {
    #[serde(default)]
    pub files: Vec<LogEntry>,
    #[serde(default)]
    pub latest: String,
}

impl LogsMap {
    /// Log file of the first entry naming `result_file`; later duplicates are ignored.
    pub fn log_for(&self, result_file: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|e| e.result_file == result_file)
            .map(|e| e.filename.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub filename: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub test_name: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub phases: u64,
    #[serde(default)]
    pub vusers: u64,
    #[serde(default)]
    pub requests: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsMap {
    #[serde(default)]
    pub files: Vec<ReportEntry>,
    #[serde(default)]
    pub latest: String,
}
