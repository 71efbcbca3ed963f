use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
    #[serde(default)]
    pub phases: PhaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
    /// Report served when no manifest lists any; also the one whose log is always `default_log_file`.
    #[serde(default = "default_results_file")]
    pub default_results_file: String,
    #[serde(default = "default_log_file")]
    pub default_log_file: String,
    /// Upper bound for locating and reading a run's execution log; on expiry detection skips the log.
    #[serde(default = "default_log_fetch_timeout_ms")]
    pub log_fetch_timeout_ms: u64,
}

fn default_results_dir() -> String {
    "results".into()
}

fn default_logs_dir() -> String {
    "logs".into()
}

fn default_results_file() -> String {
    "results.json".into()
}

fn default_log_file() -> String {
    "execution.log".into()
}

fn default_log_fetch_timeout_ms() -> u64 {
    2000
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            logs_dir: default_logs_dir(),
            default_results_file: default_results_file(),
            default_log_file: default_log_file(),
            log_fetch_timeout_ms: default_log_fetch_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhaseConfig {
    /// Overlapping phases fail the load when true; otherwise they are logged and kept.
    #[serde(default = "default_reject_overlaps")]
    pub reject_overlaps: bool,
    /// Gaps between phases longer than this are reported as warnings.
    #[serde(default = "default_gap_warn_threshold_ms")]
    pub gap_warn_threshold_ms: i64,
    /// Counter whose per-period rate drives heuristic detection.
    #[serde(default = "default_creation_metric")]
    pub creation_metric: String,
    /// Relative change (of the previous period's count) that marks a transition.
    #[serde(default = "default_relative_change")]
    pub relative_change: f64,
    /// Minimum absolute change that marks a transition; guards low-volume noise.
    #[serde(default = "default_absolute_floor")]
    pub absolute_floor: f64,
}

fn default_reject_overlaps() -> bool {
    true
}

fn default_gap_warn_threshold_ms() -> i64 {
    1000
}

fn default_creation_metric() -> String {
    "vusers.created".into()
}

fn default_relative_change() -> f64 {
    0.5
}

fn default_absolute_floor() -> f64 {
    2.0
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            reject_overlaps: default_reject_overlaps(),
            gap_warn_threshold_ms: default_gap_warn_threshold_ms(),
            creation_metric: default_creation_metric(),
            relative_change: default_relative_change(),
            absolute_floor: default_absolute_floor(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.reports.results_dir.is_empty(),
            "reports.results_dir must be non-empty"
        );
        anyhow::ensure!(
            !self.reports.logs_dir.is_empty(),
            "reports.logs_dir must be non-empty"
        );
        anyhow::ensure!(
            !self.reports.default_results_file.is_empty(),
            "reports.default_results_file must be non-empty"
        );
        anyhow::ensure!(
            !self.reports.default_log_file.is_empty(),
            "reports.default_log_file must be non-empty"
        );
        anyhow::ensure!(
            self.reports.log_fetch_timeout_ms > 0,
            "reports.log_fetch_timeout_ms must be > 0, got {}",
            self.reports.log_fetch_timeout_ms
        );
        anyhow::ensure!(
            self.phases.gap_warn_threshold_ms >= 0,
            "phases.gap_warn_threshold_ms must be >= 0, got {}",
            self.phases.gap_warn_threshold_ms
        );
        anyhow::ensure!(
            !self.phases.creation_metric.is_empty(),
            "phases.creation_metric must be non-empty"
        );
        anyhow::ensure!(
            self.phases.relative_change > 0.0,
            "phases.relative_change must be > 0, got {}",
            self.phases.relative_change
        );
        anyhow::ensure!(
            self.phases.absolute_floor >= 0.0,
            "phases.absolute_floor must be >= 0, got {}",
            self.phases.absolute_floor
        );
        Ok(())
    }
}
