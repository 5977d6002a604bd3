//! Monitor configuration. One value per monitor instance; nothing is global.

use crate::error::MonitorError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Training-time CSV used as the frozen reference distribution
    pub baseline_path: PathBuf,
    /// Append-only NDJSON log written by the serving component
    pub event_source_path: PathBuf,
    /// Per-feature window capacity
    pub window_size: usize,
    /// Significance cutoff: p-value below this is drift
    pub drift_threshold: f64,
    /// Multiple-comparison policy across features
    pub correction: Correction,
    /// Tracked features, in report order
    pub features: Vec<String>,
    /// Recurring evaluation
    pub schedule: ScheduleConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correction {
    /// Compare every feature against `drift_threshold` as is
    #[default]
    None,
    /// Divide `drift_threshold` by the number of conclusive features
    Bonferroni,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds between cycles; 0 runs a single cycle and exits
    pub interval_secs: u64,
    /// A cycle running longer than this is abandoned
    pub cycle_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

/// Feature columns the fraud classifier consumes, label excluded.
pub fn default_features() -> Vec<String> {
    (1..=28)
        .map(|i| format!("V{}", i))
        .chain(std::iter::once("Amount".to_string()))
        .collect()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            baseline_path: PathBuf::from("data/processed/train.csv"),
            event_source_path: PathBuf::from("logs/predictions.json"),
            window_size: 1000,
            drift_threshold: 0.05,
            correction: Correction::None,
            features: default_features(),
            schedule: ScheduleConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 0,
            cycle_timeout_secs: 60,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl ScheduleConfig {
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_secs > 0).then(|| Duration::from_secs(self.interval_secs))
    }

    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_secs(self.cycle_timeout_secs.max(1))
    }
}

impl MonitorConfig {
    /// Load from JSON file if present; otherwise return default. A file that
    /// exists but cannot be used also yields the default, plus a warning for
    /// the caller to log once logging is set up.
    pub fn load(path: &std::path::Path) -> (Self, Option<String>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        let warning = match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str::<MonitorConfig>(&data) {
                Ok(c) => return (c, None),
                Err(e) => format!("invalid config {}: {}; using defaults", path.display(), e),
            },
            Err(e) => format!("unreadable config {}: {}; using defaults", path.display(), e),
        };
        (Self::default(), Some(warning))
    }

    /// Reject settings under which no meaningful comparison is possible.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.window_size < 2 {
            return Err(MonitorError::InvalidConfig(format!(
                "window_size must be at least 2, got {}",
                self.window_size
            )));
        }
        if !(self.drift_threshold > 0.0 && self.drift_threshold < 1.0) {
            return Err(MonitorError::InvalidConfig(format!(
                "drift_threshold must be in (0, 1), got {}",
                self.drift_threshold
            )));
        }
        if self.features.is_empty() {
            return Err(MonitorError::InvalidConfig("no tracked features".into()));
        }
        let mut seen = HashSet::new();
        for f in &self.features {
            if !seen.insert(f.as_str()) {
                return Err(MonitorError::InvalidConfig(format!("duplicate feature {}", f)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_track_29_features() {
        let c = MonitorConfig::default();
        assert_eq!(c.features.len(), 29);
        assert_eq!(c.features[0], "V1");
        assert_eq!(c.features[27], "V28");
        assert_eq!(c.features[28], "Amount");
        assert_eq!(c.window_size, 1000);
        assert_eq!(c.drift_threshold, 0.05);
        assert_eq!(c.correction, Correction::None);
        assert!(c.schedule.interval().is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c: MonitorConfig =
            serde_json::from_str(r#"{"window_size": 50, "correction": "bonferroni"}"#).unwrap();
        assert_eq!(c.window_size, 50);
        assert_eq!(c.correction, Correction::Bonferroni);
        assert_eq!(c.drift_threshold, 0.05);
        assert_eq!(c.features.len(), 29);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut c = MonitorConfig::default();
        c.window_size = 1;
        assert!(c.validate().is_err());

        let mut c = MonitorConfig::default();
        c.drift_threshold = 1.5;
        assert!(c.validate().is_err());

        let mut c = MonitorConfig::default();
        c.features = vec!["Amount".into(), "Amount".into()];
        assert!(c.validate().is_err());

        let mut c = MonitorConfig::default();
        c.features.clear();
        assert!(c.validate().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let (c, warning) = MonitorConfig::load(std::path::Path::new("does-not-exist.json"));
        assert_eq!(c.window_size, 1000);
        assert!(warning.is_none());
    }

    #[test]
    fn invalid_file_falls_back_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"window_size": "#).unwrap();
        let (c, warning) = MonitorConfig::load(&path);
        assert_eq!(c.window_size, 1000);
        assert!(warning.unwrap().starts_with("invalid config"));

        std::fs::write(&path, r#"{"window_size": 64}"#).unwrap();
        let (c, warning) = MonitorConfig::load(&path);
        assert_eq!(c.window_size, 64);
        assert!(warning.is_none());
    }
}
