//! Collector and classifier settings
//!
//! Settings are read from TOML files or from the JSON blob the extension keeps
//! in its local storage. Every section is optional.
//!
//! ```toml
//! [collector]
//! retry_interval_ms = 500
//!
//! [thresholds]
//! cls = [0.05, 0.1, 0.25]
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::classify::{MetricKey, ThresholdTable};
use crate::retry::RetryPolicy;

/// Top-level settings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Timing read behaviour
    #[serde(default)]
    pub collector: CollectorSettings,
    /// Per-metric threshold overrides, merged onto the defaults
    #[serde(default)]
    pub thresholds: BTreeMap<MetricKey, [f64; 3]>,
}

impl Settings {
    /// Load settings from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid settings TOML
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse settings from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML settings")
    }

    /// Parse settings from the extension's stored JSON
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("Failed to parse JSON settings")
    }

    /// Default thresholds with this document's overrides applied
    ///
    /// # Errors
    ///
    /// Returns an error naming the metric whose override is not a finite,
    /// ascending triple
    pub fn threshold_table(&self) -> anyhow::Result<ThresholdTable> {
        self.thresholds
            .iter()
            .try_fold(ThresholdTable::default(), |table, (key, bounds)| {
                table
                    .with_override(*key, *bounds)
                    .with_context(|| format!("Invalid threshold override for {key}"))
            })
    }

    /// Retry policy for the navigation/resource timing read
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            interval: Duration::from_millis(self.collector.retry_interval_ms),
            max_attempts: self.collector.max_retries,
        }
    }
}

/// Timing read settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorSettings {
    /// Delay between checks for buffered timing data (default: 500)
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    /// Give up after this many checks; unset retries forever
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            retry_interval_ms: default_retry_interval_ms(),
            max_retries: None,
        }
    }
}

fn default_retry_interval_ms() -> u64 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Tier;

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = Settings::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.retry_policy(), RetryPolicy::default());
        assert_eq!(settings.threshold_table().unwrap(), ThresholdTable::default());
    }

    #[test]
    fn test_parse_full_settings() {
        let toml = r#"
            [collector]
            retry_interval_ms = 250
            max_retries = 40

            [thresholds]
            cls = [0.05, 0.1, 0.25]
            pageLoadTime = [1.0, 2.0, 3.0]
        "#;

        let settings = Settings::from_str(toml).unwrap();
        let policy = settings.retry_policy();
        assert_eq!(policy.interval, Duration::from_millis(250));
        assert_eq!(policy.max_attempts, Some(40));

        let table = settings.threshold_table().unwrap();
        assert_eq!(table.classify(MetricKey::Cls, 0.1), Tier::Moderate);
        assert_eq!(table.classify(MetricKey::PageLoadTime, 2.5), Tier::Poor);
        assert_eq!(table.classify(MetricKey::Fcp, 1000.0), Tier::Good);
    }

    #[test]
    fn test_parse_json_settings() {
        let json = r#"{"collector":{"retry_interval_ms":1000},"thresholds":{"fid":[50,100,200]}}"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.collector.retry_interval_ms, 1000);
        let table = settings.threshold_table().unwrap();
        assert_eq!(table.classify(MetricKey::Fid, 150.0), Tier::Poor);
    }

    #[test]
    fn test_unknown_metric_key_rejected() {
        let toml = r#"
            [thresholds]
            inp = [200.0, 500.0, 800.0]
        "#;
        assert!(Settings::from_str(toml).is_err());
    }

    #[test]
    fn test_descending_override_rejected() {
        let toml = r#"
            [thresholds]
            ttfb = [500.0, 300.0, 200.0]
        "#;
        let settings = Settings::from_str(toml).unwrap();
        let err = settings.threshold_table().unwrap_err();
        assert!(err.to_string().contains("ttfb"));
    }

    #[test]
    fn test_from_file_missing_path() {
        let err = Settings::from_file("/nonexistent/vitals.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read settings file"));
    }
}
