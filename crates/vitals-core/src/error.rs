use thiserror::Error;

use crate::classify::MetricKey;

/// Errors raised when a value cannot be classified
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("Unknown metric key: {0}")]
    UnknownMetric(String),

    #[error("Value for {key} is not numeric: {raw:?}")]
    NotNumeric { key: MetricKey, raw: String },
}

/// Errors raised while building a threshold table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThresholdError {
    #[error("No thresholds configured for {0}")]
    Missing(MetricKey),

    #[error("Thresholds for {key} must be ascending, got {bounds:?}")]
    NotAscending { key: MetricKey, bounds: [f64; 3] },

    #[error("Thresholds for {key} must be finite")]
    NotFinite { key: MetricKey },
}

/// Errors raised by a snapshot sink
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Snapshot consumer disconnected")]
    Disconnected,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot rejected by consumer: {0}")]
    Rejected(String),
}

/// Errors raised by the signal dispatch plumbing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectorError {
    #[error("Signal collector has stopped")]
    Closed,

    #[error("Timing data still unavailable after {attempts} attempts")]
    RetryExhausted { attempts: u32 },
}
