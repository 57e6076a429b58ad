//! Page vitals collection and classification
//!
//! This crate turns browser timing signals into a single per-page metrics
//! snapshot and classifies each metric against severity thresholds.
//!
//! # Features
//!
//! - **Signal collection**: paint, largest-contentful-paint, first-input,
//!   layout-shift and long-task batches, plus a one-shot navigation/resource read
//! - **Derived metrics**: an approximate speed index and page load duration
//! - **Publishing**: every update delivers the full record to a [`Publish`] sink
//! - **Classification**: four severity tiers from per-metric threshold triples
//!
//! # Example
//!
//! ```
//! use vitals_core::{channel, ChannelPublisher, MetricKey, Signal, SignalCollector, ThresholdTable, Tier};
//! use vitals_core::signal::PaintEntry;
//!
//! let (publisher, _snapshots) = ChannelPublisher::new();
//! let collector = SignalCollector::new(0.0, publisher);
//! let (tx, rx) = channel();
//!
//! tx.send(Signal::Paint(vec![PaintEntry {
//!     name: "first-contentful-paint".to_string(),
//!     start_time: 1200.0,
//! }]))
//! .unwrap();
//! drop(tx);
//!
//! let record = futures::executor::block_on(collector.run(rx));
//! let fcp = record.value(MetricKey::Fcp).unwrap();
//! assert_eq!(ThresholdTable::default().classify(MetricKey::Fcp, fcp), Tier::Moderate);
//! ```

pub mod classify;
pub mod collector;
pub mod derived;
pub mod display;
pub mod error;
pub mod publisher;
pub mod record;
pub mod retry;
pub mod settings;
pub mod signal;
pub mod timing;

// Re-export main types for convenience
pub use classify::{MetricKey, ThresholdTable, Thresholds, Tier};
pub use collector::{channel, SignalCollector, SignalReceiver, SignalSender};
pub use error::{ClassifyError, CollectorError, PublishError, ThresholdError};
pub use publisher::{ChannelPublisher, JsonLinesPublisher, Publish};
pub use record::MetricRecord;
pub use retry::RetryPolicy;
pub use settings::Settings;
pub use signal::{Signal, SignalKind, TimingSnapshot};
pub use timing::TimingSource;
