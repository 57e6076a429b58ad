//! Delivery of snapshots to the consumer boundary
//!
//! The collector calls [`Publish::publish`] with the full current record after
//! every mutation. There is no batching or coalescing, so consumers must
//! tolerate frequent, overlapping deliveries.
//!
//! Provided sinks:
//! - any `FnMut(&MetricRecord) -> Result<(), PublishError>` closure
//! - [`ChannelPublisher`]: forwards copies over an unbounded channel
//! - [`JsonLinesPublisher`]: writes one timestamped JSON document per snapshot

use chrono::{DateTime, Utc};
use futures::channel::mpsc;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::PublishError;
use crate::record::MetricRecord;

/// A consumer of metric snapshots
pub trait Publish {
    /// Deliver a copy of the current record
    fn publish(&mut self, snapshot: &MetricRecord) -> Result<(), PublishError>;
}

impl<F> Publish for F
where
    F: FnMut(&MetricRecord) -> Result<(), PublishError>,
{
    fn publish(&mut self, snapshot: &MetricRecord) -> Result<(), PublishError> {
        self(snapshot)
    }
}

/// Forwards snapshots to a receiver over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<MetricRecord>,
}

impl ChannelPublisher {
    /// Create a publisher and the receiving end for its snapshots
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MetricRecord>) {
        let (tx, rx) = mpsc::unbounded();
        (Self { tx }, rx)
    }
}

impl Publish for ChannelPublisher {
    fn publish(&mut self, snapshot: &MetricRecord) -> Result<(), PublishError> {
        self.tx
            .unbounded_send(*snapshot)
            .map_err(|_| PublishError::Disconnected)
    }
}

/// A snapshot stamped with its capture time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampedSnapshot {
    pub captured_at: DateTime<Utc>,
    pub metrics: MetricRecord,
}

/// Writes each snapshot as one line of JSON
pub struct JsonLinesPublisher<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesPublisher<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Publish for JsonLinesPublisher<W> {
    fn publish(&mut self, snapshot: &MetricRecord) -> Result<(), PublishError> {
        let stamped = StampedSnapshot {
            captured_at: Utc::now(),
            metrics: *snapshot,
        };
        serde_json::to_writer(&mut self.writer, &stamped)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
