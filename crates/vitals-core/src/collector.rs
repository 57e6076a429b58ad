//! Accumulation of timing signals into the page's [`MetricRecord`]
//!
//! The [`SignalCollector`] is the single writer of the record. Signal sources
//! never touch it directly: each source owns a cloned [`SignalSender`] and pushes
//! typed [`Signal`] batches, and [`SignalCollector::run`] drains them one at a
//! time. Sources are independent, so no arrival order between categories is
//! assumed.
//!
//! Per-entry updates are the pure `apply_*` functions in this module; the
//! collector composes them with the derived-metric refresh and a publish.
//!
//! # Example
//!
//! ```
//! use vitals_core::collector::{channel, SignalCollector};
//! use vitals_core::publisher::ChannelPublisher;
//! use vitals_core::signal::{LayoutShiftEntry, Signal};
//!
//! let (publisher, _snapshots) = ChannelPublisher::new();
//! let collector = SignalCollector::new(0.0, publisher);
//! let (tx, rx) = channel();
//!
//! tx.send(Signal::LayoutShift(vec![LayoutShiftEntry { value: 0.25, had_recent_input: false }]))
//!     .unwrap();
//! drop(tx);
//!
//! let record = futures::executor::block_on(collector.run(rx));
//! assert_eq!(record.cumulative_layout_shift, Some(0.25));
//! ```

use futures::channel::mpsc;
use std::collections::HashSet;
use futures::StreamExt;
use tracing::{debug, instrument, trace, warn};

use crate::derived::{page_load_seconds, round_to, speed_index};
use crate::error::CollectorError;
use crate::publisher::Publish;
use crate::record::MetricRecord;
use crate::signal::{
    FirstInputEntry, LayoutShiftEntry, LcpEntry, LongTaskEntry, NavigationEntry, PaintEntry,
    ResourceEntry, Signal, TimingSnapshot, FIRST_CONTENTFUL_PAINT, MAIN_FRAME_ATTRIBUTION,
};

/// Set first-contentful-paint from a `first-contentful-paint` paint entry
pub fn apply_paint(record: MetricRecord, entry: &PaintEntry) -> Option<MetricRecord> {
    if entry.name != FIRST_CONTENTFUL_PAINT {
        return None;
    }
    Some(MetricRecord {
        first_contentful_paint: Some(round_to(entry.start_time, 1)),
        ..record
    })
}

/// Replace largest-contentful-paint with the latest candidate
pub fn apply_lcp(record: MetricRecord, entry: &LcpEntry) -> Option<MetricRecord> {
    Some(MetricRecord {
        largest_contentful_paint: Some(round_to(entry.start_time, 1)),
        ..record
    })
}

/// Record an input delay and fold it into the running maximum
pub fn apply_first_input(record: MetricRecord, entry: &FirstInputEntry) -> Option<MetricRecord> {
    let delay = entry.delay();
    if !delay.is_finite() {
        return None;
    }
    let delay = round_to(delay, 1);
    let max = record
        .max_first_input_delay
        .map_or(delay, |previous| previous.max(delay));
    Some(MetricRecord {
        first_input_delay: Some(delay),
        max_first_input_delay: Some(max),
        ..record
    })
}

/// Add a layout shift not caused by recent user input
pub fn apply_layout_shift(record: MetricRecord, entry: &LayoutShiftEntry) -> Option<MetricRecord> {
    // Negative or non-finite scores would break the non-decreasing total.
    if entry.had_recent_input || !entry.value.is_finite() || entry.value < 0.0 {
        return None;
    }
    let total = record.cumulative_layout_shift.unwrap_or(0.0) + entry.value;
    Some(MetricRecord {
        cumulative_layout_shift: Some(total),
        ..record
    })
}

/// Take time-to-interactive from the first main-frame long task
///
/// Later main-frame tasks still qualify (and are published) but keep the
/// first value.
pub fn apply_long_task(record: MetricRecord, entry: &LongTaskEntry) -> Option<MetricRecord> {
    if entry.name != MAIN_FRAME_ATTRIBUTION {
        return None;
    }
    Some(MetricRecord {
        time_to_interactive: record
            .time_to_interactive
            .or(Some(round_to(entry.start_time, 1))),
        ..record
    })
}

/// Derive byte timings from the navigation entry and accumulate resource totals
pub fn apply_timing(
    record: MetricRecord,
    navigation: Option<&NavigationEntry>,
    resources: &[ResourceEntry],
) -> MetricRecord {
    let mut next = record;
    if let Some(nav) = navigation {
        next.time_to_first_byte = Some(round_to(nav.response_start - nav.request_start, 1));
        next.time_to_last_byte = Some(round_to(nav.response_end - nav.request_start, 1));
        next.dns_lookup_time = Some(round_to(nav.domain_lookup_end - nav.domain_lookup_start, 1));
    }

    let bytes: u64 = resources.iter().map(|r| r.transfer_size).sum();
    let secure = resources.iter().filter(|r| r.is_https()).count() as u64;
    next.total_page_size = Some(record.total_page_size.unwrap_or(0).saturating_add(bytes));
    next.num_https_requests = Some(record.num_https_requests.unwrap_or(0).saturating_add(secure));
    next
}

/// Set the page load duration from the `load` event time
pub fn apply_load(record: MetricRecord, attached_at_ms: f64, load_at_ms: f64) -> MetricRecord {
    MetricRecord {
        page_load_time: Some(page_load_seconds(attached_at_ms, load_at_ms)),
        ..record
    }
}

/// Create the dispatch channel between signal sources and the collector
pub fn channel() -> (SignalSender, SignalReceiver) {
    let (tx, rx) = mpsc::unbounded();
    (SignalSender { tx }, SignalReceiver { rx })
}

/// Handle used by a signal source to push batches to the collector
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: mpsc::UnboundedSender<Signal>,
}

impl SignalSender {
    /// Queue a signal batch
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Closed`] if the collector is no longer running.
    pub fn send(&self, signal: Signal) -> Result<(), CollectorError> {
        self.tx
            .unbounded_send(signal)
            .map_err(|_| CollectorError::Closed)
    }
}

/// Receiving end drained by [`SignalCollector::run`]
#[derive(Debug)]
pub struct SignalReceiver {
    rx: mpsc::UnboundedReceiver<Signal>,
}

/// Raw timings needed by derived metrics, kept at full precision
#[derive(Debug, Clone, Copy, Default)]
struct PaintTimeline {
    fcp_start: Option<f64>,
    lcp_start: Option<f64>,
    navigation_start: Option<f64>,
}

/// Single owner of a page's [`MetricRecord`]
pub struct SignalCollector<P: Publish> {
    record: MetricRecord,
    timeline: PaintTimeline,
    attached_at_ms: f64,
    counted_resources: HashSet<(String, u64)>,
    publisher: P,
    publish_count: u64,
    delivery_failures: u64,
}

impl<P: Publish> SignalCollector<P> {
    /// Attach a collector at `attached_at_ms` on the host clock
    pub fn new(attached_at_ms: f64, publisher: P) -> Self {
        Self {
            record: MetricRecord::new(),
            timeline: PaintTimeline::default(),
            attached_at_ms,
            counted_resources: HashSet::new(),
            publisher,
            publish_count: 0,
            delivery_failures: 0,
        }
    }

    /// Current state of the record
    pub fn record(&self) -> &MetricRecord {
        &self.record
    }

    /// Number of snapshots handed to the publisher
    pub fn publish_count(&self) -> u64 {
        self.publish_count
    }

    /// Number of snapshots the publisher failed to deliver
    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures
    }

    /// Apply one signal batch, publishing after every qualifying update
    pub fn handle(&mut self, signal: Signal) {
        let kind = signal.kind();
        trace!(%kind, "Handling signal");

        match signal {
            Signal::Paint(entries) => {
                for entry in &entries {
                    if let Some(next) = apply_paint(self.record, entry) {
                        self.timeline.fcp_start = Some(entry.start_time);
                        self.commit(next);
                    }
                }
            }
            Signal::LargestContentfulPaint(entries) => {
                for entry in &entries {
                    if let Some(next) = apply_lcp(self.record, entry) {
                        self.timeline.lcp_start = Some(entry.start_time);
                        self.commit(next);
                    }
                }
            }
            Signal::FirstInput(entries) => {
                for entry in &entries {
                    if let Some(next) = apply_first_input(self.record, entry) {
                        self.commit(next);
                    }
                }
            }
            Signal::LayoutShift(entries) => {
                for entry in &entries {
                    if let Some(next) = apply_layout_shift(self.record, entry) {
                        self.commit(next);
                    }
                }
            }
            Signal::LongTask(entries) => {
                for entry in &entries {
                    if let Some(next) = apply_long_task(self.record, entry) {
                        self.commit(next);
                    }
                }
            }
            Signal::Timing(timing) => self.handle_timing(timing),
            Signal::Load { at_ms } => {
                let next = apply_load(self.record, self.attached_at_ms, at_ms);
                self.commit(next);
            }
        }
    }

    fn handle_timing(&mut self, timing: TimingSnapshot) {
        let TimingSnapshot {
            navigation,
            resources,
        } = timing;

        // The buffer may have been cleared and refilled since the last read, so
        // entries are matched by identity rather than by position.
        let buffered = resources.len();
        let fresh: Vec<ResourceEntry> = resources
            .into_iter()
            .filter(|r| self.counted_resources.insert(r.key()))
            .collect();

        if let Some(nav) = &navigation {
            self.timeline.navigation_start = Some(nav.start_time);
        }

        debug!(buffered, fresh = fresh.len(), "Accumulating resource timing");
        let next = apply_timing(self.record, navigation.as_ref(), &fresh);
        self.commit(next);
    }

    /// Install an updated record, refresh derived values, and publish
    fn commit(&mut self, next: MetricRecord) {
        self.record = next;
        if let Some(si) = speed_index(
            self.timeline.fcp_start,
            self.timeline.lcp_start,
            self.timeline.navigation_start,
        ) {
            self.record.speed_index = Some(si);
        }
        debug!(available = self.record.available_count(), "Metric record updated");
        self.publish();
    }

    fn publish(&mut self) {
        self.publish_count += 1;
        if let Err(e) = self.publisher.publish(&self.record) {
            self.delivery_failures += 1;
            warn!(error = %e, "Snapshot delivery failed; collection continues");
        }
    }

    /// Drain signals until every [`SignalSender`] is dropped
    ///
    /// Returns the final record.
    #[instrument(skip_all)]
    pub async fn run(mut self, mut signals: SignalReceiver) -> MetricRecord {
        debug!("Signal collector started");
        while let Some(signal) = signals.rx.next().await {
            self.handle(signal);
        }
        debug!(
            publishes = self.publish_count,
            failures = self.delivery_failures,
            "All signal sources closed"
        );
        self.record
    }
}
