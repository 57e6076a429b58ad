//! One-shot navigation and resource timing reads
//!
//! Timing buffers may still be empty when the collector attaches, so reads are
//! gated on [`TimingSource::entry_count`] through [`poll_until_ready`].

use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::CollectorError;
use crate::retry::{poll_until_ready, RetryPolicy};
use crate::signal::{NavigationEntry, ResourceEntry, TimingSnapshot};

/// Host access to the performance timeline
pub trait TimingSource {
    /// Total number of entries currently buffered, of any type
    fn entry_count(&self) -> usize;

    /// The document's navigation entry, if recorded
    fn navigation(&self) -> Option<NavigationEntry>;

    /// All resource entries currently buffered
    fn resources(&self) -> Vec<ResourceEntry>;
}

/// Read navigation and resource timing as it stands now
pub fn snapshot<S: TimingSource + ?Sized>(source: &S) -> TimingSnapshot {
    TimingSnapshot {
        navigation: source.navigation(),
        resources: source.resources(),
    }
}

/// Wait until the timeline has entries, then read a snapshot
#[instrument(skip(source, sleep))]
pub async fn read_when_ready<S, F, Fut>(
    source: &S,
    policy: &RetryPolicy,
    sleep: F,
) -> Result<TimingSnapshot, CollectorError>
where
    S: TimingSource + ?Sized,
    F: FnMut(Duration) -> Fut,
    Fut: Future<Output = ()>,
{
    let timing = poll_until_ready(
        policy,
        || source.entry_count() > 0,
        || snapshot(source),
        sleep,
    )
    .await?;

    debug!(
        has_navigation = timing.navigation.is_some(),
        resources = timing.resources.len(),
        "Timing data read"
    );
    Ok(timing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct SlowTimeline {
        polls_until_ready: Cell<u32>,
    }

    impl TimingSource for SlowTimeline {
        fn entry_count(&self) -> usize {
            let left = self.polls_until_ready.get();
            if left == 0 {
                2
            } else {
                self.polls_until_ready.set(left - 1);
                0
            }
        }

        fn navigation(&self) -> Option<NavigationEntry> {
            Some(NavigationEntry {
                start_time: 0.0,
                request_start: 10.0,
                response_start: 60.0,
                response_end: 90.0,
                domain_lookup_start: 1.0,
                domain_lookup_end: 5.0,
            })
        }

        fn resources(&self) -> Vec<ResourceEntry> {
            vec![ResourceEntry {
                name: "https://a".into(),
                start_time: 40.0,
                transfer_size: 500,
            }]
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_buffered_entries() {
        let source = SlowTimeline {
            polls_until_ready: Cell::new(3),
        };
        let start = tokio::time::Instant::now();
        let timing = read_when_ready(&source, &RetryPolicy::default(), tokio::time::sleep)
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::from_millis(1500));
        assert!(timing.navigation.is_some());
        assert_eq!(timing.resources.len(), 1);
    }

    #[test]
    fn test_snapshot_reads_current_state() {
        let source = SlowTimeline {
            polls_until_ready: Cell::new(0),
        };
        let timing = snapshot(&source);
        assert_eq!(timing.navigation.map(|n| n.request_start), Some(10.0));
        assert_eq!(timing.resources[0].transfer_size, 500);
    }
}
