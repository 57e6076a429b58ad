//! Property tests for accumulation and classification
//!
//! Signals from independent sources can arrive in any order; these properties
//! check that the accumulated record does not depend on that order and that
//! classification is a pure, monotonic function of the value.

use proptest::prelude::*;
use vitals_core::collector::{apply_first_input, apply_layout_shift};
use vitals_core::derived::round_to;
use vitals_core::signal::{
    FirstInputEntry, LayoutShiftEntry, LcpEntry, NavigationEntry, PaintEntry, TimingSnapshot,
};
use vitals_core::{ChannelPublisher, MetricKey, MetricRecord, Signal, SignalCollector, ThresholdTable};

// ============================================================================
// Strategies
// ============================================================================

/// Layout shift scores on a 1/1024 grid, so every summation order is exact
fn shift_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0u32..1024).prop_map(|k| k as f64 / 1024.0), 0..40)
}

fn metric_key() -> impl Strategy<Value = MetricKey> {
    prop::sample::select(MetricKey::ALL.to_vec())
}

fn navigation_at(start_time: f64) -> NavigationEntry {
    NavigationEntry {
        start_time,
        request_start: start_time + 5.0,
        response_start: start_time + 50.0,
        response_end: start_time + 90.0,
        domain_lookup_start: start_time + 1.0,
        domain_lookup_end: start_time + 4.0,
    }
}

fn collector() -> SignalCollector<ChannelPublisher> {
    let (publisher, _rx) = ChannelPublisher::new();
    SignalCollector::new(0.0, publisher)
}

// ============================================================================
// Accumulation
// ============================================================================

proptest! {
    #[test]
    fn cls_is_the_sum_in_any_order(
        (values, shuffled) in shift_values().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        let expected: f64 = values.iter().sum();

        let mut record = MetricRecord::new();
        for value in &shuffled {
            let entry = LayoutShiftEntry { value: *value, had_recent_input: false };
            record = apply_layout_shift(record, &entry).unwrap();
        }

        if values.is_empty() {
            prop_assert_eq!(record.cumulative_layout_shift, None);
        } else {
            prop_assert_eq!(record.cumulative_layout_shift, Some(expected));
        }
    }

    #[test]
    fn recent_input_shifts_never_count(
        values in shift_values(),
        flags in prop::collection::vec(any::<bool>(), 40),
    ) {
        let mut record = MetricRecord::new();
        let mut expected = None;
        for (value, had_recent_input) in values.iter().zip(&flags) {
            let entry = LayoutShiftEntry { value: *value, had_recent_input: *had_recent_input };
            if let Some(next) = apply_layout_shift(record, &entry) {
                record = next;
            }
            if !had_recent_input {
                expected = Some(expected.unwrap_or(0.0) + value);
            }
        }
        prop_assert_eq!(record.cumulative_layout_shift, expected);
    }

    #[test]
    fn max_input_delay_is_order_independent(
        delays in prop::collection::vec(0u32..5000, 1..30).prop_shuffle()
    ) {
        let mut record = MetricRecord::new();
        let mut running_max = 0.0_f64;
        for (i, delay) in delays.iter().enumerate() {
            let start_time = 100.0 * i as f64;
            let entry = FirstInputEntry {
                start_time,
                processing_start: start_time + *delay as f64,
            };
            record = apply_first_input(record, &entry).unwrap();

            running_max = running_max.max(*delay as f64);
            prop_assert_eq!(record.max_first_input_delay, Some(running_max));
            prop_assert_eq!(record.first_input_delay, Some(*delay as f64));
        }
    }

    #[test]
    fn cls_and_page_size_are_non_decreasing(
        values in shift_values(),
        sizes in prop::collection::vec(0u64..100_000, 0..20),
    ) {
        let mut collector = collector();
        let mut last_cls = 0.0;
        for value in values {
            collector.handle(Signal::LayoutShift(vec![LayoutShiftEntry { value, had_recent_input: false }]));
            let cls = collector.record().cumulative_layout_shift.unwrap();
            prop_assert!(cls >= last_cls);
            last_cls = cls;
        }

        let mut resources = Vec::new();
        let mut last_size = 0;
        for (i, size) in sizes.into_iter().enumerate() {
            resources.push(vitals_core::signal::ResourceEntry {
                name: format!("https://cdn.example.com/{i}.js"),
                start_time: 10.0 * i as f64,
                transfer_size: size,
            });
            collector.handle(Signal::Timing(TimingSnapshot { navigation: None, resources: resources.clone() }));
            let total = collector.record().total_page_size.unwrap();
            prop_assert!(total >= last_size);
            last_size = total;
        }
        prop_assert_eq!(collector.record().num_https_requests.unwrap_or(0), resources.len() as u64);
    }

    #[test]
    fn speed_index_needs_paint_lcp_and_navigation(
        fcp in 0u32..10_000,
        lcp in 0u32..20_000,
        nav in 0u32..500,
        order in Just(vec![0usize, 1, 2]).prop_shuffle(),
    ) {
        let (fcp, lcp, nav) = (fcp as f64, lcp as f64, nav as f64);
        let mut collector = collector();

        for (step, which) in order.iter().enumerate() {
            let signal = match *which {
                0 => Signal::Paint(vec![PaintEntry { name: "first-contentful-paint".into(), start_time: fcp }]),
                1 => Signal::LargestContentfulPaint(vec![LcpEntry { start_time: lcp }]),
                _ => Signal::Timing(TimingSnapshot { navigation: Some(navigation_at(nav)), resources: vec![] }),
            };
            collector.handle(signal);

            if step < 2 {
                prop_assert_eq!(collector.record().speed_index, None);
            }
        }
        prop_assert_eq!(collector.record().speed_index, Some(round_to((fcp + lcp) / 2.0 - nav, 1)));
    }
}

// ============================================================================
// Classification
// ============================================================================

proptest! {
    #[test]
    fn classify_is_monotonic(key in metric_key(), a in -1.0e7..1.0e7f64, b in -1.0e7..1.0e7f64) {
        let table = ThresholdTable::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(table.classify(key, low) <= table.classify(key, high));
    }

    #[test]
    fn classify_is_idempotent(key in metric_key(), value in -1.0e7..1.0e7f64) {
        let table = ThresholdTable::default();
        prop_assert_eq!(table.classify(key, value), table.classify(key, value));
        prop_assert_eq!(
            table.classify_named(key.as_str(), value).unwrap(),
            table.classify(key, value)
        );
    }

    #[test]
    fn formatted_values_classify_like_raw_values(key in metric_key(), tenths in 0u32..10_000_000) {
        let table = ThresholdTable::default();
        let value = tenths as f64 / 10.0;
        let formatted = format!("{value:.1}");
        prop_assert_eq!(table.classify_formatted(key, &formatted).unwrap(), table.classify(key, value));
    }
}
