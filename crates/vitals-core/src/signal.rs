//! Typed timing signals pushed into the collector
//!
//! Each entry type mirrors the subset of the browser's `PerformanceEntry.toJSON()`
//! payload the collector consumes, so host code can deserialize entries directly.
//! Unknown fields are ignored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the paint entry that carries first-contentful-paint
pub const FIRST_CONTENTFUL_PAINT: &str = "first-contentful-paint";

/// Long-task attribution name for work on the page's own main frame
pub const MAIN_FRAME_ATTRIBUTION: &str = "self";

/// A `paint` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintEntry {
    pub name: String,
    pub start_time: f64,
}

/// A `largest-contentful-paint` entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcpEntry {
    pub start_time: f64,
}

/// A `first-input` entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstInputEntry {
    pub start_time: f64,
    pub processing_start: f64,
}

impl FirstInputEntry {
    /// Delay between the input event and the start of its processing
    pub fn delay(&self) -> f64 {
        self.processing_start - self.start_time
    }
}

/// A `layout-shift` entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutShiftEntry {
    pub value: f64,
    #[serde(default)]
    pub had_recent_input: bool,
}

/// A `longtask` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTaskEntry {
    pub name: String,
    pub start_time: f64,
}

/// The document's `navigation` timing entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEntry {
    #[serde(default)]
    pub start_time: f64,
    pub request_start: f64,
    pub response_start: f64,
    pub response_end: f64,
    pub domain_lookup_start: f64,
    pub domain_lookup_end: f64,
}

/// A `resource` timing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    pub name: String,
    /// Fetch start; with `name` this identifies the fetch across timeline reads
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub transfer_size: u64,
}

impl ResourceEntry {
    /// Identity of this fetch, stable across repeated reads of the buffer
    pub fn key(&self) -> (String, u64) {
        (self.name.clone(), self.start_time.to_bits())
    }

    /// Whether the resource was fetched over a secure scheme
    pub fn is_https(&self) -> bool {
        self.name.starts_with("https://")
    }
}

/// Navigation and resource timing read at a single point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingSnapshot {
    pub navigation: Option<NavigationEntry>,
    pub resources: Vec<ResourceEntry>,
}

/// A batch of newly available entries from one signal source
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Paint(Vec<PaintEntry>),
    LargestContentfulPaint(Vec<LcpEntry>),
    FirstInput(Vec<FirstInputEntry>),
    LayoutShift(Vec<LayoutShiftEntry>),
    LongTask(Vec<LongTaskEntry>),
    Timing(TimingSnapshot),
    /// The page's `load` event fired at `at_ms` on the host clock
    Load { at_ms: f64 },
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Paint(_) => SignalKind::Paint,
            Signal::LargestContentfulPaint(_) => SignalKind::LargestContentfulPaint,
            Signal::FirstInput(_) => SignalKind::FirstInput,
            Signal::LayoutShift(_) => SignalKind::LayoutShift,
            Signal::LongTask(_) => SignalKind::LongTask,
            Signal::Timing(_) => SignalKind::Timing,
            Signal::Load { .. } => SignalKind::Load,
        }
    }
}

/// Signal source category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Paint,
    LargestContentfulPaint,
    FirstInput,
    LayoutShift,
    LongTask,
    Timing,
    Load,
}

impl SignalKind {
    /// Observer entry type for categories backed by a `PerformanceObserver`
    pub fn entry_type(&self) -> Option<&'static str> {
        match self {
            SignalKind::Paint => Some("paint"),
            SignalKind::LargestContentfulPaint => Some("largest-contentful-paint"),
            SignalKind::FirstInput => Some("first-input"),
            SignalKind::LayoutShift => Some("layout-shift"),
            SignalKind::LongTask => Some("longtask"),
            SignalKind::Timing | SignalKind::Load => None,
        }
    }

    /// Categories subscribed through a `PerformanceObserver`
    pub const OBSERVED: [SignalKind; 5] = [
        SignalKind::Paint,
        SignalKind::LargestContentfulPaint,
        SignalKind::FirstInput,
        SignalKind::LayoutShift,
        SignalKind::LongTask,
    ];
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entry_type() {
            Some(entry_type) => f.write_str(entry_type),
            None if *self == SignalKind::Timing => f.write_str("timing"),
            None => f.write_str("load"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_deserialize_from_browser_json() {
        let json = r#"{"name":"first-input","entryType":"first-input","startTime":1000.5,"duration":8,"processingStart":1012.25,"processingEnd":1013,"cancelable":true}"#;
        let entry: FirstInputEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.delay(), 11.75);

        let json = r#"{"name":"","entryType":"layout-shift","startTime":10,"duration":0,"value":0.05,"hadRecentInput":false,"lastInputTime":0}"#;
        let entry: LayoutShiftEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.value, 0.05);
        assert!(!entry.had_recent_input);

        let json = r#"{"name":"https://cdn.example.com/app.js","entryType":"resource","startTime":12,"transferSize":5120,"initiatorType":"script"}"#;
        let entry: ResourceEntry = serde_json::from_str(json).unwrap();
        assert!(entry.is_https());
        assert_eq!(entry.transfer_size, 5120);
    }

    #[test]
    fn test_navigation_entry_deserializes() {
        let json = r#"{"name":"https://example.com/","entryType":"navigation","startTime":0,"requestStart":20.5,"responseStart":120.5,"responseEnd":180,"domainLookupStart":2,"domainLookupEnd":12}"#;
        let entry: NavigationEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.start_time, 0.0);
        assert_eq!(entry.response_start - entry.request_start, 100.0);
    }

    #[test]
    fn test_resource_scheme_detection() {
        let secure = ResourceEntry { name: "https://a".into(), start_time: 0.0, transfer_size: 1 };
        let plain = ResourceEntry { name: "http://b".into(), start_time: 0.0, transfer_size: 1 };
        let tricky = ResourceEntry { name: "data:https://".into(), start_time: 0.0, transfer_size: 1 };
        assert!(secure.is_https());
        assert!(!plain.is_https());
        assert!(!tricky.is_https());
    }

    #[test]
    fn test_signal_kinds() {
        assert_eq!(Signal::Load { at_ms: 1.0 }.kind(), SignalKind::Load);
        assert_eq!(Signal::Paint(vec![]).kind().entry_type(), Some("paint"));
        assert_eq!(SignalKind::LongTask.to_string(), "longtask");
        assert_eq!(SignalKind::Timing.to_string(), "timing");
        assert!(SignalKind::OBSERVED.iter().all(|k| k.entry_type().is_some()));
    }
}
