//! The per-page metrics snapshot
//!
//! [`MetricRecord`] is the canonical state for one page view. It is created when
//! the collector attaches, updated in place as signals arrive, and dropped with
//! the page. Every field starts unavailable (`None`); consumers receive copies.

use serde::{Deserialize, Serialize};

use crate::classify::MetricKey;

/// All measured and derived metrics for a single page view
///
/// Durations are in milliseconds except `page_load_time`, which is in seconds.
/// Serialized keys match [`MetricKey`] names; unavailable fields serialize as `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(rename = "fcp")]
    pub first_contentful_paint: Option<f64>,
    #[serde(rename = "lcp")]
    pub largest_contentful_paint: Option<f64>,
    #[serde(rename = "fid")]
    pub first_input_delay: Option<f64>,
    #[serde(rename = "maxFid")]
    pub max_first_input_delay: Option<f64>,
    #[serde(rename = "cls")]
    pub cumulative_layout_shift: Option<f64>,
    #[serde(rename = "tti")]
    pub time_to_interactive: Option<f64>,
    #[serde(rename = "pageLoadTime")]
    pub page_load_time: Option<f64>,
    #[serde(rename = "ttfb")]
    pub time_to_first_byte: Option<f64>,
    #[serde(rename = "ttlb")]
    pub time_to_last_byte: Option<f64>,
    #[serde(rename = "dnsLookupTime")]
    pub dns_lookup_time: Option<f64>,
    #[serde(rename = "totalPageSize")]
    pub total_page_size: Option<u64>,
    #[serde(rename = "numHttpsRequests")]
    pub num_https_requests: Option<u64>,
    #[serde(rename = "si")]
    pub speed_index: Option<f64>,
}

impl MetricRecord {
    /// A record with every metric unavailable
    pub fn new() -> Self {
        Self::default()
    }

    /// Numeric value of a metric, for classification
    pub fn value(&self, key: MetricKey) -> Option<f64> {
        match key {
            MetricKey::Ttfb => self.time_to_first_byte,
            MetricKey::Ttlb => self.time_to_last_byte,
            MetricKey::DnsLookupTime => self.dns_lookup_time,
            MetricKey::Fcp => self.first_contentful_paint,
            MetricKey::TotalPageSize => self.total_page_size.map(|v| v as f64),
            MetricKey::NumHttpsRequests => self.num_https_requests.map(|v| v as f64),
            MetricKey::SpeedIndex => self.speed_index,
            MetricKey::Lcp => self.largest_contentful_paint,
            MetricKey::Fid => self.first_input_delay,
            MetricKey::Cls => self.cumulative_layout_shift,
            MetricKey::MaxFid => self.max_first_input_delay,
            MetricKey::PageLoadTime => self.page_load_time,
            MetricKey::Tti => self.time_to_interactive,
        }
    }

    /// Number of metrics currently available
    pub fn available_count(&self) -> usize {
        MetricKey::ALL
            .iter()
            .filter(|key| self.value(**key).is_some())
            .count()
    }
}
