//! Popup rows for a metrics snapshot
//!
//! Produces one row per metric in the popup's fixed order, with the value
//! formatted for display and its severity tier.

use serde::{Deserialize, Serialize};

use crate::classify::{MetricKey, ThresholdTable, Tier};
use crate::record::MetricRecord;

/// Placeholder shown for metrics that have not been observed
pub const UNAVAILABLE: &str = "N/A";

/// A single rendered metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub key: MetricKey,
    pub name: String,
    pub value: String,
    /// `None` while the metric is unavailable
    pub tier: Option<Tier>,
}

/// Format a value with its unit and display precision
pub fn format_value(key: MetricKey, value: f64) -> String {
    let number = match key {
        MetricKey::Cls => format!("{value:.3}"),
        MetricKey::TotalPageSize | MetricKey::NumHttpsRequests => format!("{value:.0}"),
        _ => format!("{value:.1}"),
    };
    match key.unit() {
        Some(unit) => format!("{number} {unit}"),
        None => number,
    }
}

/// Render every metric of `record`, classified against `table`
pub fn rows(record: &MetricRecord, table: &ThresholdTable) -> Vec<MetricRow> {
    MetricKey::ALL
        .iter()
        .map(|&key| {
            let value = record.value(key);
            MetricRow {
                key,
                name: key.display_name().to_string(),
                value: value.map_or_else(|| UNAVAILABLE.to_string(), |v| format_value(key, v)),
                tier: value.map(|v| table.classify(key, v)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_value_units() {
        assert_eq!(format_value(MetricKey::Fcp, 1200.0), "1200.0 ms");
        assert_eq!(format_value(MetricKey::Cls, 0.125), "0.125");
        assert_eq!(format_value(MetricKey::TotalPageSize, 800.0), "800 bytes");
        assert_eq!(format_value(MetricKey::NumHttpsRequests, 3.0), "3");
        assert_eq!(format_value(MetricKey::PageLoadTime, 1.2), "1.2 s");
    }

    #[test]
    fn test_rows_follow_popup_order() {
        let rows = rows(&MetricRecord::new(), &ThresholdTable::default());
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "TTFB",
                "TTLB",
                "DNS Lookup Time",
                "FCP",
                "Total Page Size",
                "Num of HTTPS Requests",
                "Speed Index",
                "LCP",
                "FID",
                "CLS",
                "Max FID",
                "Page Load Time",
                "TTI",
            ]
        );
        assert!(rows.iter().all(|r| r.value == UNAVAILABLE && r.tier.is_none()));
    }

    #[test]
    fn test_rows_classify_available_values() {
        let record = MetricRecord {
            first_contentful_paint: Some(2500.0),
            cumulative_layout_shift: Some(0.05),
            total_page_size: Some(6_000_000),
            ..MetricRecord::new()
        };
        let rows = rows(&record, &ThresholdTable::default());

        let fcp = rows.iter().find(|r| r.key == MetricKey::Fcp).unwrap();
        assert_eq!(fcp.value, "2500.0 ms");
        assert_eq!(fcp.tier, Some(Tier::Poor));

        let cls = rows.iter().find(|r| r.key == MetricKey::Cls).unwrap();
        assert_eq!(cls.value, "0.050");
        assert_eq!(cls.tier, Some(Tier::Good));

        let size = rows.iter().find(|r| r.key == MetricKey::TotalPageSize).unwrap();
        assert_eq!(size.tier, Some(Tier::Bad));
    }
}
