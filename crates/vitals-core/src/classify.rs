//! Severity classification of metric values
//!
//! Every displayable metric has a [`Thresholds`] triple of ascending boundaries.
//! A value at or below the first boundary is [`Tier::Good`], at or below the
//! second is [`Tier::Moderate`], at or below the third is [`Tier::Poor`], and
//! anything above the third is [`Tier::Bad`].
//!
//! # Example
//!
//! ```
//! use vitals_core::classify::{MetricKey, ThresholdTable, Tier};
//!
//! let table = ThresholdTable::default();
//! assert_eq!(table.classify(MetricKey::Cls, 0.1), Tier::Good);
//! assert_eq!(table.classify(MetricKey::Cls, 0.3), Tier::Poor);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ClassifyError, ThresholdError};

/// Severity tier, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Good,
    Moderate,
    Poor,
    Bad,
}

impl Tier {
    /// CSS class name used by the popup
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Good => "good",
            Tier::Moderate => "moderate",
            Tier::Poor => "poor",
            Tier::Bad => "bad",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a displayable metric
///
/// The string form matches the serialized field names of
/// [`MetricRecord`](crate::record::MetricRecord).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricKey {
    #[serde(rename = "ttfb")]
    Ttfb,
    #[serde(rename = "ttlb")]
    Ttlb,
    #[serde(rename = "dnsLookupTime")]
    DnsLookupTime,
    #[serde(rename = "fcp")]
    Fcp,
    #[serde(rename = "totalPageSize")]
    TotalPageSize,
    #[serde(rename = "numHttpsRequests")]
    NumHttpsRequests,
    #[serde(rename = "si")]
    SpeedIndex,
    #[serde(rename = "lcp")]
    Lcp,
    #[serde(rename = "fid")]
    Fid,
    #[serde(rename = "cls")]
    Cls,
    #[serde(rename = "maxFid")]
    MaxFid,
    #[serde(rename = "pageLoadTime")]
    PageLoadTime,
    #[serde(rename = "tti")]
    Tti,
}

impl MetricKey {
    /// Number of metric keys
    pub const COUNT: usize = 13;

    /// All keys, in popup display order
    pub const ALL: [MetricKey; Self::COUNT] = [
        MetricKey::Ttfb,
        MetricKey::Ttlb,
        MetricKey::DnsLookupTime,
        MetricKey::Fcp,
        MetricKey::TotalPageSize,
        MetricKey::NumHttpsRequests,
        MetricKey::SpeedIndex,
        MetricKey::Lcp,
        MetricKey::Fid,
        MetricKey::Cls,
        MetricKey::MaxFid,
        MetricKey::PageLoadTime,
        MetricKey::Tti,
    ];

    /// Short key used in serialized snapshots and settings
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::Ttfb => "ttfb",
            MetricKey::Ttlb => "ttlb",
            MetricKey::DnsLookupTime => "dnsLookupTime",
            MetricKey::Fcp => "fcp",
            MetricKey::TotalPageSize => "totalPageSize",
            MetricKey::NumHttpsRequests => "numHttpsRequests",
            MetricKey::SpeedIndex => "si",
            MetricKey::Lcp => "lcp",
            MetricKey::Fid => "fid",
            MetricKey::Cls => "cls",
            MetricKey::MaxFid => "maxFid",
            MetricKey::PageLoadTime => "pageLoadTime",
            MetricKey::Tti => "tti",
        }
    }

    /// Human-readable label
    pub fn display_name(&self) -> &'static str {
        match self {
            MetricKey::Ttfb => "TTFB",
            MetricKey::Ttlb => "TTLB",
            MetricKey::DnsLookupTime => "DNS Lookup Time",
            MetricKey::Fcp => "FCP",
            MetricKey::TotalPageSize => "Total Page Size",
            MetricKey::NumHttpsRequests => "Num of HTTPS Requests",
            MetricKey::SpeedIndex => "Speed Index",
            MetricKey::Lcp => "LCP",
            MetricKey::Fid => "FID",
            MetricKey::Cls => "CLS",
            MetricKey::MaxFid => "Max FID",
            MetricKey::PageLoadTime => "Page Load Time",
            MetricKey::Tti => "TTI",
        }
    }

    /// Display unit, if any
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            MetricKey::TotalPageSize => Some("bytes"),
            MetricKey::NumHttpsRequests | MetricKey::Cls => None,
            MetricKey::PageLoadTime => Some("s"),
            _ => Some("ms"),
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ClassifyError::UnknownMetric(s.to_string()))
    }
}

/// Three ascending boundaries splitting a metric's range into four tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Thresholds(pub [f64; 3]);

impl Thresholds {
    /// Build a validated triple for `key`
    pub fn new(key: MetricKey, bounds: [f64; 3]) -> Result<Self, ThresholdError> {
        let thresholds = Thresholds(bounds);
        thresholds.validate(key)?;
        Ok(thresholds)
    }

    fn validate(&self, key: MetricKey) -> Result<(), ThresholdError> {
        let [a, b, c] = self.0;
        if !(a.is_finite() && b.is_finite() && c.is_finite()) {
            return Err(ThresholdError::NotFinite { key });
        }
        if a > b || b > c {
            return Err(ThresholdError::NotAscending { key, bounds: self.0 });
        }
        Ok(())
    }

    /// Map a raw value to its tier; boundaries are inclusive upper edges
    pub fn tier(&self, value: f64) -> Tier {
        let [good, moderate, poor] = self.0;
        if value <= good {
            Tier::Good
        } else if value <= moderate {
            Tier::Moderate
        } else if value <= poor {
            Tier::Poor
        } else {
            Tier::Bad
        }
    }
}

/// Complete threshold table covering every [`MetricKey`]
///
/// Completeness is checked when the table is built, so [`classify`](Self::classify)
/// cannot miss a key at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    entries: [Thresholds; MetricKey::COUNT],
}

impl ThresholdTable {
    /// Build a table from `(key, thresholds)` pairs
    ///
    /// # Errors
    ///
    /// Returns [`ThresholdError::Missing`] for the first key without an entry,
    /// or a validation error for a malformed triple. Later duplicates win.
    pub fn from_entries<I>(entries: I) -> Result<Self, ThresholdError>
    where
        I: IntoIterator<Item = (MetricKey, [f64; 3])>,
    {
        let mut slots: [Option<Thresholds>; MetricKey::COUNT] = [None; MetricKey::COUNT];
        for (key, bounds) in entries {
            slots[key.index()] = Some(Thresholds::new(key, bounds)?);
        }

        let mut table = [Thresholds([0.0; 3]); MetricKey::COUNT];
        for key in MetricKey::ALL {
            table[key.index()] = slots[key.index()].ok_or(ThresholdError::Missing(key))?;
        }
        Ok(Self { entries: table })
    }

    /// Replace the thresholds of a single key
    pub fn with_override(mut self, key: MetricKey, bounds: [f64; 3]) -> Result<Self, ThresholdError> {
        self.entries[key.index()] = Thresholds::new(key, bounds)?;
        Ok(self)
    }

    /// Thresholds configured for `key`
    pub fn get(&self, key: MetricKey) -> Thresholds {
        self.entries[key.index()]
    }

    /// Classify a raw numeric value
    pub fn classify(&self, key: MetricKey, value: f64) -> Tier {
        self.get(key).tier(value)
    }

    /// Classify using a string key, failing loudly on unknown keys
    pub fn classify_named(&self, key: &str, value: f64) -> Result<Tier, ClassifyError> {
        let key: MetricKey = key.parse()?;
        Ok(self.classify(key, value))
    }

    /// Classify a formatted value such as `"0.125"` or `"1200.0"`
    ///
    /// The string is parsed back to a number first; placeholders like `"N/A"`
    /// are rejected rather than compared lexically.
    pub fn classify_formatted(&self, key: MetricKey, raw: &str) -> Result<Tier, ClassifyError> {
        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| !v.is_nan())
            .ok_or_else(|| ClassifyError::NotNumeric {
                key,
                raw: raw.to_string(),
            })?;
        Ok(self.classify(key, value))
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        // [Good, Moderate, Poor]
        Self {
            entries: [
                Thresholds([200.0, 300.0, 500.0]),
                Thresholds([1000.0, 2000.0, 3000.0]),
                Thresholds([100.0, 200.0, 300.0]),
                Thresholds([1000.0, 2000.0, 3000.0]),
                Thresholds([2_000_000.0, 3_000_000.0, 5_000_000.0]),
                Thresholds([50.0, 100.0, 150.0]),
                Thresholds([3500.0, 4500.0, 6000.0]),
                Thresholds([2500.0, 4000.0, 6000.0]),
                Thresholds([100.0, 300.0, 500.0]),
                Thresholds([0.1, 0.25, 0.5]),
                Thresholds([150.0, 300.0, 500.0]),
                Thresholds([2.5, 4.0, 6.0]),
                Thresholds([3000.0, 5000.0, 8000.0]),
            ],
        }
    }
}
