//! Popup-side classification helpers
//!
//! Pure functions over JSON inputs; the `#[wasm_bindgen]` wrappers in the crate
//! root only convert between `JsValue` and these.

use vitals_core::display::{self, MetricRow};
use vitals_core::{MetricRecord, Settings, ThresholdTable, Tier};

/// Threshold table from stored settings JSON, or the defaults
pub fn threshold_table(settings_json: Option<&str>) -> Result<ThresholdTable, String> {
    let Some(json) = settings_json else {
        return Ok(ThresholdTable::default());
    };
    Settings::from_json(json)
        .and_then(|settings| settings.threshold_table())
        .map_err(|e| format!("{e:#}"))
}

/// Classify one metric by its short key
pub fn classify(key: &str, value: f64, settings_json: Option<&str>) -> Result<Tier, String> {
    threshold_table(settings_json)?
        .classify_named(key, value)
        .map_err(|e| e.to_string())
}

/// Rows for a published snapshot
pub fn rows(record: &MetricRecord, settings_json: Option<&str>) -> Result<Vec<MetricRow>, String> {
    Ok(display::rows(record, &threshold_table(settings_json)?))
}
