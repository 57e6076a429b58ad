//! Conversion of browser performance entries into typed entries

use js_sys::Array;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::PerformanceEntry;

/// Decode one entry through its `toJSON()` form
///
/// Entries that fail to decode are logged and dropped.
pub fn decode<T: DeserializeOwned>(value: &JsValue) -> Option<T> {
    let entry = value.dyn_ref::<PerformanceEntry>()?;
    match serde_wasm_bindgen::from_value(entry.to_json().into()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            web_sys::console::warn_1(
                &format!("Skipping {} entry: {}", entry.entry_type(), e).into(),
            );
            None
        }
    }
}

/// Decode every entry of a list, keeping the list's order
pub fn decode_all<T: DeserializeOwned>(entries: &Array) -> Vec<T> {
    entries.iter().filter_map(|value| decode(&value)).collect()
}
