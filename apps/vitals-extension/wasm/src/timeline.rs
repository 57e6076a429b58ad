//! Browser-side timing source and timer

use js_sys::Promise;
use std::time::Duration;
use vitals_core::signal::{NavigationEntry, ResourceEntry};
use vitals_core::TimingSource;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::Performance;

use crate::entries::{decode, decode_all};

/// The page's performance timeline
pub struct BrowserTimeline {
    performance: Performance,
}

impl BrowserTimeline {
    pub fn new(performance: Performance) -> Self {
        Self { performance }
    }
}

impl TimingSource for BrowserTimeline {
    fn entry_count(&self) -> usize {
        self.performance.get_entries().length() as usize
    }

    fn navigation(&self) -> Option<NavigationEntry> {
        let entries = self.performance.get_entries_by_type("navigation");
        decode(&entries.get(0))
    }

    fn resources(&self) -> Vec<ResourceEntry> {
        decode_all(&self.performance.get_entries_by_type("resource"))
    }
}

/// Resolve after `duration` using `setTimeout`
pub async fn sleep(duration: Duration) {
    let ms = duration.as_millis().min(i32::MAX as u128) as i32;
    let promise = Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().map(|window| {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
        });
        if !matches!(scheduled, Some(Ok(_))) {
            // No timer available; resolve immediately rather than hang.
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = JsFuture::from(promise).await;
}
