//! WASM bindings for the page vitals extension
//!
//! The content script attaches a [`PageVitals`] collector to the page; every
//! metric update is posted through the supplied callback. The popup uses the
//! free functions to classify and render the latest snapshot.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { PageVitals, metricRows } from './pkg/vitals_extension_wasm.js';
//!
//! await init();
//!
//! // Content script
//! const vitals = PageVitals.attach((message) => chrome.runtime.sendMessage(message));
//! chrome.runtime.onMessage.addListener((msg) => {
//!   if (msg.type === 'refreshData') vitals.requestRefresh();
//!   if (msg.type === 'settingsUpdated') vitals.updateSettings(msg.settings);
//! });
//!
//! // Popup
//! const rows = metricRows(message.data, storedSettingsJson);
//! ```

pub mod entries;
pub mod observers;
pub mod popup;
pub mod publisher;
pub mod timeline;

use std::cell::Cell;
use std::rc::Rc;

use vitals_core::timing::read_when_ready;
use vitals_core::{channel, MetricRecord, RetryPolicy, Settings, Signal, SignalCollector, SignalSender};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, Performance};

pub use publisher::JsPublisher;
pub use timeline::BrowserTimeline;

use observers::Subscription;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// A collector attached to the current page
#[wasm_bindgen]
pub struct PageVitals {
    performance: Performance,
    sender: SignalSender,
    retry: Rc<Cell<RetryPolicy>>,
    subscriptions: Vec<Subscription>,
    _on_load: Option<Closure<dyn FnMut(Event)>>,
}

#[wasm_bindgen]
impl PageVitals {
    /// Start collecting; `publish` receives `{ type, data }` after every update
    pub fn attach(publish: js_sys::Function) -> Result<PageVitals, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let performance = window
            .performance()
            .ok_or_else(|| JsValue::from_str("Performance API unavailable"))?;

        let (sender, receiver) = channel();
        let collector = SignalCollector::new(performance.now(), JsPublisher::new(publish));
        spawn_local(async move {
            collector.run(receiver).await;
        });

        let subscriptions = observers::subscribe_all(&sender);
        let retry = Rc::new(Cell::new(RetryPolicy::default()));

        let on_load = match load_hook(window.document().map(|d| d.ready_state()).as_deref()) {
            LoadHook::ReadTimingNow => {
                // The load event already fired before attach, so its time is
                // unknown and page load time stays unavailable.
                spawn_timing_read(performance.clone(), sender.clone(), retry.get());
                None
            }
            LoadHook::Listen => {
                let performance = performance.clone();
                let sender = sender.clone();
                let retry = retry.clone();
                let listener = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                    if sender.send(Signal::Load { at_ms: performance.now() }).is_ok() {
                        spawn_timing_read(performance.clone(), sender.clone(), retry.get());
                    }
                });
                window.add_event_listener_with_callback("load", listener.as_ref().unchecked_ref())?;
                Some(listener)
            }
        };

        Ok(PageVitals {
            performance,
            sender,
            retry,
            subscriptions,
            _on_load: on_load,
        })
    }

    /// Re-read navigation and resource timing
    #[wasm_bindgen(js_name = requestRefresh)]
    pub fn request_refresh(&self) {
        spawn_timing_read(self.performance.clone(), self.sender.clone(), self.retry.get());
    }

    /// Apply stored settings JSON, then refresh
    #[wasm_bindgen(js_name = updateSettings)]
    pub fn update_settings(&self, settings_json: &str) -> Result<(), JsValue> {
        let settings = Settings::from_json(settings_json)
            .map_err(|e| JsValue::from_str(&format!("{e:#}")))?;
        settings
            .threshold_table()
            .map_err(|e| JsValue::from_str(&format!("{e:#}")))?;
        self.retry.set(settings.retry_policy());
        self.request_refresh();
        Ok(())
    }

    /// Stop observing; published snapshots stop once pending reads finish
    pub fn detach(&self) {
        for subscription in &self.subscriptions {
            subscription.disconnect();
        }
    }
}

/// How attach hooks into the page's `load` event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadHook {
    /// Wait for `load`, then record page load time and read timing
    Listen,
    /// The document already completed; only read timing
    ReadTimingNow,
}

fn load_hook(ready_state: Option<&str>) -> LoadHook {
    match ready_state {
        Some("complete") => LoadHook::ReadTimingNow,
        _ => LoadHook::Listen,
    }
}

fn spawn_timing_read(performance: Performance, sender: SignalSender, policy: RetryPolicy) {
    spawn_local(async move {
        let timeline = BrowserTimeline::new(performance);
        match read_when_ready(&timeline, &policy, timeline::sleep).await {
            Ok(timing) => {
                if sender.send(Signal::Timing(timing)).is_err() {
                    web_sys::console::warn_1(&"Collector stopped; dropping timing read".into());
                }
            }
            Err(e) => web_sys::console::warn_1(&format!("Timing read failed: {e}").into()),
        }
    });
}

/// Classify a metric value; returns "good", "moderate", "poor" or "bad"
#[wasm_bindgen(js_name = classifyMetric)]
pub fn classify_metric(
    key: &str,
    value: f64,
    settings_json: Option<String>,
) -> Result<String, JsValue> {
    popup::classify(key, value, settings_json.as_deref())
        .map(|tier| tier.as_str().to_string())
        .map_err(|e| JsValue::from_str(&e))
}

/// Display rows for a published snapshot
#[wasm_bindgen(js_name = metricRows)]
pub fn metric_rows(snapshot: JsValue, settings_json: Option<String>) -> Result<JsValue, JsValue> {
    let record: MetricRecord = serde_wasm_bindgen::from_value(snapshot)
        .map_err(|e| JsValue::from_str(&format!("Invalid snapshot: {}", e)))?;
    let rows = popup::rows(&record, settings_json.as_deref()).map_err(|e| JsValue::from_str(&e))?;

    serde_wasm_bindgen::to_value(&rows)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
