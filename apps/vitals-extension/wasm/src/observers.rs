//! `PerformanceObserver` subscriptions feeding the collector channel
//!
//! Each observed category gets its own observer with `buffered: true`, so entries
//! recorded before attach are delivered in the first callback. Categories the
//! browser does not support are skipped.

use js_sys::{Array, Function, Object, Reflect};
use vitals_core::signal::{Signal, SignalKind};
use vitals_core::SignalSender;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{PerformanceObserver, PerformanceObserverEntryList};

use crate::entries::decode_all;

type ObserverCallback = Closure<dyn FnMut(PerformanceObserverEntryList, PerformanceObserver)>;

/// A live observer and the callback it holds
pub struct Subscription {
    observer: PerformanceObserver,
    _callback: ObserverCallback,
}

impl Subscription {
    pub fn disconnect(&self) {
        self.observer.disconnect();
    }
}

/// Subscribe every observer-backed category the browser supports
pub fn subscribe_all(sender: &SignalSender) -> Vec<Subscription> {
    let supported = supported_entry_types();

    SignalKind::OBSERVED
        .iter()
        .filter_map(|&kind| {
            let entry_type = kind.entry_type()?;
            if let Some(supported) = &supported {
                if !supported.iter().any(|t| t == entry_type) {
                    web_sys::console::log_1(
                        &format!("Performance entry type not supported: {entry_type}").into(),
                    );
                    return None;
                }
            }
            match subscribe(kind, entry_type, sender.clone()) {
                Ok(subscription) => Some(subscription),
                Err(e) => {
                    web_sys::console::log_1(
                        &format!("Could not observe {entry_type}: {e:?}").into(),
                    );
                    None
                }
            }
        })
        .collect()
}

fn subscribe(
    kind: SignalKind,
    entry_type: &str,
    sender: SignalSender,
) -> Result<Subscription, JsValue> {
    let callback: ObserverCallback = Closure::new(
        move |list: PerformanceObserverEntryList, _observer: PerformanceObserver| {
            let Some(signal) = to_signal(kind, &list.get_entries()) else {
                return;
            };
            if sender.send(signal).is_err() {
                web_sys::console::warn_1(&"Collector stopped; dropping entries".into());
            }
        },
    );
    let observer = PerformanceObserver::new(callback.as_ref().unchecked_ref())?;

    let options = Object::new();
    Reflect::set(&options, &"type".into(), &entry_type.into())?;
    Reflect::set(&options, &"buffered".into(), &JsValue::TRUE)?;
    let observe: Function = Reflect::get(&observer, &"observe".into())?.dyn_into()?;
    observe.call1(&observer, &options)?;

    Ok(Subscription {
        observer,
        _callback: callback,
    })
}

fn to_signal(kind: SignalKind, entries: &Array) -> Option<Signal> {
    let signal = match kind {
        SignalKind::Paint => Signal::Paint(decode_all(entries)),
        SignalKind::LargestContentfulPaint => Signal::LargestContentfulPaint(decode_all(entries)),
        SignalKind::FirstInput => Signal::FirstInput(decode_all(entries)),
        SignalKind::LayoutShift => Signal::LayoutShift(decode_all(entries)),
        SignalKind::LongTask => Signal::LongTask(decode_all(entries)),
        SignalKind::Timing | SignalKind::Load => return None,
    };
    Some(signal)
}

/// `PerformanceObserver.supportedEntryTypes`, or `None` when the browser does not expose it
fn supported_entry_types() -> Option<Vec<String>> {
    let constructor = Reflect::get(&js_sys::global(), &"PerformanceObserver".into()).ok()?;
    let types = Reflect::get(&constructor, &"supportedEntryTypes".into()).ok()?;
    let types: Array = types.dyn_into().ok()?;
    Some(types.iter().filter_map(|t| t.as_string()).collect())
}
