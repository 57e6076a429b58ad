//! Snapshot delivery to a JavaScript callback

use js_sys::{Function, Object, Reflect};
use serde::Serialize;
use vitals_core::{MetricRecord, Publish, PublishError};
use wasm_bindgen::prelude::*;

/// Message type the popup listens for
pub const MESSAGE_TYPE: &str = "performanceData";

/// Calls a JS function with `{ type: "performanceData", data: <record> }`
pub struct JsPublisher {
    callback: Function,
}

impl JsPublisher {
    pub fn new(callback: Function) -> Self {
        Self { callback }
    }
}

impl Publish for JsPublisher {
    fn publish(&mut self, snapshot: &MetricRecord) -> Result<(), PublishError> {
        let message = to_message(snapshot).map_err(|e| PublishError::Rejected(format!("{e:?}")))?;
        self.callback
            .call1(&JsValue::NULL, &message)
            .map_err(|e| PublishError::Rejected(format!("{e:?}")))?;
        Ok(())
    }
}

fn to_message(snapshot: &MetricRecord) -> Result<JsValue, JsValue> {
    // Unavailable metrics go out as `null`, not `undefined`
    let data = snapshot.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?;
    let message = Object::new();
    Reflect::set(&message, &"type".into(), &MESSAGE_TYPE.into())?;
    Reflect::set(&message, &"data".into(), &data)?;
    Ok(message.into())
}
