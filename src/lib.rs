//! Client-side widgets for the hotel catalog page: a dual-handle price range
//! slider and a persisted "favorite" toggle.
//!
//! The library holds the state logic; the binary mounts Yew components that
//! dispatch into it.

use log::warn;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod controller;
pub mod debounce;
pub mod favorite;
pub mod input;
pub mod listener;
pub mod progress;

pub use config::{ConfigError, RangeConfig, StepPolicy};
pub use controller::{Endpoint, InputChannel, RangeAction, RangeController, RangeState};
pub use progress::{render, Progress};

/// JavaScript entry point for pages that drive the slider themselves.
///
/// Takes a serialized `RangeState` (or `undefined` for a fresh range), the
/// endpoint and channel names and the proposed value, and returns the
/// reconciled state. Uses the default configuration.
///
/// An unusable state or tag leaves the range unchanged rather than failing.
#[wasm_bindgen]
pub fn reconcile_price_range(
    state_js: JsValue,
    endpoint: &str,
    proposed: f64,
    channel: &str,
) -> JsValue {
    let config = RangeConfig::default();
    let mut controller = RangeController::new(config);

    if !state_js.is_undefined() && !state_js.is_null() {
        match serde_wasm_bindgen::from_value::<RangeState>(state_js) {
            Ok(state) if state.is_valid_for(&config) => {
                controller.reconcile(Endpoint::Max, f64::from(state.max), InputChannel::Text);
                controller.reconcile(Endpoint::Min, f64::from(state.min), InputChannel::Text);
            }
            Ok(state) => warn!("Ignoring out-of-range state {:?}", state),
            Err(e) => warn!("Failed to deserialize range state: {}", e),
        }
    }

    match (endpoint.parse::<Endpoint>(), channel.parse::<InputChannel>()) {
        (Ok(endpoint), Ok(channel)) => {
            controller.reconcile(endpoint, proposed, channel);
        }
        (Err(e), _) | (_, Err(e)) => warn!("{}", e),
    }

    serde_wasm_bindgen::to_value(&controller.state()).unwrap_or(JsValue::NULL)
}
