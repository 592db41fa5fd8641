//! Position of the highlighted bar between the two handles.

use crate::config::RangeConfig;
use crate::controller::RangeState;
use serde::Serialize;

/// Bar placement as percentages of the track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub left_percent: f64,
    pub width_percent: f64,
}

impl Progress {
    pub fn right_percent(&self) -> f64 {
        100.0 - self.left_percent - self.width_percent
    }

    /// Inline style for the bar. `inset_px` keeps the bar inside the handles.
    pub fn style(&self, inset_px: u32) -> String {
        if inset_px == 0 {
            format!(
                "left: {}%; width: {}%;",
                self.left_percent, self.width_percent
            )
        } else {
            format!(
                "left: calc({}% + {}px); width: calc({}% - {}px);",
                self.left_percent,
                inset_px,
                self.width_percent,
                inset_px * 2
            )
        }
    }
}

/// Map `state` linearly onto `[0, 100]`.
pub fn render(state: RangeState, config: &RangeConfig) -> Progress {
    let left = percent_of(state.min, config.max_value);
    let right = percent_of(state.max, config.max_value);
    Progress {
        left_percent: left,
        width_percent: right - left,
    }
}

/// Share of `value` in `[0, max_value]`, in percent.
pub fn percent_of(value: u32, max_value: u32) -> f64 {
    if max_value == 0 {
        return 0.0;
    }
    f64::from(value) / f64::from(max_value) * 100.0
}
