//! Translation of raw interactions into controller proposals.
//!
//! Nothing in here touches the DOM; the components feed in plain numbers and
//! strings and dispatch whatever comes out.

use crate::config::RangeConfig;
use crate::controller::{Endpoint, InputChannel};
use once_cell::sync::Lazy;
use regex::Regex;

// Optional sign followed by the leading digits, the rest is ignored.
static LEADING_INT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").unwrap());

// ──────────────────────────────────────────────────────────────────────────────
// Drag

/// Horizontal extent of the slider track in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    pub left: f64,
    pub width: f64,
}

/// Everything the move and end handlers need to know about one drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub endpoint: Endpoint,
    pub channel: InputChannel,
    pub track: TrackGeometry,
}

impl DragSession {
    /// Proposed value for a pointer at `client_x`, `None` on a collapsed track.
    pub fn proposal(&self, client_x: f64, max_value: u32) -> Option<f64> {
        if self.track.width.is_nan() || self.track.width <= 0.0 {
            return None;
        }
        let ratio = (client_x - self.track.left) / self.track.width;
        Some((ratio * f64::from(max_value)).round())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

impl DragState {
    /// Start a session; a press during an active drag is ignored.
    pub fn press(self, session: DragSession) -> Self {
        match self {
            DragState::Idle => DragState::Dragging(session),
            dragging @ DragState::Dragging(_) => dragging,
        }
    }

    pub fn release(self) -> Self {
        DragState::Idle
    }

    pub fn session(&self) -> Option<DragSession> {
        match self {
            DragState::Idle => None,
            DragState::Dragging(session) => Some(*session),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging(_))
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Keyboard

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Decrease,
    Increase,
}

impl StepDirection {
    /// Arrow keys recognized on a slider handle.
    pub fn from_handle_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "ArrowDown" => Some(StepDirection::Decrease),
            "ArrowRight" | "ArrowUp" => Some(StepDirection::Increase),
            _ => None,
        }
    }

    /// Arrow keys recognized on a text field; left/right stay with the caret.
    pub fn from_field_key(key: &str) -> Option<Self> {
        match key {
            "ArrowDown" => Some(StepDirection::Decrease),
            "ArrowUp" => Some(StepDirection::Increase),
            _ => None,
        }
    }

    /// `current` moved by one step of the policy evaluated at `current`.
    pub fn proposal(self, current: u32, config: &RangeConfig) -> f64 {
        let step = f64::from(config.step.step_for(current));
        match self {
            StepDirection::Decrease => f64::from(current) - step,
            StepDirection::Increase => f64::from(current) + step,
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Text

/// Leading integer of `text`, ignoring anything after the digits.
pub fn parse_leading_int(text: &str) -> Option<f64> {
    LEADING_INT_REGEX
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

/// What a single keystroke in a price field asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Keystroke {
    /// Empty or not a number yet; leave the range alone while the user types.
    Tolerated,
    /// Reconcile with this value once typing pauses.
    Deferred(f64),
}

pub fn classify_keystroke(text: &str) -> Keystroke {
    match parse_leading_int(text) {
        Some(value) => Keystroke::Deferred(value),
        None => Keystroke::Tolerated,
    }
}

/// Value to reconcile when a field is committed (blur, change, Enter).
pub fn commit_proposal(text: &str, endpoint: Endpoint, config: &RangeConfig) -> f64 {
    parse_leading_int(text).unwrap_or_else(|| f64::from(config.default_bound(endpoint)))
}
