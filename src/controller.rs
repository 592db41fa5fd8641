//! The range controller: owner of the `(min, max)` pair and the single place
//! where it changes.
//!
//! Every input channel (pointer drag, touch drag, keyboard, text field) ends
//! up in [`RangeController::reconcile`], which clamps, quantizes and enforces
//! the minimum gap so that the stored state always satisfies
//!
//! - `0 <= min`
//! - `max <= max_value`
//! - `max - min >= min_gap`

use crate::config::RangeConfig;
use crate::input::StepDirection;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use yew::Reducible;

/// Current selection of the slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeState {
    pub min: u32,
    pub max: u32,
}

impl RangeState {
    pub fn get(&self, endpoint: Endpoint) -> u32 {
        match endpoint {
            Endpoint::Min => self.min,
            Endpoint::Max => self.max,
        }
    }

    fn with(mut self, endpoint: Endpoint, value: u32) -> Self {
        match endpoint {
            Endpoint::Min => self.min = value,
            Endpoint::Max => self.max = value,
        }
        self
    }

    /// Whether the pair satisfies the bounds and the gap of `config`.
    pub fn is_valid_for(&self, config: &RangeConfig) -> bool {
        self.max <= config.max_value
            && self.min <= self.max
            && self.max - self.min >= config.min_gap
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Min,
    Max,
}

/// Origin of an update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputChannel {
    Pointer,
    Touch,
    Keyboard,
    Text,
}

impl InputChannel {
    /// Drag and keyboard input snap to the step grid; typed text is taken as is.
    pub fn is_quantized(self) -> bool {
        !matches!(self, InputChannel::Text)
    }
}

/// Unknown endpoint or channel name coming from JavaScript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTagError {
    kind: &'static str,
    value: String,
}

impl fmt::Display for ParseTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseTagError {}

impl FromStr for Endpoint {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Ok(Endpoint::Min),
            "max" => Ok(Endpoint::Max),
            _ => Err(ParseTagError {
                kind: "endpoint",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for InputChannel {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pointer" | "mouse" => Ok(InputChannel::Pointer),
            "touch" => Ok(InputChannel::Touch),
            "keyboard" => Ok(InputChannel::Keyboard),
            "text" => Ok(InputChannel::Text),
            _ => Err(ParseTagError {
                kind: "input channel",
                value: s.to_string(),
            }),
        }
    }
}

/// Owns the range state of one slider.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeController {
    config: RangeConfig,
    state: RangeState,
}

impl RangeController {
    pub fn new(config: RangeConfig) -> Self {
        Self {
            config,
            state: RangeState {
                min: 0,
                max: config.max_value,
            },
        }
    }

    pub fn config(&self) -> &RangeConfig {
        &self.config
    }

    pub fn state(&self) -> RangeState {
        self.state
    }

    /// Apply a proposed value for `endpoint` and restore every invariant.
    ///
    /// Only the endpoint being adjusted yields to the gap; the other one is
    /// never moved. NaN degrades to the endpoint's default bound. Proposing
    /// the value the endpoint already holds changes nothing.
    pub fn reconcile(
        &mut self,
        endpoint: Endpoint,
        proposed: f64,
        channel: InputChannel,
    ) -> RangeState {
        let current = self.state.get(endpoint);
        let target = self.clamp(endpoint, proposed);
        if target == current {
            return self.state;
        }

        let exact = self.enforce_gap(self.state.with(endpoint, target), endpoint);
        let mut next = exact;

        if channel.is_quantized() {
            let snapped = self.snap_nearest(target, self.config.step.step_for(current));
            next = self.enforce_gap(self.state.with(endpoint, snapped), endpoint);
            if self.config.step.is_dynamic() {
                next = self.requantize(next, endpoint);
            }
            // The grid must never turn a move around or swallow a key press.
            if yields_against(channel, current, target, next.get(endpoint)) {
                next = exact;
            }
        }

        debug_assert!(
            next.is_valid_for(&self.config),
            "range invariant violated: {:?} for {:?}",
            next,
            self.config
        );
        debug!(
            "reconcile {:?} via {:?}: proposed {} -> {}..{}",
            endpoint, channel, proposed, next.min, next.max
        );

        self.state = next;
        next
    }

    /// Move `endpoint` one step of the policy evaluated at its current value.
    pub fn step(&mut self, endpoint: Endpoint, direction: StepDirection) -> RangeState {
        let proposal = direction.proposal(self.state.get(endpoint), &self.config);
        self.reconcile(endpoint, proposal, InputChannel::Keyboard)
    }

    fn clamp(&self, endpoint: Endpoint, proposed: f64) -> u32 {
        if proposed.is_nan() {
            return self.config.default_bound(endpoint);
        }
        proposed.round().clamp(0.0, f64::from(self.config.max_value)) as u32
    }

    /// Nearest multiple of `step`, never above `max_value`.
    fn snap_nearest(&self, value: u32, step: u32) -> u32 {
        let step = u64::from(step.max(1));
        let value = u64::from(value);
        let mut snapped = (value + step / 2) / step * step;
        if snapped > u64::from(self.config.max_value) {
            snapped -= step;
        }
        snapped as u32
    }

    fn enforce_gap(&self, state: RangeState, endpoint: Endpoint) -> RangeState {
        let gap = self.config.min_gap;
        match endpoint {
            Endpoint::Min => RangeState {
                min: state.min.min(state.max - gap),
                ..state
            },
            Endpoint::Max => RangeState {
                max: state.max.max(state.min + gap),
                ..state
            },
        }
    }

    /// Put a gap-corrected value back on the step grid of its own magnitude
    /// without breaking the invariants.
    fn requantize(&self, state: RangeState, endpoint: Endpoint) -> RangeState {
        let value = state.get(endpoint);
        let step = self.config.step.step_for(value);

        let nearest = state.with(endpoint, self.snap_nearest(value, step));
        if nearest.is_valid_for(&self.config) {
            return nearest;
        }

        let safe_side = match endpoint {
            Endpoint::Min => value / step * step,
            Endpoint::Max => value.div_ceil(step).saturating_mul(step),
        };
        let safe = state.with(endpoint, safe_side);
        if safe.is_valid_for(&self.config) {
            safe
        } else {
            state
        }
    }
}

/// Whether a quantized result moved opposite to the request, or a key press
/// left the endpoint where it was.
fn yields_against(channel: InputChannel, current: u32, target: u32, result: u32) -> bool {
    let stalled = channel == InputChannel::Keyboard && result == current;
    match target.cmp(&current) {
        Ordering::Greater => result < current || stalled,
        Ordering::Less => result > current || stalled,
        Ordering::Equal => false,
    }
}

/// Action dispatched by the UI into the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeAction {
    Reconcile {
        endpoint: Endpoint,
        value: f64,
        channel: InputChannel,
    },
    /// Keyboard step computed from the state at the time it is applied.
    Step {
        endpoint: Endpoint,
        direction: StepDirection,
    },
}

impl Reducible for RangeController {
    type Action = RangeAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            RangeAction::Reconcile {
                endpoint,
                value,
                channel,
            } => {
                next.reconcile(endpoint, value, channel);
            }
            RangeAction::Step {
                endpoint,
                direction,
            } => {
                next.step(endpoint, direction);
            }
        }
        if next.state == self.state {
            self
        } else {
            Rc::new(next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StepPolicy;
    use proptest::prelude::*;

    fn test_config() -> RangeConfig {
        RangeConfig::new(
            9_000,
            10,
            StepPolicy::Tiered {
                threshold: 500,
                below: 10,
                at_or_above: 50,
            },
        )
        .unwrap()
    }

    fn controller() -> RangeController {
        RangeController::new(test_config())
    }

    #[test]
    fn starts_at_full_range() {
        assert_eq!(controller().state(), RangeState { min: 0, max: 9_000 });
    }

    #[test]
    fn negative_keyboard_proposal_clamps_to_zero() {
        let mut c = controller();
        let state = c.reconcile(Endpoint::Min, -50.0, InputChannel::Keyboard);
        assert_eq!(state, RangeState { min: 0, max: 9_000 });
    }

    #[test]
    fn proposals_above_range_clamp_to_max_value() {
        let mut c = controller();
        c.reconcile(Endpoint::Max, 4_000.0, InputChannel::Text);
        assert_eq!(c.reconcile(Endpoint::Max, 1e12, InputChannel::Text).max, 9_000);
        assert_eq!(
            c.reconcile(Endpoint::Min, f64::INFINITY, InputChannel::Text),
            RangeState { min: 8_990, max: 9_000 }
        );
    }

    #[test]
    fn gap_pushes_the_adjusted_endpoint_only() {
        let mut c = controller();
        c.reconcile(Endpoint::Min, 100.0, InputChannel::Text);
        let state = c.reconcile(Endpoint::Max, 105.0, InputChannel::Text);
        assert_eq!(state, RangeState { min: 100, max: 110 });

        let state = c.reconcile(Endpoint::Min, 500.0, InputChannel::Text);
        assert_eq!(state, RangeState { min: 100, max: 110 });
    }

    #[test]
    fn keyboard_step_comes_from_the_pre_adjustment_value() {
        let mut c = controller();
        c.reconcile(Endpoint::Min, 490.0, InputChannel::Text);

        let step = c.config().step.step_for(c.state().min);
        assert_eq!(step, 10);
        let state = c.reconcile(Endpoint::Min, 490.0 + f64::from(step), InputChannel::Keyboard);
        assert_eq!(state.min, 500);

        let step = c.config().step.step_for(state.min);
        assert_eq!(step, 50);
        let state = c.reconcile(Endpoint::Min, 500.0 + f64::from(step), InputChannel::Keyboard);
        assert_eq!(state.min, 550);
    }

    #[test]
    fn drag_result_is_gap_corrected() {
        let mut c = controller();
        let state = c.reconcile(Endpoint::Max, 4.0, InputChannel::Pointer);
        assert_eq!(state, RangeState { min: 0, max: 10 });
    }

    #[test]
    fn reapplying_the_same_value_is_a_no_op() {
        let mut c = controller();
        let first = c.reconcile(Endpoint::Max, 4.0, InputChannel::Pointer);
        let second = c.reconcile(Endpoint::Max, f64::from(first.max), InputChannel::Pointer);
        assert_eq!(first, second);

        let first = c.reconcile(Endpoint::Min, 3_333.0, InputChannel::Text);
        let second = c.reconcile(Endpoint::Min, 3_333.0, InputChannel::Text);
        assert_eq!(first, second);
    }

    #[test]
    fn nan_falls_back_to_default_bound() {
        let mut c = controller();
        c.reconcile(Endpoint::Min, 300.0, InputChannel::Text);
        c.reconcile(Endpoint::Max, 600.0, InputChannel::Text);
        assert_eq!(
            c.reconcile(Endpoint::Min, f64::NAN, InputChannel::Text),
            RangeState { min: 0, max: 600 }
        );
        assert_eq!(
            c.reconcile(Endpoint::Max, f64::NAN, InputChannel::Touch),
            RangeState { min: 0, max: 9_000 }
        );
    }

    #[test]
    fn gap_corrected_min_lands_on_the_grid_below_max() {
        let mut c = controller();
        c.reconcile(Endpoint::Max, 1_003.0, InputChannel::Text);
        let state = c.reconcile(Endpoint::Min, 1_000.0, InputChannel::Pointer);
        // 993 is off the 50-grid; the nearest multiple (1000) breaks the gap.
        assert_eq!(state, RangeState { min: 950, max: 1_003 });
    }

    #[test]
    fn fixed_step_policy_snaps_drag_values() {
        let cfg = RangeConfig::new(11_500, 100, StepPolicy::Fixed { step: 100 }).unwrap();
        let mut c = RangeController::new(cfg);
        assert_eq!(c.reconcile(Endpoint::Min, 1_234.0, InputChannel::Pointer).min, 1_200);
        assert_eq!(c.reconcile(Endpoint::Min, 1_251.0, InputChannel::Touch).min, 1_300);
    }

    #[test]
    fn reducer_keeps_the_same_rc_when_nothing_changes() {
        let c = Rc::new(controller());
        let action = RangeAction::Reconcile {
            endpoint: Endpoint::Min,
            value: -1.0,
            channel: InputChannel::Keyboard,
        };
        let next = c.clone().reduce(action);
        assert!(Rc::ptr_eq(&c, &next));

        let moved = next.reduce(RangeAction::Reconcile {
            endpoint: Endpoint::Max,
            value: 200.0,
            channel: InputChannel::Text,
        });
        assert_eq!(moved.state(), RangeState { min: 0, max: 200 });
    }

    #[test]
    fn fixed_step_keyboard_yields_to_the_gap_exactly() {
        let cfg = RangeConfig::new(11_500, 100, StepPolicy::Fixed { step: 100 }).unwrap();
        let mut c = RangeController::new(cfg);
        c.reconcile(Endpoint::Max, 1_050.0, InputChannel::Text);
        c.reconcile(Endpoint::Min, 900.0, InputChannel::Text);

        let state = c.reconcile(Endpoint::Min, 1_000.0, InputChannel::Keyboard);
        assert_eq!(state, RangeState { min: 950, max: 1_050 });

        // Max side: clamped to min + gap, not pushed onto the grid.
        c.reconcile(Endpoint::Min, 905.0, InputChannel::Text);
        let state = c.step(Endpoint::Max, StepDirection::Decrease);
        assert_eq!(state, RangeState { min: 905, max: 1_005 });
    }

    #[test]
    fn requantizing_never_reverses_a_key_press() {
        // Built directly: `validate` would reject these tiers.
        let cfg = RangeConfig {
            max_value: 9_000,
            min_gap: 10,
            step: StepPolicy::Tiered {
                threshold: 520,
                below: 10,
                at_or_above: 50,
            },
            ..RangeConfig::default()
        };
        let mut c = RangeController::new(cfg);
        c.reconcile(Endpoint::Min, 510.0, InputChannel::Text);

        let state = c.reconcile(Endpoint::Min, 520.0, InputChannel::Keyboard);
        assert_eq!(state.min, 520);
        let state = c.step(Endpoint::Min, StepDirection::Increase);
        assert!(state.min > 520);
    }

    #[test]
    fn key_press_near_the_gap_still_moves() {
        let mut c = controller();
        c.reconcile(Endpoint::Max, 1_003.0, InputChannel::Text);
        c.reconcile(Endpoint::Min, 990.0, InputChannel::Text);
        // 993 is off the 50-grid and its floor (950) would move backwards.
        let state = c.step(Endpoint::Min, StepDirection::Increase);
        assert_eq!(state, RangeState { min: 993, max: 1_003 });

        let state = c.step(Endpoint::Min, StepDirection::Increase);
        assert_eq!(state.min, 993);
    }

    #[test]
    fn step_actions_read_the_latest_state() {
        let c = Rc::new(controller());
        let step = RangeAction::Step {
            endpoint: Endpoint::Min,
            direction: StepDirection::Increase,
        };
        let next = c.reduce(step).reduce(step).reduce(step);
        assert_eq!(next.state().min, 30);

        let back = next.reduce(RangeAction::Step {
            endpoint: Endpoint::Min,
            direction: StepDirection::Decrease,
        });
        assert_eq!(back.state().min, 20);
    }

    #[test]
    fn tags_parse_from_js_names() {
        assert_eq!("Min".parse::<Endpoint>(), Ok(Endpoint::Min));
        assert_eq!("mouse".parse::<InputChannel>(), Ok(InputChannel::Pointer));
        assert!("middle".parse::<Endpoint>().is_err());
        assert_eq!(
            "wheel".parse::<InputChannel>().unwrap_err().to_string(),
            "Unknown input channel 'wheel'"
        );
    }

    fn endpoint_strategy() -> impl Strategy<Value = Endpoint> {
        prop_oneof![Just(Endpoint::Min), Just(Endpoint::Max)]
    }

    fn channel_strategy() -> impl Strategy<Value = InputChannel> {
        prop_oneof![
            Just(InputChannel::Pointer),
            Just(InputChannel::Touch),
            Just(InputChannel::Keyboard),
            Just(InputChannel::Text),
        ]
    }

    fn value_strategy() -> impl Strategy<Value = f64> {
        prop_oneof![
            8 => -1_000.0..25_000.0f64,
            1 => Just(f64::NAN),
            1 => Just(f64::NEG_INFINITY),
            1 => Just(f64::INFINITY),
        ]
    }

    fn direction_strategy() -> impl Strategy<Value = StepDirection> {
        prop_oneof![Just(StepDirection::Decrease), Just(StepDirection::Increase)]
    }

    /// Fixed policies and nested tier layouts over varied scales and gaps.
    fn config_strategy() -> impl Strategy<Value = RangeConfig> {
        let fixed = (1u32..=300).prop_map(|step| StepPolicy::Fixed { step });
        let tiered = (1u32..=20, 1u32..=10, 0u32..=40).prop_map(|(below, k, m)| {
            let at_or_above = below * k;
            StepPolicy::Tiered {
                threshold: at_or_above * m,
                below,
                at_or_above,
            }
        });
        (prop_oneof![fixed, tiered], 1u32..=20_000)
            .prop_flat_map(|(step, max_value)| (Just(step), Just(max_value), 0..=max_value / 4))
            .prop_map(|(step, max_value, min_gap)| {
                RangeConfig::new(max_value, min_gap, step).unwrap()
            })
    }

    fn setup_strategy() -> impl Strategy<Value = Vec<(Endpoint, f64, InputChannel)>> {
        prop::collection::vec(
            (endpoint_strategy(), value_strategy(), channel_strategy()),
            0..32,
        )
    }

    fn prepared(cfg: RangeConfig, setup: Vec<(Endpoint, f64, InputChannel)>) -> RangeController {
        let mut c = RangeController::new(cfg);
        for (endpoint, value, channel) in setup {
            c.reconcile(endpoint, value, channel);
        }
        c
    }

    proptest! {
        #[test]
        fn invariants_hold_for_any_sequence(
            cfg in config_strategy(),
            steps in prop::collection::vec(
                (endpoint_strategy(), value_strategy(), channel_strategy()),
                1..64,
            )
        ) {
            let mut c = RangeController::new(cfg);
            for (endpoint, value, channel) in steps {
                let state = c.reconcile(endpoint, value, channel);
                prop_assert!(state.max <= cfg.max_value);
                prop_assert!(state.min + cfg.min_gap <= state.max);
            }
        }

        #[test]
        fn reapplying_the_result_changes_nothing(
            cfg in config_strategy(),
            setup in setup_strategy(),
            endpoint in endpoint_strategy(),
            value in value_strategy(),
            channel in channel_strategy(),
        ) {
            let mut c = prepared(cfg, setup);
            let first = c.reconcile(endpoint, value, channel);
            let second = c.reconcile(endpoint, f64::from(first.get(endpoint)), channel);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn proposals_never_move_against_their_direction(
            cfg in config_strategy(),
            setup in setup_strategy(),
            endpoint in endpoint_strategy(),
            value in -1_000.0..25_000.0f64,
            channel in channel_strategy(),
        ) {
            let mut c = prepared(cfg, setup);
            let before = c.state().get(endpoint);
            let after = c.reconcile(endpoint, value, channel).get(endpoint);
            let target = value.round();
            if target > f64::from(before) {
                prop_assert!(after >= before, "{} -> {} for {}", before, after, value);
            } else if target < f64::from(before) {
                prop_assert!(after <= before, "{} -> {} for {}", before, after, value);
            }
        }

        #[test]
        fn key_steps_move_whenever_there_is_room(
            cfg in config_strategy(),
            setup in setup_strategy(),
            endpoint in endpoint_strategy(),
            direction in direction_strategy(),
        ) {
            let mut c = prepared(cfg, setup);
            let state = c.state();
            let before = state.get(endpoint);
            let (lowest, highest) = match endpoint {
                Endpoint::Min => (0, state.max - cfg.min_gap),
                Endpoint::Max => (state.min + cfg.min_gap, cfg.max_value),
            };
            let after = c.step(endpoint, direction).get(endpoint);
            match direction {
                StepDirection::Increase => {
                    prop_assert!(after >= before);
                    if before < highest {
                        prop_assert!(after > before);
                    }
                }
                StepDirection::Decrease => {
                    prop_assert!(after <= before);
                    if before > lowest {
                        prop_assert!(after < before);
                    }
                }
            }
        }
    }
}
