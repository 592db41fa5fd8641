//! Widget configuration: compile-time defaults and the validated
//! `RangeConfig` a page can override through its markup.

use crate::controller::Endpoint;
use serde::{Deserialize, Serialize};
use std::fmt;

// Price scale
pub const DEFAULT_MAX_PRICE: u32 = 11_500;
pub const DEFAULT_MIN_GAP: u32 = 100;

// Step policy (tiered by magnitude)
pub const STEP_THRESHOLD: u32 = 1_000;
pub const STEP_SMALL: u32 = 50;
pub const STEP_LARGE: u32 = 100;

// UI Behavior
pub const DEBOUNCE_MS: u32 = 500;
pub const HANDLE_INSET_PX: u32 = 10;

// Mount points
pub const RANGE_ROOT_ID: &str = "price-range";
pub const RANGE_CONFIG_ATTR: &str = "data-range-config";
pub const CATALOG_ITEM_SELECTOR: &str = ".catalog__item";
pub const CATALOG_TITLE_SELECTOR: &str = ".catalog__title";
pub const FAVORITE_MOUNT_SELECTOR: &str = ".catalog__favorite";

// Field ids referenced by the handles' aria-controls
pub const MIN_FIELD_ID: &str = "min-price";
pub const MAX_FIELD_ID: &str = "max-price";

/// Quantization granularity as a function of the value being adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepPolicy {
    Fixed { step: u32 },
    /// `below` under `threshold`, `at_or_above` from it upwards.
    Tiered {
        threshold: u32,
        below: u32,
        at_or_above: u32,
    },
}

impl StepPolicy {
    pub fn step_for(&self, value: u32) -> u32 {
        let step = match *self {
            StepPolicy::Fixed { step } => step,
            StepPolicy::Tiered {
                threshold,
                below,
                at_or_above,
            } => {
                if value < threshold {
                    below
                } else {
                    at_or_above
                }
            }
        };
        step.max(1)
    }

    /// Whether the step depends on the value being adjusted.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, StepPolicy::Tiered { .. })
    }

    /// Tiered grids must nest: the threshold sits on the coarse grid and the
    /// coarse step is a multiple of the fine one.
    fn is_aligned(&self) -> bool {
        match *self {
            StepPolicy::Fixed { .. } => true,
            StepPolicy::Tiered {
                threshold,
                below,
                at_or_above,
            } => threshold % at_or_above == 0 && at_or_above % below == 0,
        }
    }

    fn has_zero_step(&self) -> bool {
        match *self {
            StepPolicy::Fixed { step } => step == 0,
            StepPolicy::Tiered {
                below, at_or_above, ..
            } => below == 0 || at_or_above == 0,
        }
    }
}

impl Default for StepPolicy {
    fn default() -> Self {
        StepPolicy::Tiered {
            threshold: STEP_THRESHOLD,
            below: STEP_SMALL,
            at_or_above: STEP_LARGE,
        }
    }
}

/// Configuration errors for a range widget.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ZeroMaxValue,
    GapExceedsRange { min_gap: u32, max_value: u32 },
    ZeroStep,
    MisalignedTiers {
        threshold: u32,
        below: u32,
        at_or_above: u32,
    },
    Malformed(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroMaxValue => write!(f, "Maximum value must be positive"),
            ConfigError::GapExceedsRange { min_gap, max_value } => write!(
                f,
                "Minimum gap {} does not fit into the range [0, {}]",
                min_gap, max_value
            ),
            ConfigError::ZeroStep => write!(f, "Step sizes must be positive"),
            ConfigError::MisalignedTiers {
                threshold,
                below,
                at_or_above,
            } => write!(
                f,
                "Tiered steps must nest: threshold {} must be a multiple of {} and {} a multiple of {}",
                threshold, at_or_above, at_or_above, below
            ),
            ConfigError::Malformed(msg) => write!(f, "Malformed range config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Fixed parameters of one price-range widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    pub max_value: u32,
    pub min_gap: u32,
    pub step: StepPolicy,
    pub debounce_ms: u32,
    pub handle_inset_px: u32,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            max_value: DEFAULT_MAX_PRICE,
            min_gap: DEFAULT_MIN_GAP,
            step: StepPolicy::default(),
            debounce_ms: DEBOUNCE_MS,
            handle_inset_px: HANDLE_INSET_PX,
        }
    }
}

impl RangeConfig {
    pub fn new(max_value: u32, min_gap: u32, step: StepPolicy) -> Result<Self, ConfigError> {
        Self {
            max_value,
            min_gap,
            step,
            ..Self::default()
        }
        .validate()
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u32) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_value == 0 {
            return Err(ConfigError::ZeroMaxValue);
        }
        if self.min_gap > self.max_value {
            return Err(ConfigError::GapExceedsRange {
                min_gap: self.min_gap,
                max_value: self.max_value,
            });
        }
        if self.step.has_zero_step() {
            return Err(ConfigError::ZeroStep);
        }
        if let StepPolicy::Tiered {
            threshold,
            below,
            at_or_above,
        } = self.step
        {
            if !self.step.is_aligned() {
                return Err(ConfigError::MisalignedTiers {
                    threshold,
                    below,
                    at_or_above,
                });
            }
        }
        Ok(self)
    }

    /// Parse a JSON object (missing fields take their defaults) and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<RangeConfig>(json)
            .map_err(|e| ConfigError::Malformed(e.to_string()))?
            .validate()
    }

    /// Value an endpoint falls back to when its input is unusable.
    pub fn default_bound(&self, endpoint: Endpoint) -> u32 {
        match endpoint {
            Endpoint::Min => 0,
            Endpoint::Max => self.max_value,
        }
    }
}
