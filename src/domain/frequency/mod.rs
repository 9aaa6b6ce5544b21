//! Frequency domain - mapping the speed control onto swap intervals

mod frequency_mapper;

pub use frequency_mapper::{
    describe_interval, map_named_to_frequency, map_to_frequency, DEFAULT_FREQUENCY_MS,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::AppError;

/// Control value a tier starts from
pub const MIDPOINT_CONTROL_VALUE: f64 = 50.0;

/// Named band of swap intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyTier {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl FrequencyTier {
    /// Inclusive `(min, max)` interval range in seconds
    pub fn range_secs(&self) -> (u64, u64) {
        match self {
            FrequencyTier::Seconds => (1, 60),
            FrequencyTier::Minutes => (60, 3_600),
            FrequencyTier::Hours => (3_600, 86_400),
            FrequencyTier::Days => (86_400, 2_592_000),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FrequencyTier::Seconds => "seconds",
            FrequencyTier::Minutes => "minutes",
            FrequencyTier::Hours => "hours",
            FrequencyTier::Days => "days",
        }
    }

    pub fn all() -> [FrequencyTier; 4] {
        [
            FrequencyTier::Seconds,
            FrequencyTier::Minutes,
            FrequencyTier::Hours,
            FrequencyTier::Days,
        ]
    }
}

impl fmt::Display for FrequencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrequencyTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "seconds" | "second" | "s" => Ok(FrequencyTier::Seconds),
            "minutes" | "minute" | "m" => Ok(FrequencyTier::Minutes),
            "hours" | "hour" | "h" => Ok(FrequencyTier::Hours),
            "days" | "day" | "d" => Ok(FrequencyTier::Days),
            other => Err(AppError::ConfigError(format!("unknown frequency tier: {}", other))),
        }
    }
}

/// The user-facing speed control: a tier plus a 0-100 position within it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyControl {
    tier: FrequencyTier,
    value: f64,
}

impl FrequencyControl {
    pub fn new(tier: FrequencyTier, value: f64) -> Self {
        Self {
            tier,
            value: clamp_control(value),
        }
    }

    pub fn tier(&self) -> FrequencyTier {
        self.tier
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Switch tier; the control value jumps back to the midpoint
    pub fn set_tier(&mut self, tier: FrequencyTier) {
        self.tier = tier;
        self.value = MIDPOINT_CONTROL_VALUE;
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = clamp_control(value);
    }

    pub fn interval_ms(&self) -> u64 {
        map_to_frequency(self.value, self.tier)
    }
}

impl Default for FrequencyControl {
    fn default() -> Self {
        Self::new(FrequencyTier::Minutes, MIDPOINT_CONTROL_VALUE)
    }
}

fn clamp_control(value: f64) -> f64 {
    if value.is_nan() {
        MIDPOINT_CONTROL_VALUE
    } else {
        value.clamp(0.0, 100.0)
    }
}
