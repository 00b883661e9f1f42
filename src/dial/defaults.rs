// Starting parameters for a new shot
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::state::models::{BrewMethod, Shot};

/// Grinder settings offered by the shot form
pub const GRIND_RANGE: RangeInclusive<i64> = 1..=30;

/// Pre-filled values for the next shot of a bean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotDefaults {
    pub grind_setting: i64,
    pub dose_grams: f64,
    pub yield_grams: f64,
    pub time_seconds: i64,
    pub brew_method: BrewMethod,
}

impl Default for ShotDefaults {
    fn default() -> Self {
        Self {
            grind_setting: 15,
            dose_grams: 18.0,
            yield_grams: 36.0,
            time_seconds: 28,
            brew_method: BrewMethod::Espresso,
        }
    }
}

impl ShotDefaults {
    /// Carry over the previous shot's recipe, or fall back to the house defaults.
    /// Taste feedback and the dialed flag never carry over.
    pub fn from_last_shot(last: Option<&Shot>) -> Self {
        match last {
            Some(shot) => Self {
                grind_setting: shot.grind_setting,
                dose_grams: shot.dose_grams,
                yield_grams: shot.yield_grams,
                time_seconds: shot.time_seconds,
                brew_method: shot.brew_method,
            },
            None => Self::default(),
        }
    }
}
