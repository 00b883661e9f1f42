// Form validation done before anything reaches the store
use thiserror::Error;

use super::defaults::GRIND_RANGE;
use crate::state::models::{NewBean, NewShot};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Name required")]
    NameRequired,
    #[error("Roaster required")]
    RoasterRequired,
    #[error("Grind setting {0} is outside {min}..={max}", min = GRIND_RANGE.start(), max = GRIND_RANGE.end())]
    GrindOutOfRange(i64),
    #[error("Dose must be positive, got {0}")]
    InvalidDose(f64),
    #[error("Yield must be positive, got {0}")]
    InvalidYield(f64),
    #[error("Shot time cannot be negative, got {0}")]
    InvalidTime(i64),
}

/// Trim a bean form into a storable payload. Blank optional fields become `None`.
pub fn new_bean(
    name: &str,
    roaster: &str,
    roast_date: Option<&str>,
    notes: Option<&str>,
) -> Result<NewBean, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    let roaster = roaster.trim();
    if roaster.is_empty() {
        return Err(ValidationError::RoasterRequired);
    }

    Ok(NewBean {
        name: name.to_string(),
        roaster: roaster.to_string(),
        roast_date: non_blank(roast_date),
        notes: non_blank(notes),
    })
}

/// Check the numeric parameters of a shot form
pub fn shot_parameters(shot: &NewShot) -> Result<(), ValidationError> {
    if !GRIND_RANGE.contains(&shot.grind_setting) {
        return Err(ValidationError::GrindOutOfRange(shot.grind_setting));
    }
    if shot.dose_grams.is_nan() || shot.dose_grams <= 0.0 {
        return Err(ValidationError::InvalidDose(shot.dose_grams));
    }
    if shot.yield_grams.is_nan() || shot.yield_grams <= 0.0 {
        return Err(ValidationError::InvalidYield(shot.yield_grams));
    }
    if shot.time_seconds < 0 {
        return Err(ValidationError::InvalidTime(shot.time_seconds));
    }
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
