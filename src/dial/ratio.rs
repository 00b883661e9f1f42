// Brew ratio helpers
use serde::{Deserialize, Serialize};

/// Yield-to-dose ratio. A non-positive dose gives 0 rather than an error.
pub fn brew_ratio(dose_grams: f64, yield_grams: f64) -> f64 {
    if dose_grams > 0.0 {
        yield_grams / dose_grams
    } else {
        0.0
    }
}

/// Strength band of a yield-to-dose ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioBand {
    Ristretto,
    Espresso,
    Lungo,
    VeryLungo,
}

impl RatioBand {
    pub fn classify(ratio: f64) -> Self {
        if ratio < 1.5 {
            RatioBand::Ristretto
        } else if ratio < 2.2 {
            RatioBand::Espresso
        } else if ratio < 3.0 {
            RatioBand::Lungo
        } else {
            RatioBand::VeryLungo
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatioBand::Ristretto => "Ristretto",
            RatioBand::Espresso => "Espresso",
            RatioBand::Lungo => "Lungo",
            RatioBand::VeryLungo => "Very lungo",
        }
    }
}

/// Label for the band a ratio falls into
pub fn describe_ratio(ratio: f64) -> &'static str {
    RatioBand::classify(ratio).label()
}
