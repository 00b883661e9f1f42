// Dial-in guidance
// Pure helpers: taste-driven suggestions, ratio bands, shot defaults and form validation

pub mod defaults;
pub mod ratio;
pub mod suggestions;
pub mod validate;

pub use defaults::{ShotDefaults, GRIND_RANGE};
pub use ratio::{brew_ratio, describe_ratio, RatioBand};
pub use suggestions::{suggest, DialSuggestion};
pub use validate::ValidationError;
