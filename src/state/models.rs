// Data models for the Dial brewing log
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::dial::ratio::brew_ratio;

/// A tracked coffee bean batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bean {
    pub id: String,
    pub name: String,
    pub roaster: String,
    /// Raw roast date text as entered; not validated by the store.
    pub roast_date: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Bean {
    /// Roast date as a calendar date, when the stored text is a valid ISO-8601 date.
    pub fn parsed_roast_date(&self) -> Option<NaiveDate> {
        let raw = self.roast_date.as_deref()?.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|ts| ts.date_naive())
        })
    }
}

/// One recorded brew attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub id: String,
    pub bean_id: String,
    pub grind_setting: i64,
    pub dose_grams: f64,
    pub yield_grams: f64,
    pub time_seconds: i64,
    pub taste_tags: Vec<TasteTag>,
    pub shot_characteristics: Vec<ShotCharacteristic>,
    pub is_dialed: bool,
    pub drink_type: Option<DrinkType>,
    pub brew_method: BrewMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Shot {
    /// Yield-to-dose ratio of this shot.
    pub fn ratio(&self) -> f64 {
        brew_ratio(self.dose_grams, self.yield_grams)
    }
}

/// A shot joined with the display fields of its bean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotWithBean {
    pub shot: Shot,
    pub bean_name: String,
    pub bean_roaster: String,
}

/// A bean together with what the bean list shows about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeanSummary {
    pub bean: Bean,
    pub shot_count: i64,
    pub dialed_shot: Option<Shot>,
}

// ==================== ENUMERATIONS ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TasteTag {
    Sour,
    Bitter,
    Weak,
    Strong,
    Balanced,
    Astringent,
    Muddy,
}

impl TasteTag {
    pub const ALL: [TasteTag; 7] = [
        TasteTag::Sour,
        TasteTag::Bitter,
        TasteTag::Weak,
        TasteTag::Strong,
        TasteTag::Balanced,
        TasteTag::Astringent,
        TasteTag::Muddy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TasteTag::Sour => "sour",
            TasteTag::Bitter => "bitter",
            TasteTag::Weak => "weak",
            TasteTag::Strong => "strong",
            TasteTag::Balanced => "balanced",
            TasteTag::Astringent => "astringent",
            TasteTag::Muddy => "muddy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TasteTag::Sour => "Sour",
            TasteTag::Bitter => "Bitter",
            TasteTag::Weak => "Weak",
            TasteTag::Strong => "Strong",
            TasteTag::Balanced => "Balanced",
            TasteTag::Astringent => "Astringent",
            TasteTag::Muddy => "Muddy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotCharacteristic {
    FullBody,
    LightBody,
    ThickCrema,
    LightCrema,
    NoCrema,
    TigerStripes,
    Blonde,
    Channeling,
    FastFlow,
    SlowFlow,
}

impl ShotCharacteristic {
    pub const ALL: [ShotCharacteristic; 10] = [
        ShotCharacteristic::FullBody,
        ShotCharacteristic::LightBody,
        ShotCharacteristic::ThickCrema,
        ShotCharacteristic::LightCrema,
        ShotCharacteristic::NoCrema,
        ShotCharacteristic::TigerStripes,
        ShotCharacteristic::Blonde,
        ShotCharacteristic::Channeling,
        ShotCharacteristic::FastFlow,
        ShotCharacteristic::SlowFlow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShotCharacteristic::FullBody => "full_body",
            ShotCharacteristic::LightBody => "light_body",
            ShotCharacteristic::ThickCrema => "thick_crema",
            ShotCharacteristic::LightCrema => "light_crema",
            ShotCharacteristic::NoCrema => "no_crema",
            ShotCharacteristic::TigerStripes => "tiger_stripes",
            ShotCharacteristic::Blonde => "blonde",
            ShotCharacteristic::Channeling => "channeling",
            ShotCharacteristic::FastFlow => "fast_flow",
            ShotCharacteristic::SlowFlow => "slow_flow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShotCharacteristic::FullBody => "Full body",
            ShotCharacteristic::LightBody => "Light body",
            ShotCharacteristic::ThickCrema => "Thick crema",
            ShotCharacteristic::LightCrema => "Light crema",
            ShotCharacteristic::NoCrema => "No crema",
            ShotCharacteristic::TigerStripes => "Tiger stripes",
            ShotCharacteristic::Blonde => "Blonde",
            ShotCharacteristic::Channeling => "Channeling",
            ShotCharacteristic::FastFlow => "Fast flow",
            ShotCharacteristic::SlowFlow => "Slow flow",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrewMethod {
    #[default]
    Espresso,
    PourOver,
    FrenchPress,
    Aeropress,
    MokaPot,
    ColdBrew,
    Other,
}

impl BrewMethod {
    pub const ALL: [BrewMethod; 7] = [
        BrewMethod::Espresso,
        BrewMethod::PourOver,
        BrewMethod::FrenchPress,
        BrewMethod::Aeropress,
        BrewMethod::MokaPot,
        BrewMethod::ColdBrew,
        BrewMethod::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BrewMethod::Espresso => "espresso",
            BrewMethod::PourOver => "pour_over",
            BrewMethod::FrenchPress => "french_press",
            BrewMethod::Aeropress => "aeropress",
            BrewMethod::MokaPot => "moka_pot",
            BrewMethod::ColdBrew => "cold_brew",
            BrewMethod::Other => "other",
        }
    }

    /// Column value to method; NULL means espresso, unrecognised text means other.
    pub fn from_column(value: Option<&str>) -> Self {
        match value {
            None => BrewMethod::Espresso,
            Some(s) => Self::ALL
                .into_iter()
                .find(|m| m.as_str() == s)
                .unwrap_or(BrewMethod::Other),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BrewMethod::Espresso => "Espresso",
            BrewMethod::PourOver => "Pour Over",
            BrewMethod::FrenchPress => "French Press",
            BrewMethod::Aeropress => "AeroPress",
            BrewMethod::MokaPot => "Moka Pot",
            BrewMethod::ColdBrew => "Cold Brew",
            BrewMethod::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrinkType {
    Espresso,
    Latte,
    Cappuccino,
    Other,
}

impl DrinkType {
    pub const ALL: [DrinkType; 4] = [
        DrinkType::Espresso,
        DrinkType::Latte,
        DrinkType::Cappuccino,
        DrinkType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DrinkType::Espresso => "espresso",
            DrinkType::Latte => "latte",
            DrinkType::Cappuccino => "cappuccino",
            DrinkType::Other => "other",
        }
    }

    /// Column value to drink type; unrecognised text means other.
    pub fn from_column(value: Option<&str>) -> Option<Self> {
        value.map(|s| {
            Self::ALL
                .into_iter()
                .find(|d| d.as_str() == s)
                .unwrap_or(DrinkType::Other)
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            DrinkType::Espresso => "Espresso",
            DrinkType::Latte => "Latte",
            DrinkType::Cappuccino => "Cappuccino",
            DrinkType::Other => "Other",
        }
    }
}

// ==================== INPUT PAYLOADS ====================

/// Fields supplied when creating a bean.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBean {
    pub name: String,
    pub roaster: String,
    #[serde(default)]
    pub roast_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial bean update. `None` leaves a field untouched; `Some(None)` clears a
/// nullable field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BeanUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roaster: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub roast_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl BeanUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.roaster.is_none()
            && self.roast_date.is_none()
            && self.notes.is_none()
    }
}

/// Fields supplied when recording a shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShot {
    pub bean_id: String,
    pub grind_setting: i64,
    pub dose_grams: f64,
    pub yield_grams: f64,
    pub time_seconds: i64,
    #[serde(default)]
    pub taste_tags: Vec<TasteTag>,
    #[serde(default)]
    pub shot_characteristics: Vec<ShotCharacteristic>,
    #[serde(default)]
    pub is_dialed: bool,
    #[serde(default)]
    pub drink_type: Option<DrinkType>,
    #[serde(default)]
    pub brew_method: BrewMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial shot update. The owning bean and creation time cannot be changed,
/// so they have no field here and are ignored when present in a payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ShotUpdate {
    #[serde(default)]
    pub grind_setting: Option<i64>,
    #[serde(default)]
    pub dose_grams: Option<f64>,
    #[serde(default)]
    pub yield_grams: Option<f64>,
    #[serde(default)]
    pub time_seconds: Option<i64>,
    #[serde(default)]
    pub taste_tags: Option<Vec<TasteTag>>,
    #[serde(default)]
    pub shot_characteristics: Option<Vec<ShotCharacteristic>>,
    #[serde(default)]
    pub is_dialed: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub drink_type: Option<Option<DrinkType>>,
    #[serde(default)]
    pub brew_method: Option<BrewMethod>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

// A present-but-null field deserializes to Some(None) instead of None.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
