// Text codec for list-valued columns (taste tags, shot characteristics)
//
// Lists are stored as a JSON array of identifier strings. Decoding never
// fails: missing or garbled text yields an empty list and unknown
// identifiers are skipped.

use super::models::{ShotCharacteristic, TasteTag};

/// A value that is persisted as a stable string identifier.
pub trait ListItem: Copy {
    fn identifier(&self) -> &'static str;
    fn from_identifier(s: &str) -> Option<Self>;
}

impl ListItem for TasteTag {
    fn identifier(&self) -> &'static str {
        self.as_str()
    }

    fn from_identifier(s: &str) -> Option<Self> {
        TasteTag::parse(s)
    }
}

impl ListItem for ShotCharacteristic {
    fn identifier(&self) -> &'static str {
        self.as_str()
    }

    fn from_identifier(s: &str) -> Option<Self> {
        ShotCharacteristic::parse(s)
    }
}

/// Encode a sequence for storage, preserving order and duplicates.
pub fn encode_list<T: ListItem>(items: &[T]) -> String {
    let identifiers: Vec<&str> = items.iter().map(ListItem::identifier).collect();
    serde_json::Value::from(identifiers).to_string()
}

/// Decode a stored sequence.
pub fn decode_list<T: ListItem>(raw: Option<&str>) -> Vec<T> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let identifiers: Vec<String> = match serde_json::from_str(raw) {
        Ok(identifiers) => identifiers,
        Err(e) => {
            log::warn!("Unreadable list column {:?}, treating as empty: {}", raw, e);
            return Vec::new();
        }
    };

    identifiers
        .iter()
        .filter_map(|id| {
            let item = T::from_identifier(id);
            if item.is_none() {
                log::warn!("Skipping unknown list value {:?}", id);
            }
            item
        })
        .collect()
}
