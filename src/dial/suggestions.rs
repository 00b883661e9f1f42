// Taste feedback to dial-in suggestions
use serde::Serialize;

use crate::state::models::TasteTag;

/// What a taste observation points at and what to try next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DialSuggestion {
    pub issue: &'static str,
    pub cause: &'static str,
    pub suggestion: &'static str,
}

// Canonical output order. Balanced has no entry.
const RULES: [(TasteTag, DialSuggestion); 6] = [
    (
        TasteTag::Sour,
        DialSuggestion {
            issue: "Sour taste",
            cause: "Under-extraction",
            suggestion: "Try grinding finer, extending shot time, or increasing yield",
        },
    ),
    (
        TasteTag::Bitter,
        DialSuggestion {
            issue: "Bitter taste",
            cause: "Over-extraction",
            suggestion: "Try grinding coarser, shortening shot time, or decreasing yield",
        },
    ),
    (
        TasteTag::Weak,
        DialSuggestion {
            issue: "Weak/watery",
            cause: "Low extraction or wrong ratio",
            suggestion: "Check dose amount, try a finer grind, or decrease yield",
        },
    ),
    (
        TasteTag::Strong,
        DialSuggestion {
            issue: "Too strong/intense",
            cause: "High concentration",
            suggestion: "Increase yield for a longer ratio (e.g., 1:2.5 instead of 1:2)",
        },
    ),
    (
        TasteTag::Astringent,
        DialSuggestion {
            issue: "Astringent/dry",
            cause: "Channeling or over-extraction",
            suggestion: "Check puck prep, distribute grounds evenly, or try coarser grind",
        },
    ),
    (
        TasteTag::Muddy,
        DialSuggestion {
            issue: "Muddy flavor",
            cause: "Uneven extraction or stale beans",
            suggestion: "Check bean freshness, improve distribution, or adjust grind",
        },
    ),
];

/// Suggestions for every tag present, in canonical tag order.
///
/// Each tag contributes at most one entry regardless of input order or
/// repetition; conflicting tags are all reported.
pub fn suggest(tags: &[TasteTag]) -> Vec<DialSuggestion> {
    RULES
        .iter()
        .filter(|(tag, _)| tags.contains(tag))
        .map(|(_, suggestion)| *suggestion)
        .collect()
}
