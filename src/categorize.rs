//! Keyword categorization of headlines into topic buckets.
//!
//! Two static tables drive this module:
//! - [`DISPLAY_ORDER`]: the buckets and the order they appear in the digest
//! - [`PRIORITY_RULES`]: keyword rules in evaluation order (first match wins)
//!
//! The two orders differ on purpose: Heavy Equipment is tested before
//! Technology & Innovation but displayed after Tenders & Contracts. A title
//! matching no rule lands in [`CATCH_ALL`].

use crate::models::{CategorizedHeadlines, Headline};
use tracing::{debug, info, instrument, warn};

pub const ENERGY: &str = "Energy & Oil";
pub const CONSTRUCTION: &str = "Construction & Infrastructure";
pub const TENDERS: &str = "Tenders & Contracts";
pub const TECHNOLOGY: &str = "Technology & Innovation";
pub const HEAVY_EQUIPMENT: &str = "Heavy Equipment";
pub const CATCH_ALL: &str = "Other News";

/// Bucket order in the digest.
pub const DISPLAY_ORDER: [&str; 6] = [
    ENERGY,
    CONSTRUCTION,
    TENDERS,
    TECHNOLOGY,
    HEAVY_EQUIPMENT,
    CATCH_ALL,
];

/// A keyword rule: a title containing any keyword belongs to `label`.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub label: &'static str,
    /// Lower-case substrings tested against the lower-cased title.
    pub keywords: &'static [&'static str],
}

impl CategoryRule {
    pub fn matches(&self, lowered_title: &str) -> bool {
        self.keywords.iter().any(|k| lowered_title.contains(k))
    }
}

/// Rules in evaluation order.
pub const PRIORITY_RULES: [CategoryRule; 5] = [
    CategoryRule {
        label: ENERGY,
        keywords: &["oil", "gas", "energy", "ongc"],
    },
    CategoryRule {
        label: CONSTRUCTION,
        keywords: &["construction", "infrastructure", "bridge", "metro"],
    },
    CategoryRule {
        label: TENDERS,
        keywords: &["tender", "bid", "contract"],
    },
    CategoryRule {
        label: HEAVY_EQUIPMENT,
        keywords: &[
            "crane",
            "loader",
            "excavator",
            "backhoe",
            "bulldozer",
            "heavy equipment",
            "jcb",
            "construction machine",
        ],
    },
    CategoryRule {
        label: TECHNOLOGY,
        keywords: &["technology", "digital", "ai"],
    },
];

/// Label of the first rule matching `title`, or [`CATCH_ALL`].
pub fn classify(title: &str) -> &'static str {
    let lowered = title.to_lowercase();
    PRIORITY_RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.label)
        .unwrap_or(CATCH_ALL)
}

/// Assign every headline to exactly one bucket.
///
/// All buckets of [`DISPLAY_ORDER`] are present in the result; headlines keep
/// their input order within a bucket.
#[instrument(level = "info", skip_all, fields(count = headlines.len()))]
pub fn categorize(headlines: Vec<Headline>) -> CategorizedHeadlines {
    let mut categorized = CategorizedHeadlines::new(&DISPLAY_ORDER, CATCH_ALL);

    for headline in headlines {
        let label = classify(&headline.title);
        debug!(title = %headline.title, category = label, "Categorized headline");
        let filed = categorized.push(label, headline);
        if filed != label {
            warn!(category = label, filed, "No bucket for rule label; filed under catch-all");
        }
    }

    for bucket in categorized.buckets() {
        info!(category = bucket.label, count = bucket.headlines.len(), "Bucket size");
    }
    categorized
}
