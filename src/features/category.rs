//! # Category Mapper
//!
//! Canonical mapping between YouTube category labels and their numeric
//! `categoryId` codes. Archived exports carry the label ("Music", "Gaming"),
//! the live API carries the numeric id; both paths resolve through this one
//! table so a category encodes to the same `cat_codes` value everywhere.
//!
//! - Case-insensitive lookup with normalization of `&`, dashes, slashes.
//! - Aliases cover the "and"-spelled variants found in archived exports.
//! - Numeric input passes through unchanged; unknown labels fall back to 0
//!   and are logged with the nearest known label as a typo hint.

use metrics::counter;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Code for labels that resolve to nothing. Not assigned by YouTube.
pub const FALLBACK_CATEGORY_CODE: i64 = 0;

/// The published `videoCategories` id assignments. Ids are sparse (3..=9 and
/// 11..=14 were never assigned) and "Comedy" appears twice; label lookup
/// resolves to the first entry (23).
const CATEGORY_TABLE: [(i64, &str); 32] = [
    (1, "Film & Animation"),
    (2, "Autos & Vehicles"),
    (10, "Music"),
    (15, "Pets & Animals"),
    (17, "Sports"),
    (18, "Short Movies"),
    (19, "Travel & Events"),
    (20, "Gaming"),
    (21, "Videoblogging"),
    (22, "People & Blogs"),
    (23, "Comedy"),
    (24, "Entertainment"),
    (25, "News & Politics"),
    (26, "Howto & Style"),
    (27, "Education"),
    (28, "Science & Technology"),
    (29, "Nonprofits & Activism"),
    (30, "Movies"),
    (31, "Anime/Animation"),
    (32, "Action/Adventure"),
    (33, "Classics"),
    (34, "Comedy"),
    (35, "Documentary"),
    (36, "Drama"),
    (37, "Family"),
    (38, "Foreign"),
    (39, "Horror"),
    (40, "Sci-Fi/Fantasy"),
    (41, "Thriller"),
    (42, "Shorts"),
    (43, "Shows"),
    (44, "Trailers"),
];

/// Spelling variants seen in archived metadata → canonical normalized label.
const LABEL_ALIASES: [(&str, &str); 9] = [
    ("film and animation", "film animation"),
    ("autos and vehicles", "autos vehicles"),
    ("pets and animals", "pets animals"),
    ("travel and events", "travel events"),
    ("people and blogs", "people blogs"),
    ("how to style", "howto style"),
    ("howto and style", "howto style"),
    ("science and technology", "science technology"),
    ("nonprofits and activism", "nonprofits activism"),
];

static CODE_BY_LABEL: Lazy<HashMap<String, i64>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (code, label) in CATEGORY_TABLE {
        // First insertion wins, so the duplicate "Comedy" stays at 23.
        map.entry(normalize(label)).or_insert(code);
    }
    for (alias, canonical) in LABEL_ALIASES {
        if let Some(&code) = map.get(canonical) {
            map.insert(alias.to_string(), code);
        }
    }
    map
});

static LABEL_BY_CODE: Lazy<HashMap<i64, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (code, label) in CATEGORY_TABLE {
        map.insert(code, label);
    }
    map
});

/// Category as it arrives on a record: the archive ships label strings, the
/// live API ships numeric ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryField {
    Code(i64),
    Label(String),
}

/// Resolve a category to its numeric code.
///
/// Numeric input is a no-op (already encoded upstream); label input goes
/// through normalized lookup. Anything unresolvable maps to
/// [`FALLBACK_CATEGORY_CODE`] and is counted as a data-quality signal.
pub fn category_code(field: &CategoryField) -> i64 {
    match field {
        CategoryField::Code(code) => {
            if *code < 0 {
                counter!("features_unknown_category_total").increment(1);
                warn!(code, "negative category code, using fallback");
                FALLBACK_CATEGORY_CODE
            } else {
                *code
            }
        }
        CategoryField::Label(label) => {
            let key = normalize(label);
            match CODE_BY_LABEL.get(&key) {
                Some(&code) => code,
                None => {
                    counter!("features_unknown_category_total").increment(1);
                    match nearest_label(&key) {
                        Some((near, sim)) => warn!(
                            label,
                            nearest = near,
                            similarity = format!("{sim:.2}"),
                            "unknown category label, using fallback"
                        ),
                        None => warn!(label, "unknown category label, using fallback"),
                    }
                    FALLBACK_CATEGORY_CODE
                }
            }
        }
    }
}

/// Canonical label for a code, if the code is assigned.
pub fn label_for_code(code: i64) -> Option<&'static str> {
    LABEL_BY_CODE.get(&code).copied()
}

/// Closest known label by Jaro–Winkler similarity, for the fallback log.
fn nearest_label(normalized_input: &str) -> Option<(&'static str, f64)> {
    CATEGORY_TABLE
        .iter()
        .map(|(_, label)| {
            let sim = strsim::jaro_winkler(normalized_input, &normalize(label));
            (*label, sim)
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .filter(|(_, sim)| *sim >= 0.75)
}

/// Lowercase, turn separators (`&`, `/`, dashes, underscores) into spaces,
/// collapse runs of whitespace.
fn normalize(s: &str) -> String {
    let mut out = s.trim().to_lowercase();

    for ch in ['—', '–', '-', '_', '/', '\\', '&'] {
        out = out.replace(ch, " ");
    }
    out = out.replace(['\n', '\r', '\t', '.', ',', '\''], " ");

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
