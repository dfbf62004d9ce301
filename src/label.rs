//! # Label Deriver
//!
//! Training labels come from the like/dislike balance:
//! `ld_score = likes / (likes + dislikes)`, binned three ways. A video nobody
//! voted on carries no reception signal at all, so such rows are dropped from
//! training rather than given an arbitrary label.

use serde::{Deserialize, Serialize};

/// Three-way reception verdict. Serialized lowercase, the way responses and
/// stored predictions spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Negative,
    Neutral,
    Positive,
}

impl Label {
    /// All labels in model order (-1, 0, 1).
    pub const ALL: [Label; 3] = [Label::Negative, Label::Neutral, Label::Positive];

    /// The numeric class the model was trained on.
    pub fn as_i8(self) -> i8 {
        match self {
            Label::Negative => -1,
            Label::Neutral => 0,
            Label::Positive => 1,
        }
    }

    pub fn from_i8(value: i8) -> Option<Label> {
        match value {
            -1 => Some(Label::Negative),
            0 => Some(Label::Neutral),
            1 => Some(Label::Positive),
            _ => None,
        }
    }

    /// Position in [`Label::ALL`], for confusion-matrix indexing.
    pub fn index(self) -> usize {
        match self {
            Label::Negative => 0,
            Label::Neutral => 1,
            Label::Positive => 2,
        }
    }
}

/// Like/dislike balance in `[0, 1]`. `None` marks the degenerate case of a
/// video with no votes in either direction.
pub fn ld_score(like_count: i64, dislike_count: i64) -> Option<f64> {
    let total = like_count + dislike_count;
    if total <= 0 {
        return None;
    }
    Some(like_count as f64 / total as f64)
}

/// Bin an `ld_score` into the three-way label.
///
/// Boundaries: `<= 0.5` is negative (at least as many dislikes as likes),
/// `< 0.75` is neutral, `>= 0.75` is positive.
pub fn bin_ld_score(score: f64) -> Label {
    if score <= 0.5 {
        Label::Negative
    } else if score < 0.75 {
        Label::Neutral
    } else {
        Label::Positive
    }
}

/// Derive the training label for one video; `None` drops the row.
pub fn derive_label(like_count: i64, dislike_count: i64) -> Option<Label> {
    ld_score(like_count, dislike_count).map(bin_ld_score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_like_share_of_all_votes() {
        assert_eq!(ld_score(3, 1), Some(0.75));
        assert_eq!(ld_score(1, 1), Some(0.5));
        assert_eq!(ld_score(0, 5), Some(0.0));
        assert_eq!(ld_score(5, 0), Some(1.0));
    }

    #[test]
    fn no_votes_is_degenerate() {
        assert_eq!(ld_score(0, 0), None);
        assert_eq!(derive_label(0, 0), None);
    }

    #[test]
    fn binning_boundaries() {
        // Exactly half likes is still negative.
        assert_eq!(bin_ld_score(0.5), Label::Negative);
        assert_eq!(bin_ld_score(0.500001), Label::Neutral);
        assert_eq!(bin_ld_score(0.749999), Label::Neutral);
        // Exactly three quarters is positive.
        assert_eq!(bin_ld_score(0.75), Label::Positive);
        assert_eq!(bin_ld_score(0.0), Label::Negative);
        assert_eq!(bin_ld_score(1.0), Label::Positive);
    }

    #[test]
    fn derived_labels_from_raw_counts() {
        assert_eq!(derive_label(1, 3), Some(Label::Negative));
        assert_eq!(derive_label(1, 1), Some(Label::Negative));
        assert_eq!(derive_label(2, 1), Some(Label::Neutral));
        assert_eq!(derive_label(3, 1), Some(Label::Positive));
        assert_eq!(derive_label(100, 0), Some(Label::Positive));
    }

    #[test]
    fn numeric_round_trip() {
        for label in Label::ALL {
            assert_eq!(Label::from_i8(label.as_i8()), Some(label));
        }
        assert_eq!(Label::from_i8(2), None);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Label::Positive).unwrap(), "\"positive\"");
        assert_eq!(serde_json::to_string(&Label::Negative).unwrap(), "\"negative\"");
        let back: Label = serde_json::from_str("\"neutral\"").unwrap();
        assert_eq!(back, Label::Neutral);
    }
}
