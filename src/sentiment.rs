//! # Sentiment Scorer
//!
//! Lexicon-based polarity scoring that yields the four-part profile
//! `(neg, neu, pos, compound)` consumed by the feature pipeline. The lexicon
//! ships with the crate, so the same input always maps to the same scores on
//! every host, at training time and at serving time.
//!
//! Score semantics:
//! - empty input (no tokens) → all four components are 0,
//! - tokens present but none in the lexicon → `neu = 1.0`, everything else 0
//!   (downstream uses this signature as a foreign/empty-text heuristic),
//! - `compound` is the normalized sum of valences, bounded to `[-1, 1]`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid sentiment lexicon")
});

/// Dampens the compound sum; larger values flatten the curve.
const COMPOUND_ALPHA: f64 = 15.0;

/// Polarity profile of one piece of text.
///
/// `neg`, `neu` and `pos` are mass ratios in `[0, 1]` that sum to ~1 for any
/// non-empty input; `compound` is the bounded overall valence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

impl SentimentScores {
    pub const ZERO: SentimentScores = SentimentScores {
        neg: 0.0,
        neu: 0.0,
        pos: 0.0,
        compound: 0.0,
    };
}

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Lexicon valence for a word (0.0 when the word is unknown).
    #[inline]
    fn word_valence(&self, w: &str) -> f64 {
        *LEXICON.get(w).unwrap_or(&0.0)
    }

    /// Score one piece of text into the four-part profile.
    ///
    /// Negation: a negator within the preceding 1..=3 tokens inverts the sign
    /// of a word's lexicon valence ("not good" counts against "good").
    pub fn polarity_scores(&self, text: &str) -> SentimentScores {
        let tokens: Vec<String> = tokenize(text).collect();
        if tokens.is_empty() {
            return SentimentScores::ZERO;
        }

        let mut sum = 0.0f64;
        let mut pos_mass = 0.0f64;
        let mut neg_mass = 0.0f64;
        let mut neu_count = 0usize;

        for i in 0..tokens.len() {
            let w = tokens[i].as_str();
            let base = self.word_valence(w);
            if base == 0.0 {
                neu_count += 1;
                continue;
            }

            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            let valence = if negated { -base } else { base };

            sum += valence;
            if valence > 0.0 {
                // +1 keeps single weak words from saturating the ratio.
                pos_mass += valence + 1.0;
            } else {
                neg_mass += valence.abs() + 1.0;
            }
        }

        // Every token lands in exactly one bucket, so total >= 1 here.
        let total = pos_mass + neg_mass + neu_count as f64;

        SentimentScores {
            neg: round3(neg_mass / total),
            neu: round3(neu_count as f64 / total),
            pos: round3(pos_mass / total),
            compound: round4(normalize_compound(sum)),
        }
    }
}

/// Bound the raw valence sum to `(-1, 1)`.
fn normalize_compound(sum: f64) -> f64 {
    let norm = sum / (sum * sum + COMPOUND_ALPHA).sqrt();
    norm.clamp(-1.0, 1.0)
}

/// Alphanumeric tokens, lower-cased. Apostrophes split ("don't" → "don", "t"),
/// which is why `is_negator` matches the collapsed forms produced by the
/// shared text cleaner.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

/// Negator set over cleaned tokens (punctuation already stripped).
fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "neither"
            | "nor"
            | "nothing"
            | "nobody"
            | "cannot"
            | "cant"
            | "dont"
            | "doesnt"
            | "didnt"
            | "isnt"
            | "wasnt"
            | "arent"
            | "wont"
            | "aint"
            | "without"
    )
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_text_scores_all_zero() {
        let a = SentimentAnalyzer::new();
        for s in ["", "   ", "\n\t", "!!! ... ???"] {
            let out = a.polarity_scores(s);
            assert_eq!(out, SentimentScores::ZERO, "expected zeros for {s:?}");
        }
    }

    #[test]
    fn unknown_words_are_fully_neutral() {
        let a = SentimentAnalyzer::new();
        let out = a.polarity_scores("zxqv flurble grindle plombus");
        assert!(approx(out.neu, 1.0), "neu should be 1.0, got {}", out.neu);
        assert!(approx(out.neg, 0.0));
        assert!(approx(out.pos, 0.0));
        assert!(approx(out.compound, 0.0));
    }

    #[test]
    fn positive_text_has_positive_compound() {
        let a = SentimentAnalyzer::new();
        let out = a.polarity_scores("this video is awesome i love it");
        assert!(out.compound > 0.3, "compound {} too low", out.compound);
        assert!(out.pos > out.neg);
    }

    #[test]
    fn negative_text_has_negative_compound() {
        let a = SentimentAnalyzer::new();
        let out = a.polarity_scores("terrible clickbait trash waste of time");
        assert!(out.compound < -0.3, "compound {} too high", out.compound);
        assert!(out.neg > out.pos);
    }

    #[test]
    fn negation_flips_polarity() {
        let a = SentimentAnalyzer::new();
        let plain = a.polarity_scores("this is good");
        let negated = a.polarity_scores("this is not good");
        assert!(plain.compound > 0.0);
        assert!(negated.compound < 0.0);
        // "dont" is what the cleaner leaves of "don't".
        let collapsed = a.polarity_scores("i dont like this");
        assert!(collapsed.compound < 0.0);
    }

    #[test]
    fn negation_window_is_at_most_three_tokens() {
        let a = SentimentAnalyzer::new();
        // Four tokens between the negator and the scored word: out of range.
        let far = a.polarity_scores("not a b c d good");
        assert!(far.compound > 0.0, "negator beyond window must not flip");
    }

    #[test]
    fn compound_is_bounded() {
        let a = SentimentAnalyzer::new();
        let many = "awesome amazing perfect brilliant excellent ".repeat(40);
        let out = a.polarity_scores(&many);
        assert!(out.compound <= 1.0 && out.compound >= -1.0);
        assert!(out.compound > 0.95, "long praise should approach 1.0");
    }

    #[test]
    fn mass_ratios_sum_to_one_for_mixed_text() {
        let a = SentimentAnalyzer::new();
        let out = a.polarity_scores("great video but terrible audio somehow");
        let total = out.neg + out.neu + out.pos;
        assert!((total - 1.0).abs() < 5e-3, "ratios sum to {total}");
        assert!(out.neg > 0.0 && out.pos > 0.0 && out.neu > 0.0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let a = SentimentAnalyzer::new();
        let s = "i loved the editing but the ending was disappointing";
        let first = a.polarity_scores(s);
        for _ in 0..5 {
            assert_eq!(a.polarity_scores(s), first);
        }
    }
}
