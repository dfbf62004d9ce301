//! Description-side sentiment features (`desc_neg`, `desc_neu`, `desc_pos`,
//! `desc_compound`): the shared cleaner followed by the shared scorer.

use crate::normalize::clean_opt_text;
use crate::sentiment::{SentimentAnalyzer, SentimentScores};

/// Score a video description. Absent descriptions score as empty text,
/// which yields the all-zero profile.
pub fn description_scores(
    analyzer: &SentimentAnalyzer,
    description: Option<&str>,
) -> SentimentScores {
    let cleaned = clean_opt_text(description);
    analyzer.polarity_scores(&cleaned)
}
