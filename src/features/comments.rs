//! # Comment Aggregator
//!
//! Per-video roll-up of scraped comments: each comment is cleaned and scored
//! individually, then the sentiment components and the vote tallies are
//! averaged. Videos with no usable comments get the all-zero profile plus the
//! `NoCommentsBinary` flag so the model can tell "silent video" apart from
//! "genuinely neutral comments".
//!
//! Vote tallies arrive as free text (`"324"`, `"1.2K"`, `""`). Only cleanly
//! numeric tallies enter the vote mean; the rest are excluded, not zeroed,
//! mirroring a coerce-to-missing parse. Sentiment means always run over all
//! comments.

use metrics::counter;
use tracing::debug;

use crate::ingest::types::CommentRecord;
use crate::normalize::clean_text;
use crate::sentiment::SentimentAnalyzer;

/// Aggregated comment-side feature values for one video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommentAggregate {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
    /// Mean of the parseable vote tallies, 0.0 when none parsed.
    pub votes: f64,
    /// True when the video had zero usable comments.
    pub no_comments: bool,
}

impl CommentAggregate {
    pub const EMPTY: CommentAggregate = CommentAggregate {
        neg: 0.0,
        neu: 0.0,
        pos: 0.0,
        compound: 0.0,
        votes: 0.0,
        no_comments: true,
    };
}

/// Aggregate a video's comments. An empty slice is the documented
/// no-comments case; absent fetches are mapped to the empty slice upstream.
pub fn aggregate_comments(
    analyzer: &SentimentAnalyzer,
    comments: &[CommentRecord],
) -> CommentAggregate {
    if comments.is_empty() {
        counter!("features_no_comments_total").increment(1);
        return CommentAggregate::EMPTY;
    }

    let n = comments.len() as f64;
    let mut neg_sum = 0.0;
    let mut neu_sum = 0.0;
    let mut pos_sum = 0.0;
    let mut compound_sum = 0.0;
    let mut vote_sum = 0.0;
    let mut vote_n = 0usize;
    let mut unparsed_votes = 0usize;

    for comment in comments {
        let scores = analyzer.polarity_scores(&clean_text(&comment.text));
        neg_sum += scores.neg;
        neu_sum += scores.neu;
        pos_sum += scores.pos;
        compound_sum += scores.compound;

        match parse_votes(&comment.votes) {
            Some(v) => {
                vote_sum += v;
                vote_n += 1;
            }
            None => unparsed_votes += 1,
        }
    }

    if unparsed_votes > 0 {
        counter!("features_unparsed_votes_total").increment(unparsed_votes as u64);
        debug!(
            unparsed = unparsed_votes,
            total = comments.len(),
            "vote tallies excluded from the mean"
        );
    }

    CommentAggregate {
        neg: neg_sum / n,
        neu: neu_sum / n,
        pos: pos_sum / n,
        compound: compound_sum / n,
        votes: if vote_n > 0 {
            vote_sum / vote_n as f64
        } else {
            0.0
        },
        no_comments: false,
    }
}

/// Strictly numeric vote parse. `"1.2K"`, `""` and other scraper artifacts
/// read as missing.
fn parse_votes(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
