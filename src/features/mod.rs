// src/features/mod.rs
//
// The fixed-width feature vector and the one assembler that produces it.
// Training and serving both call `FeatureAssembler::assemble`; there is no
// second code path, so the two sides cannot drift apart.

pub mod category;
pub mod comments;
pub mod description;
pub mod ratio;

use std::time::Instant;

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::category::{category_code, FALLBACK_CATEGORY_CODE};
use crate::features::comments::aggregate_comments;
use crate::features::description::description_scores;
use crate::features::ratio::smoothed_view_like_ratio;
use crate::ingest::types::{CommentRecord, VideoRecord};
use crate::sentiment::SentimentAnalyzer;

/// Column names in model order. The classifier, the checkpoints and the API
/// all speak this exact layout; never reorder, rename or append in the
/// middle.
pub const FEATURE_COLUMNS: [&str; 18] = [
    "duration",
    "age_limit",
    "view_count",
    "like_count",
    "view_like_ratio_smoothed",
    "is_comments_enabled",
    "is_live_content",
    "cat_codes",
    "desc_neu",
    "desc_neg",
    "desc_pos",
    "desc_compound",
    "comment_neu",
    "comment_neg",
    "comment_pos",
    "comment_compound",
    "votes",
    "NoCommentsBinary",
];

/// One assembled vector. Field order mirrors [`FEATURE_COLUMNS`]; serde
/// names match the column names, so a serialized vector is keyed the way the
/// model was trained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub duration: f64,
    pub age_limit: f64,
    pub view_count: f64,
    pub like_count: f64,
    pub view_like_ratio_smoothed: f64,
    pub is_comments_enabled: f64,
    pub is_live_content: f64,
    pub cat_codes: f64,
    pub desc_neu: f64,
    pub desc_neg: f64,
    pub desc_pos: f64,
    pub desc_compound: f64,
    pub comment_neu: f64,
    pub comment_neg: f64,
    pub comment_pos: f64,
    pub comment_compound: f64,
    pub votes: f64,
    #[serde(rename = "NoCommentsBinary")]
    pub no_comments_binary: f64,
}

impl FeatureVector {
    /// The vector as a plain row in column order.
    pub fn to_row(&self) -> [f64; 18] {
        [
            self.duration,
            self.age_limit,
            self.view_count,
            self.like_count,
            self.view_like_ratio_smoothed,
            self.is_comments_enabled,
            self.is_live_content,
            self.cat_codes,
            self.desc_neu,
            self.desc_neg,
            self.desc_pos,
            self.desc_compound,
            self.comment_neu,
            self.comment_neg,
            self.comment_pos,
            self.comment_compound,
            self.votes,
            self.no_comments_binary,
        ]
    }

    /// Rebuild a vector from a plain row in column order.
    pub fn from_row(row: [f64; 18]) -> Self {
        Self {
            duration: row[0],
            age_limit: row[1],
            view_count: row[2],
            like_count: row[3],
            view_like_ratio_smoothed: row[4],
            is_comments_enabled: row[5],
            is_live_content: row[6],
            cat_codes: row[7],
            desc_neu: row[8],
            desc_neg: row[9],
            desc_pos: row[10],
            desc_compound: row[11],
            comment_neu: row[12],
            comment_neg: row[13],
            comment_pos: row[14],
            comment_compound: row[15],
            votes: row[16],
            no_comments_binary: row[17],
        }
    }

    /// Replace any non-finite component with 0.0. The assembler's output
    /// contract: no NaN, no infinity, ever.
    pub fn sanitized(self) -> Self {
        let mut row = self.to_row();
        for value in &mut row {
            if !value.is_finite() {
                *value = 0.0;
            }
        }
        Self::from_row(row)
    }
}

/// The single source of truth for feature assembly.
#[derive(Debug, Clone, Default)]
pub struct FeatureAssembler {
    analyzer: SentimentAnalyzer,
}

impl FeatureAssembler {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentAnalyzer::new(),
        }
    }

    /// Assemble the 18-column vector for one video and its comments.
    ///
    /// `comments` may be empty — that is the documented zero-comments case
    /// (`NoCommentsBinary = 1`, comment-side features zeroed). Callers
    /// holding an absent fetch pass the empty slice.
    pub fn assemble(&self, video: &VideoRecord, comments: &[CommentRecord]) -> FeatureVector {
        crate::metrics::ensure_pipeline_metrics_described();
        let started = Instant::now();

        let desc = description_scores(&self.analyzer, video.description.as_deref());
        let agg = aggregate_comments(&self.analyzer, comments);
        let cat = video
            .category
            .as_ref()
            .map(category_code)
            .unwrap_or(FALLBACK_CATEGORY_CODE);

        let vector = FeatureVector {
            duration: video.duration_minutes(),
            age_limit: video.age_limit as f64,
            view_count: video.view_count as f64,
            like_count: video.like_count as f64,
            view_like_ratio_smoothed: smoothed_view_like_ratio(
                video.view_count,
                video.like_count,
            ),
            is_comments_enabled: flag(video.is_comments_enabled),
            is_live_content: flag(video.is_live_content),
            cat_codes: cat as f64,
            desc_neu: desc.neu,
            desc_neg: desc.neg,
            desc_pos: desc.pos,
            desc_compound: desc.compound,
            comment_neu: agg.neu,
            comment_neg: agg.neg,
            comment_pos: agg.pos,
            comment_compound: agg.compound,
            votes: agg.votes,
            no_comments_binary: flag(agg.no_comments),
        }
        .sanitized();

        histogram!("features_assemble_ms").record(started.elapsed().as_secs_f64() * 1000.0);
        counter!("features_assembled_total").increment(1);
        debug!(video_id = %video.id, comments = comments.len(), "assembled feature vector");

        vector
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::category::CategoryField;
    use crate::ingest::types::DurationField;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn eighteen_columns_and_row_order_match() {
        assert_eq!(FEATURE_COLUMNS.len(), 18);

        // Distinct sentinels per position must survive the round trip.
        let mut row = [0.0f64; 18];
        for (i, v) in row.iter_mut().enumerate() {
            *v = i as f64 + 0.5;
        }
        let vector = FeatureVector::from_row(row);
        assert_eq!(vector.to_row(), row);

        // Serialized field order is the column order.
        let json = serde_json::to_string(&vector).unwrap();
        let mut last = 0usize;
        for column in FEATURE_COLUMNS {
            let at = json
                .find(&format!("\"{column}\""))
                .unwrap_or_else(|| panic!("column {column} missing from json"));
            assert!(at >= last, "column {column} out of order");
            last = at;
        }
    }

    #[test]
    fn empty_record_assembles_to_documented_defaults() {
        let assembler = FeatureAssembler::new();
        let video = VideoRecord::with_id("dQw4w9WgXcQ");
        let out = assembler.assemble(&video, &[]);

        assert!(approx(out.duration, 0.0));
        assert!(approx(out.view_count, 0.0));
        // (0 + 1) / (0 + 1)
        assert!(approx(out.view_like_ratio_smoothed, 1.0));
        assert!(approx(out.cat_codes, 0.0));
        assert!(approx(out.desc_neu, 0.0));
        assert!(approx(out.comment_compound, 0.0));
        assert!(approx(out.votes, 0.0));
        assert!(approx(out.no_comments_binary, 1.0));
    }

    #[test]
    fn populated_record_lands_in_the_right_columns() {
        let assembler = FeatureAssembler::new();
        let mut video = VideoRecord::with_id("abc123def45");
        video.duration = DurationField::Runtime("PT2M30S".into());
        video.age_limit = 18;
        video.view_count = 1000;
        video.like_count = 40;
        video.category = Some(CategoryField::Label("Music".into()));
        video.is_comments_enabled = true;
        video.description = Some("awesome track".into());

        let comments = vec![
            CommentRecord::of_text("abc123def45", "love this").with_votes("10"),
            CommentRecord::of_text("abc123def45", "terrible mix").with_votes("2"),
        ];
        let out = assembler.assemble(&video, &comments);
        let row = out.to_row();

        assert!(approx(row[0], 2.5)); // duration
        assert!(approx(row[1], 18.0)); // age_limit
        assert!(approx(row[2], 1000.0)); // view_count
        assert!(approx(row[3], 40.0)); // like_count
        assert!(approx(row[4], 25.0)); // view_like_ratio_smoothed
        assert!(approx(row[5], 1.0)); // is_comments_enabled
        assert!(approx(row[6], 0.0)); // is_live_content
        assert!(approx(row[7], 10.0)); // cat_codes
        assert!(row[11] > 0.0); // desc_compound
        assert!(approx(row[16], 6.0)); // votes mean
        assert!(approx(row[17], 0.0)); // NoCommentsBinary
    }

    #[test]
    fn output_never_carries_non_finite_values() {
        let dirty = FeatureVector::from_row([
            f64::NAN,
            f64::INFINITY,
            f64::NEG_INFINITY,
            1.0,
            2.0,
            3.0,
            4.0,
            5.0,
            6.0,
            7.0,
            8.0,
            9.0,
            10.0,
            11.0,
            12.0,
            13.0,
            14.0,
            15.0,
        ]);
        let clean = dirty.sanitized();
        assert!(clean.to_row().iter().all(|v| v.is_finite()));
        assert!(approx(clean.duration, 0.0));
        assert!(approx(clean.age_limit, 0.0));
        assert!(approx(clean.view_count, 0.0));
        assert!(approx(clean.like_count, 1.0));
    }

    #[test]
    fn assembly_is_deterministic() {
        let assembler = FeatureAssembler::new();
        let mut video = VideoRecord::with_id("abc123def45");
        video.description = Some("pretty good overall".into());
        let comments = vec![CommentRecord::of_text("abc123def45", "nice one").with_votes("7")];

        let first = assembler.assemble(&video, &comments);
        for _ in 0..3 {
            assert_eq!(assembler.assemble(&video, &comments), first);
        }
    }
}
