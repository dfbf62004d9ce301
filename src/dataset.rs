//! # Training Frames
//!
//! Turns raw (video, comments) pairs into aligned rows/labels/ids, applying
//! the two training-only drops: rows whose like and dislike counts are both
//! zero carry no reception signal, and (optionally) rows whose description
//! never hits the lexicon are assumed non-English. Frames shuffle with a
//! seeded generator so a rebuilt frame is byte-for-byte reproducible, and
//! checkpoint to JSON so feature extraction does not rerun on every
//! experiment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use metrics::counter;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::features::{FeatureAssembler, FeatureVector};
use crate::ingest::types::{CommentRecord, VideoRecord};
use crate::label::{derive_label, Label};

/// Aligned training data: `rows[i]`, `labels[i]` and `video_ids[i]` all
/// describe the same video.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingFrame {
    pub rows: Vec<FeatureVector>,
    pub labels: Vec<Label>,
    pub video_ids: Vec<String>,
    /// Videos dropped because like and dislike counts were both zero.
    pub dropped_degenerate: usize,
    /// Videos dropped by the English-only filter.
    pub dropped_non_english: usize,
}

impl TrainingFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the frame to `<dir>/<name>.json`, creating the directory.
    pub fn save_checkpoint(&self, dir: &Path, name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating checkpoint dir {}", dir.display()))?;
        let path = checkpoint_path(dir, name);
        let body = serde_json::to_string(self).context("serializing frame checkpoint")?;
        std::fs::write(&path, body)
            .with_context(|| format!("writing checkpoint {}", path.display()))?;
        info!(checkpoint = %path.display(), rows = self.len(), "saved frame checkpoint");
        Ok(path)
    }

    pub fn load_checkpoint(dir: &Path, name: &str) -> Result<Self> {
        let path = checkpoint_path(dir, name);
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading checkpoint {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing checkpoint {}", path.display()))
    }
}

fn checkpoint_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.json"))
}

/// Builds a [`TrainingFrame`] from raw records.
pub struct FrameBuilder<'a> {
    assembler: &'a FeatureAssembler,
    english_only: bool,
    shuffle_seed: Option<u64>,
}

impl<'a> FrameBuilder<'a> {
    pub fn new(assembler: &'a FeatureAssembler) -> Self {
        Self {
            assembler,
            english_only: false,
            shuffle_seed: None,
        }
    }

    /// Drop rows whose description scores entirely neutral. A description
    /// that never hits the lexicon is overwhelmingly a non-English one.
    pub fn english_only(mut self, enabled: bool) -> Self {
        self.english_only = enabled;
        self
    }

    /// Shuffle the finished frame with a fixed seed.
    pub fn shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn build(&self, records: &[(VideoRecord, Option<Vec<CommentRecord>>)]) -> TrainingFrame {
        let mut frame = TrainingFrame::default();

        for (video, comments) in records {
            let Some(label) = derive_label(video.like_count, video.dislike_count) else {
                frame.dropped_degenerate += 1;
                counter!("dataset_dropped_degenerate_total").increment(1);
                continue;
            };

            let features = self
                .assembler
                .assemble(video, comments.as_deref().unwrap_or(&[]));

            if self.english_only && (features.desc_neu - 1.0).abs() < f64::EPSILON {
                frame.dropped_non_english += 1;
                counter!("dataset_dropped_non_english_total").increment(1);
                continue;
            }

            frame.rows.push(features);
            frame.labels.push(label);
            frame.video_ids.push(video.id.clone());
        }

        if let Some(seed) = self.shuffle_seed {
            shuffle_frame(&mut frame, seed);
        }

        counter!("dataset_rows_total").increment(frame.len() as u64);
        info!(
            rows = frame.len(),
            dropped_degenerate = frame.dropped_degenerate,
            dropped_non_english = frame.dropped_non_english,
            shuffled = self.shuffle_seed.is_some(),
            "built training frame"
        );
        frame
    }
}

fn shuffle_frame(frame: &mut TrainingFrame, seed: u64) {
    let mut indices: Vec<usize> = (0..frame.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    // One permutation applied to all three columns keeps them aligned.
    frame.rows = indices.iter().map(|&i| frame.rows[i].clone()).collect();
    frame.labels = indices.iter().map(|&i| frame.labels[i]).collect();
    frame.video_ids = indices
        .iter()
        .map(|&i| std::mem::take(&mut frame.video_ids[i]))
        .collect();
}

/// Pair each video with its exported comments by video id. Videos with no
/// comment rows pair with `None`, which downstream treats the same as an
/// empty comment section.
pub fn join_comments(
    videos: Vec<VideoRecord>,
    comments: Vec<CommentRecord>,
) -> Vec<(VideoRecord, Option<Vec<CommentRecord>>)> {
    let mut by_video: HashMap<String, Vec<CommentRecord>> = HashMap::new();
    for comment in comments {
        by_video
            .entry(comment.video_id.clone())
            .or_default()
            .push(comment);
    }
    videos
        .into_iter()
        .map(|video| {
            let comments = by_video.remove(&video.id);
            (video, comments)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::{CommentRecord, VideoRecord};

    fn liked_video(id: &str, likes: i64, dislikes: i64) -> VideoRecord {
        let mut video = VideoRecord::with_id(id);
        video.like_count = likes;
        video.dislike_count = dislikes;
        video.view_count = 1_000;
        video.description = Some("what a great upload, loved it".to_string());
        video
    }

    fn cheerful_comment(video_id: &str, text: &str) -> CommentRecord {
        CommentRecord::of_text(video_id, text)
    }

    #[test]
    fn degenerate_rows_are_dropped() {
        let assembler = FeatureAssembler::new();
        let records = vec![
            (liked_video("keep-1", 80, 20), None),
            (liked_video("drop-1", 0, 0), None),
            (liked_video("keep-2", 10, 90), None),
        ];
        let frame = FrameBuilder::new(&assembler).build(&records);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.dropped_degenerate, 1);
        assert_eq!(frame.video_ids, vec!["keep-1", "keep-2"]);
        assert_eq!(frame.labels, vec![Label::Positive, Label::Negative]);
    }

    #[test]
    fn english_filter_drops_fully_neutral_descriptions() {
        let assembler = FeatureAssembler::new();
        let mut foreign = liked_video("foreign-1", 50, 50);
        foreign.description = Some("zupełnie inne słowa bez trafień".to_string());
        let records = vec![(liked_video("keep-1", 80, 20), None), (foreign, None)];

        let frame = FrameBuilder::new(&assembler)
            .english_only(true)
            .build(&records);
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.dropped_non_english, 1);

        // Same data without the filter keeps both rows.
        let records = vec![
            (liked_video("keep-1", 80, 20), None),
            ({
                let mut v = liked_video("foreign-1", 50, 50);
                v.description = Some("zupełnie inne słowa bez trafień".to_string());
                v
            }, None),
        ];
        let unfiltered = FrameBuilder::new(&assembler).build(&records);
        assert_eq!(unfiltered.len(), 2);
    }

    #[test]
    fn shuffle_is_deterministic_and_keeps_columns_aligned() {
        let assembler = FeatureAssembler::new();
        let records: Vec<_> = (0..30)
            .map(|i| {
                let likes = 10 + i as i64;
                (liked_video(&format!("vid-{i:02}"), likes, 5), None)
            })
            .collect();

        let first = FrameBuilder::new(&assembler)
            .shuffle_seed(42)
            .build(&records);
        let second = FrameBuilder::new(&assembler)
            .shuffle_seed(42)
            .build(&records);
        assert_eq!(first.video_ids, second.video_ids);
        assert_eq!(first.labels, second.labels);

        let unshuffled = FrameBuilder::new(&assembler).build(&records);
        assert_ne!(first.video_ids, unshuffled.video_ids);

        // Alignment survives the permutation.
        for (id, row) in first.video_ids.iter().zip(&first.rows) {
            let original_index: usize = id.trim_start_matches("vid-").parse().unwrap();
            let expected = &unshuffled.rows[unshuffled
                .video_ids
                .iter()
                .position(|v| v == id)
                .unwrap()];
            assert_eq!(row, expected);
            assert!((row.like_count - (10 + original_index as i64) as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn checkpoints_round_trip() {
        let assembler = FeatureAssembler::new();
        let records = vec![
            (
                liked_video("keep-1", 80, 20),
                Some(vec![cheerful_comment("keep-1", "brilliant video, loved it")]),
            ),
            (liked_video("keep-2", 10, 90), Some(vec![])),
        ];
        let frame = FrameBuilder::new(&assembler).build(&records);

        let dir = tempfile::tempdir().unwrap();
        let path = frame.save_checkpoint(dir.path(), "training").unwrap();
        assert!(path.ends_with("training.json"));

        let reloaded = TrainingFrame::load_checkpoint(dir.path(), "training").unwrap();
        assert_eq!(reloaded.video_ids, frame.video_ids);
        assert_eq!(reloaded.labels, frame.labels);
        assert_eq!(reloaded.rows, frame.rows);
        assert_eq!(reloaded.dropped_degenerate, 0);
    }

    #[test]
    fn missing_checkpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TrainingFrame::load_checkpoint(dir.path(), "absent").is_err());
    }

    #[test]
    fn join_pairs_comments_with_their_video() {
        let videos = vec![liked_video("aaa", 1, 1), liked_video("bbb", 2, 2)];
        let comments = vec![
            cheerful_comment("bbb", "first"),
            cheerful_comment("bbb", "second"),
        ];
        let joined = join_comments(videos, comments);
        assert_eq!(joined.len(), 2);
        assert!(joined[0].1.is_none());
        assert_eq!(joined[1].1.as_ref().unwrap().len(), 2);
    }
}
