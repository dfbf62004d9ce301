//! Offline trainer: reads archive JSONL exports, builds and checkpoints the
//! training and testing frames, fits the baseline classifier, reports
//! held-out quality, and writes the model artifact the server loads.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use yt_reception_predictor::classifier::{evaluate, BaselineClassifier, ReceptionClassifier};
use yt_reception_predictor::config::PipelineConfig;
use yt_reception_predictor::dataset::{join_comments, FrameBuilder, TrainingFrame};
use yt_reception_predictor::features::FeatureAssembler;
use yt_reception_predictor::ingest::read_jsonl;
use yt_reception_predictor::ingest::types::{CommentRecord, VideoRecord};

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

fn load_frame(
    builder: &FrameBuilder<'_>,
    videos_path: &Path,
    comments_path: &Path,
) -> Result<TrainingFrame> {
    let videos: Vec<VideoRecord> = read_jsonl(videos_path)?;
    let comments: Vec<CommentRecord> = if comments_path.exists() {
        read_jsonl(comments_path)?
    } else {
        warn!(path = %comments_path.display(), "no comment export, continuing without");
        Vec::new()
    };
    info!(
        videos = videos.len(),
        comments = comments.len(),
        "loaded archive export"
    );
    Ok(builder.build(&join_comments(videos, comments)))
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let config = PipelineConfig::load().context("loading pipeline config")?;

    let train_videos = env_path("TRAIN_VIDEOS", "data/train_videos.jsonl");
    let train_comments = env_path("TRAIN_COMMENTS", "data/train_comments.jsonl");
    let test_videos = env_path("TEST_VIDEOS", "data/test_videos.jsonl");
    let test_comments = env_path("TEST_COMMENTS", "data/test_comments.jsonl");

    let assembler = FeatureAssembler::new();

    // Training rows are filtered and shuffled; held-out rows stay as
    // exported so evaluation mirrors what serving will see.
    let training = load_frame(
        &FrameBuilder::new(&assembler)
            .english_only(config.english_only_training)
            .shuffle_seed(config.shuffle_seed),
        &train_videos,
        &train_comments,
    )
    .context("building training frame")?;
    training.save_checkpoint(&config.checkpoint_dir, "training")?;

    let mut classifier = BaselineClassifier::new();
    classifier
        .fit(&training.rows, &training.labels)
        .context("fitting classifier")?;

    if test_videos.exists() {
        let testing = load_frame(&FrameBuilder::new(&assembler), &test_videos, &test_comments)
            .context("building testing frame")?;
        testing.save_checkpoint(&config.checkpoint_dir, "testing")?;

        if testing.is_empty() {
            warn!("testing frame is empty, skipping evaluation");
        } else {
            let predicted: Vec<_> = testing.rows.iter().map(|r| classifier.predict(r)).collect();
            let summary = evaluate(&predicted, &testing.labels)?;
            info!(
                accuracy = summary.accuracy,
                f1_macro = summary.f1_macro,
                f1_weighted = summary.f1_weighted,
                mcc = summary.matthews_corrcoef,
                "held-out evaluation"
            );
        }
    } else {
        warn!(path = %test_videos.display(), "no testing export, skipping evaluation");
    }

    let model_path = config
        .model_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("data/model.json"));
    classifier.save(&model_path)?;

    println!(
        "training done: {} rows -> {}",
        training.len(),
        model_path.display()
    );
    Ok(())
}
