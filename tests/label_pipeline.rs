// tests/label_pipeline.rs
//
// Like/dislike ratios all the way to frame labels: boundary bins, the
// degenerate (0, 0) drop, and the wire encoding of the label itself.

use yt_reception_predictor::dataset::FrameBuilder;
use yt_reception_predictor::ingest::types::VideoRecord;
use yt_reception_predictor::label::{bin_ld_score, derive_label, ld_score};
use yt_reception_predictor::{FeatureAssembler, Label};

fn video(id: &str, likes: i64, dislikes: i64) -> VideoRecord {
    let mut v = VideoRecord::with_id(id);
    v.like_count = likes;
    v.dislike_count = dislikes;
    v.view_count = 10_000;
    v
}

#[test]
fn boundary_table_through_the_frame_builder() {
    let cases = vec![
        // (likes, dislikes, expected label)
        (1, 1, Label::Negative),   // 0.50 exactly: negative closes its bin
        (0, 5, Label::Negative),   // 0.00
        (7, 3, Label::Neutral),    // 0.70
        (74, 26, Label::Neutral),  // 0.74
        (3, 1, Label::Positive),   // 0.75 exactly: positive opens at 0.75
        (5, 0, Label::Positive),   // 1.00
    ];

    let mut records = Vec::new();
    for (i, (likes, dislikes, _)) in cases.iter().enumerate() {
        records.push((video(&format!("label-case-{i}"), *likes, *dislikes), None));
    }
    // One degenerate row in the middle, silently droppable.
    records.insert(3, (video("label-degenerate", 0, 0), None));

    let assembler = FeatureAssembler::new();
    let frame = FrameBuilder::new(&assembler).build(&records);

    assert_eq!(frame.len(), cases.len());
    assert_eq!(frame.dropped_degenerate, 1);
    for (i, (likes, dislikes, expected)) in cases.iter().enumerate() {
        assert_eq!(
            frame.labels[i], *expected,
            "({likes}, {dislikes}) should bin as {expected:?}"
        );
    }
}

#[test]
fn ld_score_matches_hand_computation() {
    assert_eq!(ld_score(80, 20), Some(0.8));
    assert_eq!(ld_score(0, 0), None);
    assert_eq!(ld_score(1, 0), Some(1.0));
    assert_eq!(ld_score(0, 9), Some(0.0));
}

#[test]
fn bins_partition_the_unit_interval() {
    // Every score lands in exactly one bin, with the documented boundaries.
    for permille in 0..=1000 {
        let score = permille as f64 / 1000.0;
        let label = bin_ld_score(score);
        let expected = if score <= 0.5 {
            Label::Negative
        } else if score < 0.75 {
            Label::Neutral
        } else {
            Label::Positive
        };
        assert_eq!(label, expected, "score {score}");
    }
}

#[test]
fn derive_label_composes_score_and_bin() {
    assert_eq!(derive_label(80, 20), Some(Label::Positive));
    assert_eq!(derive_label(60, 40), Some(Label::Neutral));
    assert_eq!(derive_label(20, 80), Some(Label::Negative));
    assert_eq!(derive_label(0, 0), None);
}

#[test]
fn label_wire_encoding_is_stable() {
    assert_eq!(serde_json::to_string(&Label::Negative).unwrap(), "\"negative\"");
    assert_eq!(serde_json::to_string(&Label::Neutral).unwrap(), "\"neutral\"");
    assert_eq!(serde_json::to_string(&Label::Positive).unwrap(), "\"positive\"");

    for label in Label::ALL {
        assert_eq!(Label::from_i8(label.as_i8()), Some(label));
        let json = serde_json::to_string(&label).unwrap();
        let back: Label = serde_json::from_str(&json).unwrap();
        assert_eq!(back, label);
    }
}
