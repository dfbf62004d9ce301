//! # Classifier Boundary
//!
//! The trained reception model is a collaborator behind [`ReceptionClassifier`]:
//! the pipeline guarantees it a finite 18-column vector, the classifier
//! guarantees back a label in {-1, 0, 1}. The heavyweight ensemble trained
//! offline plugs in through this trait; the crate ships
//! [`BaselineClassifier`] so the binaries run end to end without it.
//!
//! The baseline has two modes. Unfit, it applies fixed compound-sentiment
//! thresholds. Fit, it standardizes columns and predicts the nearest class
//! centroid. Fitted state round-trips through a JSON artifact; a missing or
//! corrupt artifact is a startup error, not a silent fallback.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::features::FeatureVector;
use crate::label::Label;

/// Compound score at or above which unfit predictions are positive.
const POSITIVE_COMPOUND: f64 = 0.25;
/// Compound score at or below which unfit predictions are negative.
const NEGATIVE_COMPOUND: f64 = -0.05;

pub trait ReceptionClassifier: Send + Sync {
    /// Train on assembled rows. Implementations may be refit repeatedly.
    fn fit(&mut self, rows: &[FeatureVector], labels: &[Label]) -> Result<()>;
    /// Predict one label. Total: every finite vector maps to some label.
    fn predict(&self, features: &FeatureVector) -> Label;
    fn name(&self) -> &'static str;
}

/// Nearest-centroid baseline with a sentiment-threshold fallback while unfit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineClassifier {
    fitted: Option<FittedState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FittedState {
    /// Per-column mean over the training rows.
    means: [f64; 18],
    /// Per-column standard deviation, 1.0 where a column is constant.
    scales: [f64; 18],
    /// Standardized class centroids, one per class seen in training.
    centroids: Vec<Centroid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Centroid {
    label: Label,
    point: [f64; 18],
}

impl BaselineClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Persist the fitted state as a JSON artifact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let body = serde_json::to_string_pretty(self).context("serializing model artifact")?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        std::fs::write(path, body)
            .with_context(|| format!("writing model artifact to {}", path.display()))
    }

    /// Load a previously saved artifact. A missing file is an error the
    /// caller surfaces; serving never silently starts without its model.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading model artifact from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing model artifact {}", path.display()))
    }

    fn standardize(state: &FittedState, row: &[f64; 18]) -> [f64; 18] {
        let mut out = [0.0f64; 18];
        for i in 0..18 {
            out[i] = (row[i] - state.means[i]) / state.scales[i];
        }
        out
    }

    fn threshold_predict(features: &FeatureVector) -> Label {
        // Without comments the description is the only sentiment signal.
        let signal = if features.no_comments_binary >= 0.5 {
            features.desc_compound
        } else {
            0.6 * features.comment_compound + 0.4 * features.desc_compound
        };
        if signal >= POSITIVE_COMPOUND {
            Label::Positive
        } else if signal <= NEGATIVE_COMPOUND {
            Label::Negative
        } else {
            Label::Neutral
        }
    }
}

impl ReceptionClassifier for BaselineClassifier {
    fn fit(&mut self, rows: &[FeatureVector], labels: &[Label]) -> Result<()> {
        if rows.is_empty() {
            bail!("cannot fit on an empty training frame");
        }
        if rows.len() != labels.len() {
            bail!(
                "rows/labels length mismatch: {} vs {}",
                rows.len(),
                labels.len()
            );
        }

        let matrix: Vec<[f64; 18]> = rows.iter().map(FeatureVector::to_row).collect();
        let n = matrix.len() as f64;

        let mut means = [0.0f64; 18];
        for row in &matrix {
            for i in 0..18 {
                means[i] += row[i];
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut scales = [0.0f64; 18];
        for row in &matrix {
            for i in 0..18 {
                let d = row[i] - means[i];
                scales[i] += d * d;
            }
        }
        for s in &mut scales {
            *s = (*s / n).sqrt();
            if *s < 1e-12 {
                *s = 1.0;
            }
        }

        let state = FittedState {
            means,
            scales,
            centroids: Vec::new(),
        };

        let mut centroids: Vec<Centroid> = Vec::new();
        for class in Label::ALL {
            let mut point = [0.0f64; 18];
            let mut count = 0usize;
            for (row, label) in matrix.iter().zip(labels) {
                if *label == class {
                    let z = Self::standardize(&state, row);
                    for i in 0..18 {
                        point[i] += z[i];
                    }
                    count += 1;
                }
            }
            if count > 0 {
                for p in &mut point {
                    *p /= count as f64;
                }
                centroids.push(Centroid {
                    label: class,
                    point,
                });
            }
        }

        info!(
            rows = rows.len(),
            classes = centroids.len(),
            "fitted baseline classifier"
        );
        self.fitted = Some(FittedState { centroids, ..state });
        Ok(())
    }

    fn predict(&self, features: &FeatureVector) -> Label {
        let Some(state) = &self.fitted else {
            return Self::threshold_predict(features);
        };

        let z = Self::standardize(state, &features.to_row());
        let mut best = (Label::Neutral, f64::INFINITY);
        for centroid in &state.centroids {
            let dist: f64 = centroid
                .point
                .iter()
                .zip(z.iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            if dist < best.1 {
                best = (centroid.label, dist);
            }
        }
        best.0
    }

    fn name(&self) -> &'static str {
        "baseline-centroid"
    }
}

/// Quality summary for a fitted classifier over a held-out frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub accuracy: f64,
    /// Per-class F1 in [`Label::ALL`] order.
    pub f1_per_class: [f64; 3],
    pub f1_macro: f64,
    pub f1_weighted: f64,
    pub matthews_corrcoef: f64,
    /// True-label counts in [`Label::ALL`] order.
    pub support: [usize; 3],
    /// `confusion[truth][predicted]` in [`Label::ALL`] order.
    pub confusion: [[usize; 3]; 3],
}

/// Compare predictions against ground truth.
pub fn evaluate(predicted: &[Label], truth: &[Label]) -> Result<EvaluationSummary> {
    if predicted.is_empty() {
        bail!("cannot evaluate an empty frame");
    }
    if predicted.len() != truth.len() {
        bail!(
            "predicted/truth length mismatch: {} vs {}",
            predicted.len(),
            truth.len()
        );
    }

    let mut confusion = [[0usize; 3]; 3];
    for (p, t) in predicted.iter().zip(truth) {
        confusion[t.index()][p.index()] += 1;
    }

    let total = predicted.len() as f64;
    let correct: usize = (0..3).map(|k| confusion[k][k]).sum();

    let mut support = [0usize; 3];
    let mut predicted_count = [0usize; 3];
    for k in 0..3 {
        support[k] = confusion[k].iter().sum();
        predicted_count[k] = (0..3).map(|t| confusion[t][k]).sum();
    }

    let mut f1_per_class = [0.0f64; 3];
    for k in 0..3 {
        let tp = confusion[k][k] as f64;
        let precision = if predicted_count[k] > 0 {
            tp / predicted_count[k] as f64
        } else {
            0.0
        };
        let recall = if support[k] > 0 {
            tp / support[k] as f64
        } else {
            0.0
        };
        f1_per_class[k] = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
    }

    let f1_macro = f1_per_class.iter().sum::<f64>() / 3.0;
    let f1_weighted = (0..3)
        .map(|k| f1_per_class[k] * support[k] as f64)
        .sum::<f64>()
        / total;

    // Multiclass MCC straight from the confusion matrix.
    let c = correct as f64;
    let s = total;
    let dot: f64 = (0..3)
        .map(|k| predicted_count[k] as f64 * support[k] as f64)
        .sum();
    let p2: f64 = predicted_count.iter().map(|&p| (p as f64) * (p as f64)).sum();
    let t2: f64 = support.iter().map(|&t| (t as f64) * (t as f64)).sum();
    let denom = ((s * s - p2) * (s * s - t2)).sqrt();
    let matthews_corrcoef = if denom > 0.0 { (c * s - dot) / denom } else { 0.0 };

    Ok(EvaluationSummary {
        accuracy: c / s,
        f1_per_class,
        f1_macro,
        f1_weighted,
        matthews_corrcoef,
        support,
        confusion,
    })
}
