// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod features;
pub mod ingest;
pub mod label;
pub mod metrics;
pub mod normalize;
pub mod sentiment;
pub mod store;

// ---- Re-exports for stable public API ----
// Router assembly both ways: `crate_root::api::create_router` and `crate_root::create_router`.
pub use crate::api::{create_router, AppState};
pub use crate::classifier::{BaselineClassifier, ReceptionClassifier};
pub use crate::features::{FeatureAssembler, FeatureVector, FEATURE_COLUMNS};
pub use crate::label::Label;
