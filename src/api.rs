use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use metrics::counter;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::classifier::ReceptionClassifier;
use crate::features::{FeatureAssembler, FeatureVector};
use crate::ingest::extract_video_id;
use crate::ingest::types::{CommentRecord, CommentSource, MetadataSource, VideoRecord};
use crate::label::Label;
use crate::metrics::ensure_pipeline_metrics_described;
use crate::store::{is_stale, PredictionStore, StoredPrediction};

#[derive(Clone)]
pub struct AppState {
    assembler: Arc<FeatureAssembler>,
    classifier: Arc<dyn ReceptionClassifier>,
    metadata: Arc<dyn MetadataSource>,
    comments: Arc<dyn CommentSource>,
    store: Arc<dyn PredictionStore>,
    refetch_window_secs: u64,
}

impl AppState {
    pub fn new(
        classifier: Arc<dyn ReceptionClassifier>,
        metadata: Arc<dyn MetadataSource>,
        comments: Arc<dyn CommentSource>,
        store: Arc<dyn PredictionStore>,
        refetch_window_secs: u64,
    ) -> Self {
        Self {
            assembler: Arc::new(FeatureAssembler::new()),
            classifier,
            metadata,
            comments,
            store,
            refetch_window_secs,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/predict", post(predict))
        .route("/features", post(features))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct PredictReq {
    /// Watch URL, short link, or a bare 11-character id.
    video: String,
}

#[derive(serde::Serialize)]
struct PredictResp {
    video_id: String,
    title: Option<String>,
    prediction: Label,
    prediction_value: i8,
    cached: bool,
    features: FeatureVector,
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn bad_request(msg: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error: msg.into() }))
}

fn bad_gateway(msg: impl Into<String>) -> ApiError {
    (StatusCode::BAD_GATEWAY, Json(ErrorBody { error: msg.into() }))
}

async fn predict(
    State(state): State<AppState>,
    Json(body): Json<PredictReq>,
) -> Result<Json<PredictResp>, ApiError> {
    ensure_pipeline_metrics_described();
    counter!("predict_requests_total").increment(1);

    let Some(video_id) = extract_video_id(&body.video) else {
        return Err(bad_request(format!(
            "could not extract a video id from {:?}",
            body.video
        )));
    };

    // Serve from the store while the record is inside the refetch window.
    let stored = match state.store.get(&video_id).await {
        Ok(stored) => stored,
        Err(e) => {
            warn!(error = ?e, video_id, "store lookup failed, refetching");
            None
        }
    };
    if let Some(record) = &stored {
        if !is_stale(record.fetched_at, Utc::now(), state.refetch_window_secs) {
            counter!("predict_cache_hits_total").increment(1);
            return Ok(Json(PredictResp {
                video_id,
                title: record.video.title.clone(),
                prediction: record.label,
                prediction_value: record.label.as_i8(),
                cached: true,
                features: record.features.clone(),
            }));
        }
    }

    let video = match state.metadata.fetch_video(&video_id).await {
        Ok(video) => video,
        Err(e) => {
            counter!("predict_fetch_errors_total").increment(1);
            warn!(error = ?e, video_id, source = state.metadata.name(), "metadata fetch failed");
            return Err(bad_gateway(format!("metadata fetch failed: {e:#}")));
        }
    };

    // A failed comment fetch degrades the prediction but does not block it;
    // comments previously stored for this video fill the gap.
    let fetched = match state.comments.fetch_comments(&video_id).await {
        Ok(fetched) => fetched,
        Err(e) => {
            warn!(error = ?e, video_id, source = state.comments.name(), "comment fetch failed");
            None
        }
    };
    let comments = match fetched {
        Some(fresh) => Some(fresh),
        None => stored.and_then(|record| record.comments),
    };

    let features = state
        .assembler
        .assemble(&video, comments.as_deref().unwrap_or(&[]));
    let label = state.classifier.predict(&features);

    let record = StoredPrediction {
        video_id: video_id.clone(),
        video: video.clone(),
        comments,
        features: features.clone(),
        label,
        fetched_at: Utc::now(),
    };
    if let Err(e) = state.store.put(record).await {
        warn!(error = ?e, video_id, "storing prediction failed");
    }

    Ok(Json(PredictResp {
        video_id,
        title: video.title,
        prediction: label,
        prediction_value: label.as_i8(),
        cached: false,
        features,
    }))
}

#[derive(Deserialize)]
struct FeaturesReq {
    video: VideoRecord,
    #[serde(default)]
    comments: Option<Vec<CommentRecord>>,
}

/// Assemble a vector from caller-supplied records, no fetching involved.
/// Lets the training side verify serve-time parity against checkpoints.
async fn features(
    State(state): State<AppState>,
    Json(body): Json<FeaturesReq>,
) -> Json<FeatureVector> {
    ensure_pipeline_metrics_described();
    let features = state
        .assembler
        .assemble(&body.video, body.comments.as_deref().unwrap_or(&[]));
    Json(features)
}
