//! Reception Prediction Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the classifier, the live YouTube
//! sources, the prediction store, and the /metrics exporter.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use yt_reception_predictor::api::AppState;
use yt_reception_predictor::classifier::BaselineClassifier;
use yt_reception_predictor::config::PipelineConfig;
use yt_reception_predictor::create_router;
use yt_reception_predictor::ingest::providers::youtube_api::YouTubeApiSource;
use yt_reception_predictor::ingest::types::{CommentSource, MetadataSource};
use yt_reception_predictor::metrics::Metrics;
use yt_reception_predictor::store::MemoryStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = PipelineConfig::load().context("loading pipeline config")?;

    let metrics = Metrics::init(config.refetch_window_secs);

    // A configured model path must load; an unconfigured one means the
    // threshold fallback is the deliberate choice.
    let classifier = match &config.model_path {
        Some(path) => {
            let clf = BaselineClassifier::load(path)
                .with_context(|| format!("loading model from {}", path.display()))?;
            info!(model = %path.display(), "loaded trained classifier");
            clf
        }
        None => {
            warn!("no model_path configured, serving with sentiment thresholds");
            BaselineClassifier::new()
        }
    };

    let Some(api_key) = config.api_key() else {
        bail!("no YouTube API key configured (set YOUTUBE_API_KEY or youtube_api_key)");
    };
    let source = Arc::new(YouTubeApiSource::new(api_key));

    let state = AppState::new(
        Arc::new(classifier),
        source.clone() as Arc<dyn MetadataSource>,
        source as Arc<dyn CommentSource>,
        Arc::new(MemoryStore::with_capacity(config.store_capacity)),
        config.refetch_window_secs,
    );
    let router = create_router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "reception predictor listening");
    axum::serve(listener, router)
        .await
        .context("serving http")?;
    Ok(())
}
