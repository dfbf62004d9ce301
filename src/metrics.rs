use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and expose a static gauge for the
    /// prediction refetch window.
    pub fn init(refetch_window_secs: u64) -> Self {
        // Use default buckets to avoid API differences across crate versions.
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        ensure_pipeline_metrics_described();
        gauge!("predict_refetch_window_seconds").set(refetch_window_secs as f64);

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_pipeline_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "features_assembled_total",
            "Feature vectors assembled from video metadata."
        );
        describe_counter!(
            "features_no_comments_total",
            "Assemblies that saw an empty or absent comment section."
        );
        describe_counter!(
            "features_unparsed_votes_total",
            "Comment vote fields excluded from the vote mean."
        );
        describe_counter!(
            "features_unknown_category_total",
            "Categories that fell back to the unknown code."
        );
        describe_histogram!("features_assemble_ms", "Feature assembly time in milliseconds.");
        describe_counter!(
            "ingest_unparsed_duration_total",
            "Runtime codes that could not be parsed into minutes."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Metadata or comment fetches that failed at the HTTP layer."
        );
        describe_counter!("dataset_rows_total", "Rows kept in built training frames.");
        describe_counter!(
            "dataset_dropped_degenerate_total",
            "Rows dropped for zero like and dislike counts."
        );
        describe_counter!(
            "dataset_dropped_non_english_total",
            "Rows dropped by the English-only filter."
        );
        describe_counter!("predict_requests_total", "Prediction requests received.");
        describe_counter!(
            "predict_cache_hits_total",
            "Predictions served from the store without refetching."
        );
        describe_counter!(
            "predict_fetch_errors_total",
            "Prediction requests that failed at the metadata fetch."
        );
        describe_gauge!(
            "predict_refetch_window_seconds",
            "Seconds before a stored prediction is refetched."
        );
    });
}
