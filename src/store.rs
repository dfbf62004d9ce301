//! # Prediction Store
//!
//! Serving keeps the last prediction per video so repeat lookups inside the
//! refetch window are answered without touching the metadata API or the
//! scraper. The store itself is a collaborator behind a trait; the in-memory
//! implementation here backs the default binary and the tests, a database
//! lives behind the same trait elsewhere.
//!
//! Comment replacement is wholesale: a successful fetch replaces whatever was
//! stored, an absent fetch (`None`) keeps the previous comments untouched.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::features::FeatureVector;
use crate::ingest::types::{CommentRecord, VideoRecord};
use crate::label::Label;

/// Everything the serving path persists about one scored video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPrediction {
    pub video_id: String,
    pub video: VideoRecord,
    /// `None` when the comment fetch never ran for this record.
    pub comments: Option<Vec<CommentRecord>>,
    pub features: FeatureVector,
    pub label: Label,
    pub fetched_at: DateTime<Utc>,
}

/// True when a stored record is old enough to refetch.
pub fn is_stale(fetched_at: DateTime<Utc>, now: DateTime<Utc>, ttl_secs: u64) -> bool {
    now.signed_duration_since(fetched_at).num_seconds() >= ttl_secs as i64
}

#[async_trait::async_trait]
pub trait PredictionStore: Send + Sync {
    async fn get(&self, video_id: &str) -> Result<Option<StoredPrediction>>;
    /// Insert or replace the record for `record.video_id`.
    async fn put(&self, record: StoredPrediction) -> Result<()>;
}

/// Bounded in-memory store keyed by video id. When full, the oldest record
/// by fetch time is evicted.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, StoredPrediction>>,
    cap: usize,
}

impl MemoryStore {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 100_000);
        Self {
            inner: Mutex::new(HashMap::with_capacity(cap.min(1024))),
            cap,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl PredictionStore for MemoryStore {
    async fn get(&self, video_id: &str) -> Result<Option<StoredPrediction>> {
        let map = self.inner.lock().expect("store mutex poisoned");
        Ok(map.get(video_id).cloned())
    }

    async fn put(&self, record: StoredPrediction) -> Result<()> {
        let mut map = self.inner.lock().expect("store mutex poisoned");
        let replacing = map.contains_key(&record.video_id);
        if !replacing && map.len() >= self.cap {
            let oldest = map
                .values()
                .min_by_key(|r| r.fetched_at)
                .map(|r| r.video_id.clone());
            if let Some(evict) = oldest {
                map.remove(&evict);
            }
        }
        map.insert(record.video_id.clone(), record);
        Ok(())
    }
}
