// src/ingest/types.rs
//
// Record shapes crossing the ingestion boundary, plus the async traits the
// external collaborators (metadata API client, comment scraper) live behind.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::category::CategoryField;
use crate::ingest::{decode_entities, flag_from_any, parse_runtime_minutes};

/// One video's metadata, from the archive exports or the live API.
///
/// Only `id` is mandatory; every other field has a documented default so a
/// sparse archive row still assembles into a full feature vector. A record
/// with no id is a schema violation and fails deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    /// Archive upload stamp, kept verbatim (`YYYYMMDD`).
    #[serde(default)]
    pub upload_date: Option<String>,
    /// When this metadata was fetched; drives the serve-time refetch window.
    #[serde(default)]
    pub fetch_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryField>,
    /// Runtime code (`PT1H2M3S`) or pre-converted fractional minutes.
    #[serde(default)]
    pub duration: DurationField,
    #[serde(default)]
    pub age_limit: i64,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub dislike_count: i64,
    #[serde(default, deserialize_with = "flag_from_any")]
    pub is_comments_enabled: bool,
    #[serde(default, deserialize_with = "flag_from_any")]
    pub is_live_content: bool,
}

impl VideoRecord {
    /// Minimal record for building inputs in tests and fixtures.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            uploader: None,
            upload_date: None,
            fetch_date: None,
            description: None,
            category: None,
            duration: DurationField::default(),
            age_limit: 0,
            view_count: 0,
            like_count: 0,
            dislike_count: 0,
            is_comments_enabled: false,
            is_live_content: false,
        }
    }

    /// Duration in fractional minutes, 0.0 when the runtime code is garbage.
    pub fn duration_minutes(&self) -> f64 {
        self.duration.as_minutes()
    }
}

/// Duration as delivered by a source: the API ships ISO-8601-ish runtime
/// codes, archive exports ship minutes already converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationField {
    Minutes(f64),
    Runtime(String),
}

impl Default for DurationField {
    fn default() -> Self {
        DurationField::Minutes(0.0)
    }
}

impl DurationField {
    pub fn as_minutes(&self) -> f64 {
        match self {
            DurationField::Minutes(m) => *m,
            DurationField::Runtime(code) => match parse_runtime_minutes(code) {
                Some(m) => m,
                None => {
                    metrics::counter!("ingest_unparsed_duration_total").increment(1);
                    tracing::debug!(code, "unparseable runtime code, defaulting to 0");
                    0.0
                }
            },
        }
    }
}

/// One scraped comment. Field aliases match the scraper's JSON keys
/// (`cid`, `time`); entity decoding happens right here at the boundary so
/// the text cleaner never sees `&amp;`-style noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    #[serde(default)]
    pub video_id: String,
    #[serde(default, alias = "cid")]
    pub comment_id: String,
    #[serde(default, deserialize_with = "decode_entities")]
    pub text: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    /// Vote tally as scraped — free text like `"324"` or `"1.2K"`. Parsed
    /// during aggregation; non-numeric tallies are excluded from the mean.
    #[serde(default, alias = "vote_count")]
    pub votes: String,
    #[serde(default, deserialize_with = "flag_from_any")]
    pub heart: bool,
    /// Human-readable publication label from the scraper ("2 years ago").
    #[serde(default, alias = "time")]
    pub published: Option<String>,
}

impl CommentRecord {
    /// Comment with just the fields the feature pipeline reads.
    pub fn of_text(video_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            comment_id: String::new(),
            text: text.into(),
            author: None,
            channel: None,
            votes: String::new(),
            heart: false,
            published: None,
        }
    }

    pub fn with_votes(mut self, votes: impl Into<String>) -> Self {
        self.votes = votes.into();
        self
    }
}

/// Metadata client boundary (live API, archive reader, test stub).
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch_video(&self, video_id: &str) -> Result<VideoRecord>;
    fn name(&self) -> &'static str;
}

/// Comment scraper boundary. `Ok(None)` means the fetch could not run at all
/// (comments disabled, scraper down); `Ok(Some(vec![]))` means the fetch ran
/// and found nothing. Feature output is identical for both, storage policy
/// is not: an absent fetch never overwrites previously stored comments.
#[async_trait::async_trait]
pub trait CommentSource: Send + Sync {
    async fn fetch_comments(&self, video_id: &str) -> Result<Option<Vec<CommentRecord>>>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_record_requires_id() {
        let err = serde_json::from_str::<VideoRecord>(r#"{"view_count": 5}"#);
        assert!(err.is_err(), "a record without id must not deserialize");
    }

    #[test]
    fn sparse_video_record_gets_defaults() {
        let v: VideoRecord = serde_json::from_str(r#"{"id": "dQw4w9WgXcQ"}"#).unwrap();
        assert_eq!(v.view_count, 0);
        assert_eq!(v.like_count, 0);
        assert_eq!(v.dislike_count, 0);
        assert!(!v.is_comments_enabled);
        assert!(!v.is_live_content);
        assert_eq!(v.duration_minutes(), 0.0);
        assert!(v.description.is_none());
    }

    #[test]
    fn archive_style_flags_deserialize() {
        let v: VideoRecord = serde_json::from_str(
            r#"{"id": "x", "is_comments_enabled": "t", "is_live_content": "f"}"#,
        )
        .unwrap();
        assert!(v.is_comments_enabled);
        assert!(!v.is_live_content);

        let v: VideoRecord = serde_json::from_str(
            r#"{"id": "x", "is_comments_enabled": true, "is_live_content": 1}"#,
        )
        .unwrap();
        assert!(v.is_comments_enabled);
        assert!(v.is_live_content);
    }

    #[test]
    fn duration_accepts_minutes_and_runtime_codes() {
        let v: VideoRecord =
            serde_json::from_str(r#"{"id": "x", "duration": 4.5}"#).unwrap();
        assert!((v.duration_minutes() - 4.5).abs() < 1e-9);

        let v: VideoRecord =
            serde_json::from_str(r#"{"id": "x", "duration": "PT1H30M"}"#).unwrap();
        assert!((v.duration_minutes() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn comment_record_accepts_scraper_keys() {
        let c: CommentRecord = serde_json::from_str(
            r#"{"cid": "abc.123", "text": "love it", "votes": "1.2K", "time": "2 years ago"}"#,
        )
        .unwrap();
        assert_eq!(c.comment_id, "abc.123");
        assert_eq!(c.votes, "1.2K");
        assert_eq!(c.published.as_deref(), Some("2 years ago"));
    }

    #[test]
    fn comment_text_is_entity_decoded_at_the_boundary() {
        let c: CommentRecord =
            serde_json::from_str(r#"{"text": "tom &amp; jerry &quot;rule&quot;"}"#).unwrap();
        assert_eq!(c.text, "tom & jerry \"rule\"");
    }
}
