//! YouTube Data API v3 client implementing both source traits: `videos` for
//! metadata, `commentThreads` for the comment section. Wire DTOs stay private;
//! the rest of the crate only ever sees [`VideoRecord`] and [`CommentRecord`].

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use serde::Deserialize;
use tracing::warn;

use crate::features::category::CategoryField;
use crate::ingest::types::{
    CommentRecord, CommentSource, DurationField, MetadataSource, VideoRecord,
};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
/// Single-page fetch; reception features stabilize well before 100 comments.
const COMMENT_PAGE_SIZE: &str = "100";

pub struct YouTubeApiSource {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeApiSource {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point at a non-default endpoint (proxies, test doubles).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: Option<VideoSnippet>,
    content_details: Option<ContentDetails>,
    statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: Option<String>,
    description: Option<String>,
    channel_title: Option<String>,
    published_at: Option<String>,
    category_id: Option<String>,
    live_broadcast_content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    duration: Option<String>,
    /// Any rating entry at all (`ytRating` etc.) marks the video restricted.
    #[serde(default)]
    content_rating: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    dislike_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThreadListResponse {
    #[serde(default)]
    items: Vec<ThreadItem>,
}

#[derive(Debug, Deserialize)]
struct ThreadItem {
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    id: String,
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_display: Option<String>,
    author_display_name: Option<String>,
    author_channel_url: Option<String>,
    like_count: Option<i64>,
    published_at: Option<String>,
}

/// The API ships counts as decimal strings; absent or malformed reads as 0.
fn numeric_count(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0)
}

/// `2012-10-01T15:27:35Z` → `20121001`, matching the archive stamp format.
fn compact_date(published_at: &str) -> Option<String> {
    chrono::DateTime::parse_from_rfc3339(published_at)
        .ok()
        .map(|dt| dt.format("%Y%m%d").to_string())
}

fn video_from_item(item: VideoItem) -> VideoRecord {
    let mut record = VideoRecord::with_id(item.id);
    record.fetch_date = Some(Utc::now());

    if let Some(snippet) = item.snippet {
        record.title = snippet.title;
        record.uploader = snippet.channel_title;
        record.description = snippet.description;
        record.upload_date = snippet.published_at.as_deref().and_then(compact_date);
        record.category = snippet.category_id.map(|raw| match raw.parse::<i64>() {
            Ok(code) => CategoryField::Code(code),
            Err(_) => CategoryField::Label(raw),
        });
        record.is_live_content = snippet
            .live_broadcast_content
            .as_deref()
            .is_some_and(|state| state != "none");
    }
    if let Some(details) = item.content_details {
        if let Some(code) = details.duration {
            record.duration = DurationField::Runtime(code);
        }
        if !details.content_rating.is_empty() {
            record.age_limit = 18;
        }
    }
    if let Some(stats) = item.statistics {
        record.view_count = numeric_count(stats.view_count.as_deref());
        record.like_count = numeric_count(stats.like_count.as_deref());
        record.dislike_count = numeric_count(stats.dislike_count.as_deref());
        // The API omits commentCount entirely when comments are disabled.
        record.is_comments_enabled = stats.comment_count.is_some();
    }
    record
}

fn comment_from_thread(video_id: &str, item: ThreadItem) -> CommentRecord {
    let top = item.snippet.top_level_comment;
    let text = top.snippet.text_display.unwrap_or_default();
    let mut record = CommentRecord::of_text(
        video_id,
        html_escape::decode_html_entities(&text).into_owned(),
    );
    record.comment_id = top.id;
    record.author = top.snippet.author_display_name;
    record.channel = top.snippet.author_channel_url;
    record.votes = top.snippet.like_count.unwrap_or(0).to_string();
    record.published = top.snippet.published_at;
    record
}

#[async_trait]
impl MetadataSource for YouTubeApiSource {
    async fn fetch_video(&self, video_id: &str) -> Result<VideoRecord> {
        let url = format!("{}/videos", self.base_url);
        let resp = match self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet,contentDetails,statistics"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = ?e, source = "youtube-data-api", "metadata http error");
                counter!("ingest_provider_errors_total").increment(1);
                return Err(e).context("youtube videos get()");
            }
        };
        if !resp.status().is_success() {
            counter!("ingest_provider_errors_total").increment(1);
            bail!("youtube videos endpoint returned {}", resp.status());
        }

        let body: VideoListResponse = resp
            .json()
            .await
            .context("decoding youtube videos response")?;
        let Some(item) = body.items.into_iter().next() else {
            bail!("video {video_id} not found or private");
        };
        Ok(video_from_item(item))
    }

    fn name(&self) -> &'static str {
        "youtube-data-api"
    }
}

#[async_trait]
impl CommentSource for YouTubeApiSource {
    async fn fetch_comments(&self, video_id: &str) -> Result<Option<Vec<CommentRecord>>> {
        let url = format!("{}/commentThreads", self.base_url);
        let resp = match self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("videoId", video_id),
                ("maxResults", COMMENT_PAGE_SIZE),
                ("textFormat", "plainText"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = ?e, source = "youtube-data-api", "comments http error");
                counter!("ingest_provider_errors_total").increment(1);
                return Err(e).context("youtube commentThreads get()");
            }
        };

        // Disabled comment sections answer 403. That is an absent section,
        // not a failed fetch.
        if resp.status() == reqwest::StatusCode::FORBIDDEN {
            warn!(video_id, "comment threads forbidden, treating as disabled");
            return Ok(None);
        }
        if !resp.status().is_success() {
            counter!("ingest_provider_errors_total").increment(1);
            bail!("youtube commentThreads endpoint returned {}", resp.status());
        }

        let body: ThreadListResponse = resp
            .json()
            .await
            .context("decoding youtube commentThreads response")?;
        let comments = body
            .items
            .into_iter()
            .map(|item| comment_from_thread(video_id, item))
            .collect();
        Ok(Some(comments))
    }

    fn name(&self) -> &'static str {
        "youtube-data-api"
    }
}
