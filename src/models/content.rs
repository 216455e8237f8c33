/*
 * Core content data model: the row shape stored by the Content Store and scored by the Scoring Engine.
 * I'm mirroring the teacher's FromRow conventions from models/github.rs for consistent row mapping.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Video,
    Article,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Video => "video",
            ContentKind::Article => "article",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "video" => Some(ContentKind::Video),
            "article" => Some(ContentKind::Article),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A piece of federated content, keyed on `(provider_id, external_id)`. `id` is the internal
/// surrogate key; the column is named `content_type` (not `kind`) to match the persistent
/// store layout and the HTTP response field of the same name.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Content {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub external_id: String,
    pub title: String,
    pub description: String,
    #[sqlx(rename = "content_type")]
    pub kind: ContentKind,
    pub published_at: DateTime<Utc>,
    pub raw_payload: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// At most one row per content. Absence means the Scoring Engine has nothing to score.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Statistics {
    pub content_id: Uuid,
    pub views: i64,
    pub likes: i64,
    pub reading_time_minutes: i64,
    pub reactions: i64,
    pub updated_at: DateTime<Utc>,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            content_id: Uuid::nil(),
            views: 0,
            likes: 0,
            reading_time_minutes: 0,
            reactions: 0,
            updated_at: Utc::now(),
        }
    }
}

/// At most one row per content. `final` is the sole ranking input for popularity sort.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::FromRow)]
pub struct Score {
    pub content_id: Uuid,
    pub base: f64,
    pub type_weight: f64,
    pub recency: f64,
    pub engagement: f64,
    #[sqlx(rename = "final")]
    pub r#final: f64,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentTag {
    pub content_id: Uuid,
    pub tag_id: Uuid,
}

/// Statistics fields as reported by an upstream feed, before they're attached to a content id.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NormalizedStats {
    pub views: i64,
    pub likes: i64,
    pub reading_time_minutes: i64,
    pub reactions: i64,
}

/// The shape a Provider Adapter hands back after normalizing one upstream record, before
/// it is persisted by the Content Store. `raw_payload` is the re-serialized single source
/// item, retained verbatim for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub kind: ContentKind,
    pub published_at: DateTime<Utc>,
    pub stats: NormalizedStats,
    pub tags: Vec<String>,
    pub raw_payload: String,
}

impl NormalizedRecord {
    /// A record is dropped by the adapter when it lacks the one field the store requires
    /// to address it. Unrecognized `kind` and unparseable `published_at` are dropped earlier,
    /// during decoding, since there's no valid value to carry into this struct at all.
    pub fn is_valid(&self) -> bool {
        !self.external_id.trim().is_empty()
    }
}

/// A content row joined with its current statistics, score, and tag names — the shape
/// returned from `ContentStore::find` and embedded in search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentWithScore {
    pub content: Content,
    pub stats: Option<Statistics>,
    pub score: Option<Score>,
    pub tags: Vec<String>,
}
