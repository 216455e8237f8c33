/*
 * json_v1 wire format adapter: `{ contents: [...], pagination: { total, page, per_page } }`.
 * Pagination, rate limiting, and retry are delegated to the shared machinery in
 * services::providers — this file only knows how to talk HTTP+JSON to one upstream shape.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::models::content::{ContentKind, NormalizedRecord, NormalizedStats};
use crate::services::providers::{retry_linear, ProviderAdapter, TokenBucket, MAX_RECORDS_PER_SYNC};
use crate::utils::error::{AppError, Result};

#[derive(Debug, Deserialize)]
struct JsonFeed {
    contents: Vec<JsonContentItem>,
    pagination: JsonPagination,
}

#[derive(Debug, Deserialize)]
struct JsonPagination {
    total: i64,
}

#[derive(Debug, Deserialize, Serialize)]
struct JsonContentItem {
    id: String,
    title: String,
    #[serde(rename = "type")]
    kind: String,
    metrics: JsonMetrics,
    published_at: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct JsonMetrics {
    views: i64,
    likes: i64,
    reading_time: i64,
    reactions: i64,
    #[serde(default)]
    duration: Option<i64>,
}

fn normalize(item: &JsonContentItem) -> Option<NormalizedRecord> {
    if item.id.trim().is_empty() {
        return None;
    }
    let kind = ContentKind::parse(&item.kind)?;
    let published_at = DateTime::parse_from_rfc3339(&item.published_at).ok()?.with_timezone(&Utc);
    let raw_payload = serde_json::to_string(item).ok()?;

    Some(NormalizedRecord {
        external_id: item.id.clone(),
        title: item.title.clone(),
        description: String::new(),
        kind,
        published_at,
        stats: NormalizedStats {
            views: item.metrics.views,
            likes: item.metrics.likes,
            reading_time_minutes: item.metrics.reading_time,
            reactions: item.metrics.reactions,
        },
        tags: item.tags.clone(),
        raw_payload,
    })
}

pub struct JsonV1Adapter {
    client: reqwest::Client,
    feed_url: String,
    rate_limiter: Arc<TokenBucket>,
}

impl JsonV1Adapter {
    pub fn new(client: reqwest::Client, feed_url: String, rate_limiter: Arc<TokenBucket>) -> Self {
        Self {
            client,
            feed_url,
            rate_limiter,
        }
    }

    async fn fetch_page(&self, page: u32) -> Result<String> {
        let client = self.client.clone();
        let url = self.feed_url.clone();
        retry_linear(3, || {
            let client = client.clone();
            let url = url.clone();
            async move {
                let response = client
                    .get(&url)
                    .query(&[("page", page.to_string())])
                    .send()
                    .await
                    .map_err(AppError::from)?;

                if !response.status().is_success() {
                    return Err(AppError::ExternalApiError(format!(
                        "json_v1 feed returned non-2xx status {} for page {}",
                        response.status(),
                        page
                    )));
                }

                response.text().await.map_err(AppError::from)
            }
        })
        .await
    }
}

#[async_trait]
impl ProviderAdapter for JsonV1Adapter {
    async fn fetch_all(&self, cancel: &CancellationToken) -> Result<Vec<NormalizedRecord>> {
        let mut records = Vec::new();
        let mut raw_seen: i64 = 0;
        let mut page: u32 = 1;

        loop {
            if cancel.is_cancelled() {
                return Err(AppError::ServiceUnavailableError("json_v1 fetch cancelled".to_string()));
            }
            if raw_seen as usize >= MAX_RECORDS_PER_SYNC {
                break;
            }

            tokio::select! {
                _ = self.rate_limiter.acquire() => {}
                _ = cancel.cancelled() => {
                    return Err(AppError::ServiceUnavailableError("json_v1 fetch cancelled while rate limited".to_string()));
                }
            }

            let body = self.fetch_page(page).await?;
            let feed: JsonFeed = serde_json::from_str(&body).map_err(AppError::from)?;

            if feed.contents.is_empty() {
                break;
            }

            for item in &feed.contents {
                raw_seen += 1;
                match normalize(item) {
                    Some(record) => records.push(record),
                    None => debug!("json_v1: dropped unrecognized record {}", item.id),
                }
                if records.len() >= MAX_RECORDS_PER_SYNC {
                    break;
                }
            }

            if raw_seen >= feed.pagination.total || records.len() >= MAX_RECORDS_PER_SYNC {
                break;
            }

            page += 1;
        }

        if records.len() >= MAX_RECORDS_PER_SYNC {
            warn!("json_v1 adapter hit the {}-record safety cap", MAX_RECORDS_PER_SYNC);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_unrecognized_kind() {
        let item = JsonContentItem {
            id: "1".to_string(),
            title: "t".to_string(),
            kind: "podcast".to_string(),
            metrics: JsonMetrics { views: 1, likes: 1, reading_time: 1, reactions: 1, duration: None },
            published_at: "2026-01-01T00:00:00Z".to_string(),
            tags: vec![],
        };
        assert!(normalize(&item).is_none());
    }

    #[test]
    fn normalize_drops_unparseable_date() {
        let item = JsonContentItem {
            id: "1".to_string(),
            title: "t".to_string(),
            kind: "video".to_string(),
            metrics: JsonMetrics { views: 1, likes: 1, reading_time: 1, reactions: 1, duration: None },
            published_at: "not-a-date".to_string(),
            tags: vec![],
        };
        assert!(normalize(&item).is_none());
    }

    #[test]
    fn normalize_drops_missing_external_id() {
        let item = JsonContentItem {
            id: "  ".to_string(),
            title: "t".to_string(),
            kind: "video".to_string(),
            metrics: JsonMetrics { views: 1, likes: 1, reading_time: 1, reactions: 1, duration: None },
            published_at: "2026-01-01T00:00:00Z".to_string(),
            tags: vec![],
        };
        assert!(normalize(&item).is_none());
    }

    #[test]
    fn normalize_accepts_valid_record() {
        let item = JsonContentItem {
            id: "abc".to_string(),
            title: "A title".to_string(),
            kind: "article".to_string(),
            metrics: JsonMetrics { views: 0, likes: 0, reading_time: 5, reactions: 3, duration: None },
            published_at: "2026-01-01T00:00:00Z".to_string(),
            tags: vec!["rust".to_string()],
        };
        let record = normalize(&item).expect("valid record");
        assert_eq!(record.external_id, "abc");
        assert_eq!(record.kind, ContentKind::Article);
        assert_eq!(record.stats.reading_time_minutes, 5);
    }
}
