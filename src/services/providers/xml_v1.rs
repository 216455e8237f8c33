/*
 * xml_v1 wire format adapter: `<feed><items><item>...</item></items><meta>...</meta></feed>`.
 * `publication_date` additionally accepts a bare `YYYY-MM-DD` date, unlike json_v1 which is
 * RFC-3339 only. Pagination, rate limiting, and retry are the same shared machinery as json_v1.
 */

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::models::content::{ContentKind, NormalizedRecord, NormalizedStats};
use crate::services::providers::{retry_linear, ProviderAdapter, TokenBucket, MAX_RECORDS_PER_SYNC};
use crate::utils::error::{AppError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
struct XmlFeed {
    items: XmlItems,
    meta: XmlMeta,
}

#[derive(Debug, Deserialize)]
struct XmlItems {
    #[serde(rename = "item", default)]
    item: Vec<XmlItem>,
}

#[derive(Debug, Deserialize, Serialize)]
struct XmlItem {
    id: String,
    headline: String,
    #[serde(rename = "type")]
    kind: String,
    stats: XmlStats,
    publication_date: String,
    categories: XmlCategories,
}

#[derive(Debug, Deserialize, Serialize)]
struct XmlStats {
    views: i64,
    likes: i64,
    reading_time: i64,
    reactions: i64,
}

#[derive(Debug, Deserialize, Serialize)]
struct XmlCategories {
    #[serde(rename = "category", default)]
    category: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct XmlMeta {
    total_count: i64,
}

/// `publication_date` accepts RFC-3339 or a bare `YYYY-MM-DD`, per the xml_v1 contract.
fn parse_publication_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let naive = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

fn normalize(item: &XmlItem) -> Option<NormalizedRecord> {
    if item.id.trim().is_empty() {
        return None;
    }
    let kind = ContentKind::parse(&item.kind)?;
    let published_at = parse_publication_date(&item.publication_date)?;
    let raw_payload = serde_json::to_string(item).ok()?;

    Some(NormalizedRecord {
        external_id: item.id.clone(),
        title: item.headline.clone(),
        description: String::new(),
        kind,
        published_at,
        stats: NormalizedStats {
            views: item.stats.views,
            likes: item.stats.likes,
            reading_time_minutes: item.stats.reading_time,
            reactions: item.stats.reactions,
        },
        tags: item.categories.category.clone(),
        raw_payload,
    })
}

pub struct XmlV1Adapter {
    client: reqwest::Client,
    feed_url: String,
    rate_limiter: Arc<TokenBucket>,
}

impl XmlV1Adapter {
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
                        "xml_v1 feed returned non-2xx status {} for page {}",
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
impl ProviderAdapter for XmlV1Adapter {
    async fn fetch_all(&self, cancel: &CancellationToken) -> Result<Vec<NormalizedRecord>> {
        let mut records = Vec::new();
        let mut raw_seen: i64 = 0;
        let mut page: u32 = 1;

        loop {
            if cancel.is_cancelled() {
                return Err(AppError::ServiceUnavailableError("xml_v1 fetch cancelled".to_string()));
            }
            if raw_seen as usize >= MAX_RECORDS_PER_SYNC {
                break;
            }

            tokio::select! {
                _ = self.rate_limiter.acquire() => {}
                _ = cancel.cancelled() => {
                    return Err(AppError::ServiceUnavailableError("xml_v1 fetch cancelled while rate limited".to_string()));
                }
            }

            let body = self.fetch_page(page).await?;
            let feed: XmlFeed = quick_xml::de::from_str(&body).map_err(AppError::from)?;

            if feed.items.item.is_empty() {
                break;
            }

            for item in &feed.items.item {
                raw_seen += 1;
                match normalize(item) {
                    Some(record) => records.push(record),
                    None => debug!("xml_v1: dropped unrecognized record {}", item.id),
                }
                if records.len() >= MAX_RECORDS_PER_SYNC {
                    break;
                }
            }

            if raw_seen >= feed.meta.total_count || records.len() >= MAX_RECORDS_PER_SYNC {
                break;
            }

            page += 1;
        }

        if records.len() >= MAX_RECORDS_PER_SYNC {
            warn!("xml_v1 adapter hit the {}-record safety cap", MAX_RECORDS_PER_SYNC);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, kind: &str, date: &str) -> XmlItem {
        XmlItem {
            id: id.to_string(),
            headline: "headline".to_string(),
            kind: kind.to_string(),
            stats: XmlStats { views: 10, likes: 2, reading_time: 3, reactions: 1 },
            publication_date: date.to_string(),
            categories: XmlCategories { category: vec!["news".to_string()] },
        }
    }

    #[test]
    fn normalize_accepts_rfc3339_date() {
        let record = normalize(&item("1", "video", "2026-01-01T00:00:00Z")).expect("valid");
        assert_eq!(record.kind, ContentKind::Video);
    }

    #[test]
    fn normalize_accepts_bare_date() {
        let record = normalize(&item("1", "article", "2026-01-01")).expect("valid");
        assert_eq!(record.kind, ContentKind::Article);
    }

    #[test]
    fn normalize_drops_unparseable_date() {
        assert!(normalize(&item("1", "video", "not-a-date")).is_none());
    }

    #[test]
    fn normalize_drops_unrecognized_kind() {
        assert!(normalize(&item("1", "podcast", "2026-01-01")).is_none());
    }

    #[test]
    fn normalize_drops_missing_id() {
        assert!(normalize(&item("  ", "video", "2026-01-01")).is_none());
    }
}
