/*
 * Search request/response envelope types for the GET /api/v1/search surface.
 * I'm keeping validation (clamping) on the params type itself so every caller gets the same bounds.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::content::ContentKind;

pub const MAX_PAGE_SIZE: i64 = 50;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MIN_PAGE_SIZE: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Popularity,
    Relevance,
}

impl SortMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "popularity" => Some(SortMode::Popularity),
            "relevance" => Some(SortMode::Relevance),
            _ => None,
        }
    }
}

/// Raw query-string params as deserialized from the request, before validation/defaulting.
/// `type` and `sort` are left as free strings here so the Search Engine can reject unknown
/// values with a 400 rather than have serde fail the whole request with an opaque error.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl SearchParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
            .filter(|&n| n != 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.page_size()
    }

    pub fn normalized_query(&self) -> String {
        self.query.trim().to_string()
    }
}

/// Validated, defaulted search parameters the Content Store executes against.
#[derive(Debug, Clone)]
pub struct ValidatedSearchParams {
    pub query: String,
    pub kind: Option<ContentKind>,
    pub sort: SortMode,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64, total_items: i64) -> Self {
        let total_pages = if total_items == 0 {
            0
        } else {
            ((total_items as f64) / (page_size as f64)).ceil() as i64
        };
        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultStats {
    pub views: i64,
    pub likes: i64,
    pub reading_time_minutes: i64,
    pub reactions: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultScore {
    pub base: f64,
    pub type_weight: f64,
    pub recency: f64,
    pub engagement: f64,
    pub r#final: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub id: String,
    pub provider_id: String,
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub content_type: ContentKind,
    pub published_at: DateTime<Utc>,
    pub stats: Option<SearchResultStats>,
    pub score: Option<SearchResultScore>,
    pub tags: Vec<String>,
    pub relevance_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<SearchResultItem>,
    pub pagination: Pagination,
    pub cached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &str, page: Option<i64>, page_size: Option<i64>) -> SearchParams {
        SearchParams {
            query: query.to_string(),
            kind: None,
            sort: None,
            page,
            page_size,
        }
    }

    #[test]
    fn page_size_clamps_to_spec_bound() {
        let p = params("rust", None, Some(500));
        assert_eq!(p.page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn page_size_zero_falls_back_to_default() {
        let p = params("rust", None, Some(0));
        assert_eq!(p.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn empty_query_is_allowed() {
        let p = params("", None, None);
        assert_eq!(p.normalized_query(), "");
    }

    #[test]
    fn pagination_math() {
        let p = Pagination::new(2, 10, 95);
        assert_eq!(p.total_pages, 10);
    }

    #[test]
    fn sort_mode_parses_known_values_only() {
        assert_eq!(SortMode::parse("popularity"), Some(SortMode::Popularity));
        assert_eq!(SortMode::parse("RELEVANCE"), Some(SortMode::Relevance));
        assert_eq!(SortMode::parse("newest"), None);
    }
}
