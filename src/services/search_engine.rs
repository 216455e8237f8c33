/*
 * Search Engine (C6): validates query params, computes a cache fingerprint, and serves from the
 * Result Cache before falling back to the Content Store's full-text search.
 * I'm following the teacher's routes/github.rs try-cache-then-db shape from get_repositories.
 */

use sha2::{Digest, Sha256};

use crate::models::content::ContentKind;
use crate::models::search::{
    Pagination, SearchParams, SearchResponse, SearchResultItem, SearchResultScore, SearchResultStats,
    SortMode, ValidatedSearchParams,
};
use crate::services::cache_service::CacheService;
use crate::services::content_store::ContentStore;
use crate::utils::error::{AppError, Result};

pub const MIN_CACHE_TTL_SECONDS: u64 = 1;
pub const MAX_CACHE_TTL_SECONDS: u64 = 3600;

pub struct SearchEngine {
    content_store: ContentStore,
    cache: CacheService,
    cache_ttl_seconds: u64,
}

impl SearchEngine {
    pub fn new(content_store: ContentStore, cache: CacheService, cache_ttl_seconds: u64) -> Self {
        Self {
            content_store,
            cache,
            cache_ttl_seconds: cache_ttl_seconds.clamp(MIN_CACHE_TTL_SECONDS, MAX_CACHE_TTL_SECONDS),
        }
    }

    /// Validate and default raw params: clamp page/page_size, default sort to popularity
    /// (rejecting unknown values), reject a `type` outside `{video,article}`. An empty query
    /// is valid — browse mode.
    pub fn validate(params: &SearchParams) -> Result<ValidatedSearchParams> {
        let sort = match params.sort.as_deref() {
            None | Some("") => SortMode::Popularity,
            Some(raw) => SortMode::parse(raw)
                .ok_or_else(|| AppError::bad_request(format!("invalid sort value: {}", raw)))?,
        };

        let kind = match params.kind.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                ContentKind::parse(raw)
                    .ok_or_else(|| AppError::bad_request(format!("invalid type value: {}", raw)))?,
            ),
        };

        Ok(ValidatedSearchParams {
            query: params.normalized_query(),
            kind,
            sort,
            page: params.page(),
            page_size: params.page_size(),
        })
    }

    /// A stable 128-bit-truncated SHA-256 digest over the canonicalized search params, used as
    /// the Result Cache key. Distinct parameter sets yield distinct fingerprints; the same
    /// parameter set after defaulting/clamping always yields the same one.
    pub fn fingerprint(params: &ValidatedSearchParams) -> String {
        let mut hasher = Sha256::new();
        hasher.update(params.query.to_lowercase().as_bytes());
        hasher.update([0u8]);
        hasher.update(params.kind.map(|k| k.as_str()).unwrap_or("").as_bytes());
        hasher.update([0u8]);
        hasher.update(
            (match params.sort {
                SortMode::Popularity => "popularity",
                SortMode::Relevance => "relevance",
            })
            .as_bytes(),
        );
        hasher.update([0u8]);
        hasher.update(params.page.to_le_bytes());
        hasher.update([0u8]);
        hasher.update(params.page_size.to_le_bytes());

        let digest = hasher.finalize();
        let truncated = &digest[..16];
        format!("search:{}", hex_encode(truncated))
    }

    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse> {
        let validated = Self::validate(params)?;
        let key = Self::fingerprint(&validated);

        if let Some(cached) = self.cache.get(&key).await.unwrap_or(None) {
            if let Ok(response) = serde_json::from_slice::<SearchResponse>(&cached) {
                let mut response = response;
                response.cached = true;
                return Ok(response);
            }
        }

        let (hits, total) = self.content_store.search(&validated).await?;

        let items = hits
            .into_iter()
            .map(|hit| {
                let content = hit.content.content;
                SearchResultItem {
                    id: content.id.to_string(),
                    provider_id: content.provider_id.to_string(),
                    external_id: content.external_id,
                    title: content.title,
                    description: content.description,
                    content_type: content.kind,
                    published_at: content.published_at,
                    stats: hit.content.stats.map(|s| SearchResultStats {
                        views: s.views,
                        likes: s.likes,
                        reading_time_minutes: s.reading_time_minutes,
                        reactions: s.reactions,
                    }),
                    score: hit.content.score.map(|s| SearchResultScore {
                        base: s.base,
                        type_weight: s.type_weight,
                        recency: s.recency,
                        engagement: s.engagement,
                        r#final: s.r#final,
                    }),
                    tags: hit.content.tags,
                    relevance_score: hit.relevance,
                }
            })
            .collect();

        let response = SearchResponse {
            items,
            pagination: Pagination::new(validated.page, validated.page_size, total),
            cached: false,
        };

        if let Ok(bytes) = serde_json::to_vec(&response) {
            if let Err(err) = self.cache.set(&key, &bytes, self.cache_ttl_seconds).await {
                tracing::warn!("search result cache write failed (non-fatal): {}", err);
            }
        }

        Ok(response)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &str, kind: Option<&str>, sort: Option<&str>, page: Option<i64>) -> SearchParams {
        SearchParams {
            query: query.to_string(),
            kind: kind.map(|s| s.to_string()),
            sort: sort.map(|s| s.to_string()),
            page,
            page_size: Some(20),
        }
    }

    #[test]
    fn empty_query_validates_as_browse_mode() {
        let validated = SearchEngine::validate(&params("", None, None, None)).unwrap();
        assert_eq!(validated.query, "");
        assert_eq!(validated.sort, SortMode::Popularity);
    }

    #[test]
    fn unknown_sort_is_rejected() {
        let result = SearchEngine::validate(&params("rust", None, Some("newest"), None));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result = SearchEngine::validate(&params("rust", Some("podcast"), None, None));
        assert!(result.is_err());
    }

    #[test]
    fn fingerprint_is_stable_for_identical_params_case_insensitive_query() {
        let a = SearchEngine::validate(&params("Rust", None, None, Some(1))).unwrap();
        let b = SearchEngine::validate(&params("rust", None, None, Some(1))).unwrap();
        assert_eq!(SearchEngine::fingerprint(&a), SearchEngine::fingerprint(&b));
    }

    #[test]
    fn fingerprint_differs_on_sort() {
        let a = SearchEngine::validate(&params("rust", None, Some("popularity"), None)).unwrap();
        let b = SearchEngine::validate(&params("rust", None, Some("relevance"), None)).unwrap();
        assert_ne!(SearchEngine::fingerprint(&a), SearchEngine::fingerprint(&b));
    }

    #[test]
    fn fingerprint_differs_on_page() {
        let a = SearchEngine::validate(&params("rust", None, None, Some(1))).unwrap();
        let b = SearchEngine::validate(&params("rust", None, None, Some(2))).unwrap();
        assert_ne!(SearchEngine::fingerprint(&a), SearchEngine::fingerprint(&b));
    }

    #[test]
    fn fingerprint_has_search_prefix() {
        let p = SearchEngine::validate(&params("x", None, None, None)).unwrap();
        assert!(SearchEngine::fingerprint(&p).starts_with("search:"));
    }
}
