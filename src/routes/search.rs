/*
 * GET /api/v1/search — the Search Engine's (C6) only HTTP surface: validate params, consult the
 * Result Cache, fall back to the Content Store's full-text query, and return the page envelope.
 * Grounded on the teacher's routes/github.rs `get_repositories` query-param/response shape.
 */

use axum::{extract::Query, extract::State, Json};

use crate::models::search::{SearchParams, SearchResponse};
use crate::utils::error::Result;
use crate::AppState;

/// `GET /api/v1/search?query=&type=&sort=&page=&page_size=`. Validation failures (bad `sort`,
/// bad `type`) surface as HTTP 400 via `AppError`'s `IntoResponse` impl; everything else either
/// succeeds or surfaces as 500.
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>> {
    let response = state.search_engine.search(&params).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::search_engine::SearchEngine;

    #[test]
    fn validate_rejects_unknown_sort_before_reaching_the_store() {
        let params = SearchParams {
            query: "rust".to_string(),
            kind: None,
            sort: Some("newest".to_string()),
            page: None,
            page_size: None,
        };
        assert!(SearchEngine::validate(&params).is_err());
    }
}
