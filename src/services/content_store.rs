/*
 * Content Store (C3): persistence for providers, content, statistics, scores, and tags.
 * I'm using runtime `sqlx::query`/`query_as` throughout rather than the `query!` compile-time macro,
 * since there is no database available at build time to generate the offline query cache against.
 */

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::database::{with_transaction, DatabasePool};
use crate::models::content::{Content, ContentKind, ContentWithScore, NormalizedRecord, Score, Statistics};
use crate::models::provider::Provider;
use crate::models::search::{SortMode, ValidatedSearchParams};
use crate::utils::error::Result;

/// Weighted lexical vector label weights, `A` (title) down to `D` (unused), matching the
/// `setweight`/`ts_rank_cd` weight array this store maintains at write time.
const LEXICAL_WEIGHTS: &str = "{0.1, 0.2, 0.4, 1.0}";

/// One page of search results plus the total match count for the same filter, before the
/// caller (the Search Engine) wraps it in a pagination envelope.
pub struct SearchHit {
    pub content: ContentWithScore,
    pub relevance: f64,
}

#[derive(Clone)]
pub struct ContentStore {
    pool: DatabasePool,
}

impl ContentStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// The underlying pool, exposed for liveness checks that only need a trivial round-trip.
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    pub async fn list_active_providers(&self) -> Result<Vec<Provider>> {
        let rows = sqlx::query_as::<_, Provider>(
            "SELECT id, name, feed_url, format_tag, active, created_at, updated_at
             FROM providers WHERE active = TRUE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_provider_by_name(&self, name: &str) -> Result<Option<Provider>> {
        let row = sqlx::query_as::<_, Provider>(
            "SELECT id, name, feed_url, format_tag, active, created_at, updated_at
             FROM providers WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Insert a normalized record, or update it in place if `(provider_id, external_id)`
    /// already exists. Resurrects a previously soft-deleted row. Grounded on the teacher's
    /// `store_repositories_in_db` ON CONFLICT pattern.
    pub async fn upsert(&self, provider_id: Uuid, record: &NormalizedRecord) -> Result<Uuid> {
        let row = sqlx::query(
            "INSERT INTO contents
                (provider_id, external_id, title, description, content_type, published_at, raw_payload, deleted, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, NOW())
             ON CONFLICT (provider_id, external_id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                content_type = EXCLUDED.content_type,
                published_at = EXCLUDED.published_at,
                raw_payload = EXCLUDED.raw_payload,
                deleted = FALSE,
                updated_at = NOW()
             RETURNING id",
        )
        .bind(provider_id)
        .bind(&record.external_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.kind.as_str())
        .bind(record.published_at)
        .bind(&record.raw_payload)
        .fetch_one(&self.pool)
        .await?;

        let content_id: Uuid = row.try_get("id")?;
        Ok(content_id)
    }

    pub async fn upsert_stats(
        &self,
        content_id: Uuid,
        views: i64,
        likes: i64,
        reading_time_minutes: i64,
        reactions: i64,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO content_stats (content_id, views, likes, reading_time_minutes, reactions, updated_at)
             VALUES ($1, $2, $3, $4, $5, NOW())
             ON CONFLICT (content_id) DO UPDATE SET
                views = EXCLUDED.views,
                likes = EXCLUDED.likes,
                reading_time_minutes = EXCLUDED.reading_time_minutes,
                reactions = EXCLUDED.reactions,
                updated_at = NOW()",
        )
        .bind(content_id)
        .bind(views)
        .bind(likes)
        .bind(reading_time_minutes)
        .bind(reactions)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_score(&self, content_id: Uuid, score: &Score) -> Result<()> {
        sqlx::query(
            "INSERT INTO content_scores (content_id, base, type_weight, recency, engagement, final, calculated_at)
             VALUES ($1, $2, $3, $4, $5, $6, NOW())
             ON CONFLICT (content_id) DO UPDATE SET
                base = EXCLUDED.base,
                type_weight = EXCLUDED.type_weight,
                recency = EXCLUDED.recency,
                engagement = EXCLUDED.engagement,
                final = EXCLUDED.final,
                calculated_at = NOW()",
        )
        .bind(content_id)
        .bind(score.base)
        .bind(score.type_weight)
        .bind(score.recency)
        .bind(score.engagement)
        .bind(score.r#final)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Attach a tag set to a content item inside one transaction: normalize each name, ensure
    /// the tag row exists, ensure the link exists, then recompute the search vector's tag
    /// weight (B = 0.4). Idempotent — re-adding the same tags is a no-op after the first call.
    /// Grounded on the teacher's `with_transaction` helper.
    pub async fn add_tags(&self, content_id: Uuid, names: &[String]) -> Result<()> {
        let names = names.to_vec();
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                for name in &names {
                    let normalized = name.trim().to_lowercase();
                    if normalized.is_empty() {
                        continue;
                    }

                    let tag_id: Uuid = sqlx::query(
                        "INSERT INTO tags (name) VALUES ($1)
                         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                         RETURNING id",
                    )
                    .bind(&normalized)
                    .fetch_one(&mut **tx)
                    .await?
                    .try_get("id")?;

                    sqlx::query(
                        "INSERT INTO content_tags (content_id, tag_id) VALUES ($1, $2)
                         ON CONFLICT DO NOTHING",
                    )
                    .bind(content_id)
                    .bind(tag_id)
                    .execute(&mut **tx)
                    .await?;
                }

                sqlx::query(
                    "UPDATE contents SET search_vector =
                        setweight(to_tsvector('english', coalesce(title, '')), 'A') ||
                        setweight(to_tsvector('english', coalesce((
                            SELECT string_agg(t.name, ' ') FROM content_tags ct
                            JOIN tags t ON t.id = ct.tag_id WHERE ct.content_id = contents.id
                        ), '')), 'B')
                     WHERE id = $1",
                )
                .bind(content_id)
                .execute(&mut **tx)
                .await?;

                Ok(())
            })
        })
        .await
    }

    /// Look up one content item with its embedded statistics, score, and tags. Soft-deleted
    /// rows are invisible here — a deleted row reads as not found.
    pub async fn find(&self, id: Uuid) -> Result<Option<ContentWithScore>> {
        let content = sqlx::query_as::<_, Content>(
            "SELECT id, provider_id, external_id, title, description, content_type,
                    published_at, raw_payload, deleted, created_at, updated_at
             FROM contents WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(content) = content else {
            return Ok(None);
        };

        let stats = sqlx::query_as::<_, Statistics>(
            "SELECT content_id, views, likes, reading_time_minutes, reactions, updated_at
             FROM content_stats WHERE content_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let score = sqlx::query_as::<_, Score>(
            "SELECT content_id, base, type_weight, recency, engagement, final, calculated_at
             FROM content_scores WHERE content_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let tags = self.tags_for(id).await?;

        Ok(Some(ContentWithScore {
            content,
            stats,
            score,
            tags,
        }))
    }

    async fn tags_for(&self, content_id: Uuid) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT t.name FROM tags t
             JOIN content_tags ct ON ct.tag_id = t.id
             WHERE ct.content_id = $1
             ORDER BY t.name",
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(|r| r.try_get::<String, _>("name").map_err(Into::into)).collect()
    }

    /// Soft-delete every non-deleted row for a provider whose `updated_at` predates the sync
    /// run's start instant, so a record untouched by the current sync fan-out is marked gone.
    pub async fn mark_stale_deleted(&self, provider_id: Uuid, sync_started_at: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE contents SET deleted = TRUE, updated_at = NOW()
             WHERE provider_id = $1 AND deleted = FALSE AND updated_at < $2",
        )
        .bind(provider_id)
        .bind(sync_started_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Sanitize a raw query string into the conjunctive prefix-match words the weighted
    /// lexical vector is matched against: keep only `[A-Za-z0-9]` and whitespace, split on
    /// whitespace, drop empty tokens.
    fn sanitize_query_words(raw: &str) -> Vec<String> {
        let cleaned: String = raw
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c.is_whitespace() { c } else { ' ' })
            .collect();
        cleaned.split_whitespace().filter(|w| !w.is_empty()).map(|w| w.to_string()).collect()
    }

    /// Full-text + filter + sort query against live content, implementing the Content Store's
    /// exact query-construction contract: sanitize the query into a conjunctive prefix-match
    /// `tsquery`, optionally filter by kind, always exclude soft-deleted rows, rank by the
    /// weighted lexical vector when relevance-sorting a non-empty query, otherwise by the
    /// precomputed final score.
    pub async fn search(&self, params: &ValidatedSearchParams) -> Result<(Vec<SearchHit>, i64)> {
        let words = Self::sanitize_query_words(&params.query);
        let tsquery_string = if words.is_empty() {
            None
        } else {
            Some(words.iter().map(|w| format!("{}:*", w)).collect::<Vec<_>>().join(" & "))
        };
        let relevance_active = tsquery_string.is_some() && params.sort == SortMode::Relevance;
        let kind_filter = params.kind.map(ContentKind::as_str);

        let order_clause = if relevance_active {
            "relevance DESC, c.published_at DESC"
        } else {
            "cs.final DESC NULLS LAST, c.published_at DESC"
        };

        let sql = format!(
            "SELECT c.id, c.provider_id, c.external_id, c.title, c.description, c.content_type,
                    c.published_at, c.raw_payload, c.deleted, c.created_at, c.updated_at,
                    cst.views, cst.likes, cst.reading_time_minutes, cst.reactions, cst.updated_at as stats_updated_at,
                    cs.base, cs.type_weight, cs.recency, cs.engagement, cs.final, cs.calculated_at,
                    COALESCE(array_agg(t.name) FILTER (WHERE t.name IS NOT NULL), ARRAY[]::text[]) as tags,
                    CASE WHEN $1::text IS NOT NULL
                         THEN ts_rank_cd('{}'::float4[], c.search_vector, to_tsquery('english', $1))
                         ELSE 0
                    END as relevance
             FROM contents c
             LEFT JOIN content_stats cst ON cst.content_id = c.id
             LEFT JOIN content_scores cs ON cs.content_id = c.id
             LEFT JOIN content_tags ct ON ct.content_id = c.id
             LEFT JOIN tags t ON t.id = ct.tag_id
             WHERE c.deleted = FALSE
               AND ($2::text IS NULL OR c.content_type = $2)
               AND ($1::text IS NULL OR c.search_vector @@ to_tsquery('english', $1))
             GROUP BY c.id, cst.views, cst.likes, cst.reading_time_minutes, cst.reactions, cst.updated_at,
                      cs.base, cs.type_weight, cs.recency, cs.engagement, cs.final, cs.calculated_at
             ORDER BY {}
             LIMIT $3 OFFSET $4",
            LEXICAL_WEIGHTS, order_clause
        );

        let rows = sqlx::query(&sql)
            .bind(&tsquery_string)
            .bind(kind_filter)
            .bind(params.page_size)
            .bind((params.page - 1) * params.page_size)
            .fetch_all(&self.pool)
            .await?;

        let mut hits = Vec::with_capacity(rows.len());
        for row in &rows {
            let content = Content {
                id: row.try_get("id")?,
                provider_id: row.try_get("provider_id")?,
                external_id: row.try_get("external_id")?,
                title: row.try_get("title")?,
                description: row.try_get("description")?,
                kind: ContentKind::parse(row.try_get::<String, _>("content_type")?.as_str())
                    .unwrap_or(ContentKind::Article),
                published_at: row.try_get("published_at")?,
                raw_payload: row.try_get("raw_payload")?,
                deleted: row.try_get("deleted")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            };

            let stats = row.try_get::<Option<i64>, _>("views")?.map(|views| Statistics {
                content_id: content.id,
                views,
                likes: row.try_get("likes").unwrap_or(0),
                reading_time_minutes: row.try_get("reading_time_minutes").unwrap_or(0),
                reactions: row.try_get("reactions").unwrap_or(0),
                updated_at: row.try_get("stats_updated_at").unwrap_or_else(|_| Utc::now()),
            });

            let score = row.try_get::<Option<f64>, _>("base")?.map(|base| Score {
                content_id: content.id,
                base,
                type_weight: row.try_get("type_weight").unwrap_or(1.0),
                recency: row.try_get("recency").unwrap_or(0.0),
                engagement: row.try_get("engagement").unwrap_or(0.0),
                r#final: row.try_get("final").unwrap_or(0.0),
                calculated_at: row.try_get("calculated_at").unwrap_or_else(|_| Utc::now()),
            });

            let tags: Vec<String> = row.try_get("tags")?;
            let relevance: f64 = row.try_get("relevance")?;

            hits.push(SearchHit {
                content: ContentWithScore {
                    content,
                    stats,
                    score,
                    tags,
                },
                relevance,
            });
        }

        let total_row = sqlx::query(
            "SELECT count(*) as total FROM contents c
             WHERE c.deleted = FALSE
               AND ($2::text IS NULL OR c.content_type = $2)
               AND ($1::text IS NULL OR c.search_vector @@ to_tsquery('english', $1))",
        )
        .bind(&tsquery_string)
        .bind(kind_filter)
        .fetch_one(&self.pool)
        .await?;
        let total: i64 = total_row.try_get("total")?;

        Ok((hits, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_query_words_strips_punctuation_and_splits() {
        let words = ContentStore::sanitize_query_words("rust! web-dev  2024");
        assert_eq!(words, vec!["rust", "web", "dev", "2024"]);
    }

    #[test]
    fn sanitize_query_words_empty_for_only_punctuation() {
        let words = ContentStore::sanitize_query_words("!!! ---");
        assert!(words.is_empty());
    }
}
