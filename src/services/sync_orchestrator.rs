/*
 * Sync Orchestrator (C5): fans out over every active provider adapter, upserting each record's
 * content/stats/score/tags in sequence, then soft-deletes whatever a provider stopped emitting.
 * Grounded on the teacher's background-refresh task shape, generalized from a single GitHub
 * pull into a fan-out over an arbitrary provider set.
 */

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::models::content::{NormalizedStats, Score};
use crate::models::provider::Provider;
use crate::services::content_store::ContentStore;
use crate::services::providers::{build_adapter, ProviderAdapter, TokenBucket};
use crate::services::scoring_engine::ScoringEngine;
use crate::utils::error::Result;

/// Coordinates one full ingestion pass: fan out to every active provider concurrently, then
/// clear the Result Cache once every provider has finished (success or isolated failure).
#[derive(Clone)]
pub struct SyncOrchestrator {
    content_store: ContentStore,
    scoring_engine: ScoringEngine,
    cache: crate::services::cache_service::CacheService,
    http_client: Client,
    rate_limit_per_second: u32,
}

impl SyncOrchestrator {
    pub fn new(
        content_store: ContentStore,
        scoring_engine: ScoringEngine,
        cache: crate::services::cache_service::CacheService,
        rate_limit_per_second: u32,
    ) -> Self {
        Self {
            content_store,
            scoring_engine,
            cache,
            http_client: Client::new(),
            rate_limit_per_second,
        }
    }

    /// Run a full sync pass: load active providers, fan out `sync_one` concurrently, then
    /// clear the cache once every provider has finished.
    pub async fn sync_all(&self, cancel: CancellationToken) -> Result<()> {
        let t_start = Utc::now();
        let providers = self.content_store.list_active_providers().await?;
        info!("sync_all: starting pass over {} active provider(s)", providers.len());

        let tasks = providers.into_iter().map(|provider| {
            let store = self.content_store.clone();
            let scoring = self.scoring_engine;
            let client = self.http_client.clone();
            let cancel = cancel.clone();
            let rate_limit = self.rate_limit_per_second;
            async move {
                let name = provider.name.clone();
                if let Err(err) = sync_one(&store, &scoring, client, rate_limit, &provider, t_start, &cancel).await {
                    warn!("sync_one failed for provider {}: {}", name, err);
                }
            }
        });

        join_all(tasks).await;

        if let Err(err) = self.cache.clear().await {
            warn!("result cache clear failed after sync_all (non-fatal): {}", err);
        }

        info!("sync_all: pass complete");
        Ok(())
    }

    /// Launch `sync_all` on a fresh background task and return immediately. Used by the admin
    /// trigger endpoint so the HTTP response doesn't wait on a full ingestion pass.
    pub fn sync_all_async(&self, cancel: CancellationToken) {
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(err) = this.sync_all(cancel).await {
                warn!("background sync_all failed: {}", err);
            }
        });
    }
}

/// Pull every record from one provider's adapter, upsert it (content, stats, score, tags),
/// then soft-delete whatever this provider didn't re-emit during the run. A failure fetching
/// the feed fails only this provider; a failure upserting one record is logged and skipped so
/// one bad record doesn't abort the rest of the provider's sync.
async fn sync_one(
    store: &ContentStore,
    scoring: &ScoringEngine,
    client: Client,
    rate_limit_per_second: u32,
    provider: &Provider,
    t_start: chrono::DateTime<Utc>,
    cancel: &CancellationToken,
) -> Result<()> {
    let rate_limiter = Arc::new(TokenBucket::new(1, rate_limit_per_second.max(1)));
    let adapter: Box<dyn ProviderAdapter> = build_adapter(provider, client, rate_limiter)?;

    let records = adapter.fetch_all(cancel).await?;
    info!("sync_one: provider {} fetched {} record(s)", provider.name, records.len());

    for record in &records {
        let content_id = match store.upsert(provider.id, record).await {
            Ok(id) => id,
            Err(err) => {
                warn!("upsert failed for provider {} external_id {}: {}", provider.name, record.external_id, err);
                continue;
            }
        };

        if let Err(err) = upsert_stats(store, content_id, &record.stats).await {
            warn!("upsert_stats failed for content {}: {}", content_id, err);
        }

        let score = scoring.score(record.kind, &stats_row(content_id, &record.stats), record.published_at, Utc::now());
        let score = Score {
            content_id,
            base: score.base,
            type_weight: score.type_weight,
            recency: score.recency,
            engagement: score.engagement,
            r#final: score.r#final,
            calculated_at: Utc::now(),
        };
        if let Err(err) = store.upsert_score(content_id, &score).await {
            warn!("upsert_score failed for content {}: {}", content_id, err);
        }

        if !record.tags.is_empty() {
            if let Err(err) = store.add_tags(content_id, &record.tags).await {
                warn!("add_tags failed for content {} (swallowed, best-effort): {}", content_id, err);
            }
        }
    }

    let reclaimed = store.mark_stale_deleted(provider.id, t_start).await?;
    if reclaimed > 0 {
        info!("sync_one: provider {} soft-deleted {} stale content row(s)", provider.name, reclaimed);
    }

    Ok(())
}

async fn upsert_stats(store: &ContentStore, content_id: uuid::Uuid, stats: &NormalizedStats) -> Result<()> {
    store
        .upsert_stats(content_id, stats.views, stats.likes, stats.reading_time_minutes, stats.reactions)
        .await
}

fn stats_row(content_id: uuid::Uuid, stats: &NormalizedStats) -> crate::models::content::Statistics {
    crate::models::content::Statistics {
        content_id,
        views: stats.views,
        likes: stats.likes,
        reading_time_minutes: stats.reading_time_minutes,
        reactions: stats.reactions,
        updated_at: Utc::now(),
    }
}

/// Minimum interval the Scheduler is allowed to run `sync_all` on, per the external contract.
pub const MIN_SYNC_INTERVAL_SECONDS: u64 = 60;

/// Run `sync_all` once immediately, then again every `interval` until `cancel` fires. Interval
/// is clamped to the documented minimum so a misconfigured environment can't hammer providers.
pub async fn run_scheduler(orchestrator: SyncOrchestrator, interval: Duration, cancel: CancellationToken) {
    let interval = interval.max(Duration::from_secs(MIN_SYNC_INTERVAL_SECONDS));
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = orchestrator.sync_all(cancel.clone()).await {
                    warn!("scheduled sync_all failed: {}", err);
                }
            }
            _ = cancel.cancelled() => {
                info!("scheduler: cancellation received, stopping");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_sync_interval_is_sixty_seconds() {
        assert_eq!(MIN_SYNC_INTERVAL_SECONDS, 60);
    }
}
