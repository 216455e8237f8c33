/*
 * Services module aggregator providing centralized access to all business logic services for the
 * federated content search service.
 * I'm organizing provider adapters, content persistence, scoring, search, sync orchestration, and
 * caching into a cohesive service layer that maintains clean separation of concerns.
 */

pub mod cache_service;
pub mod content_store;
pub mod providers;
pub mod scoring_engine;
pub mod search_engine;
pub mod sync_orchestrator;

pub use cache_service::CacheService;
pub use content_store::ContentStore;
pub use scoring_engine::ScoringEngine;
pub use search_engine::SearchEngine;
pub use sync_orchestrator::SyncOrchestrator;

use crate::{
    database::DatabasePool,
    utils::config::Config,
    utils::error::Result,
};

/// Service registry for centralized service management and dependency injection.
/// I'm implementing a service registry pattern for clean dependency management.
#[derive(Clone)]
pub struct ServiceRegistry {
    pub content_store: ContentStore,
    pub scoring_engine: ScoringEngine,
    pub search_engine: SearchEngine,
    pub sync_orchestrator: SyncOrchestrator,
    pub cache_service: CacheService,
}

impl ServiceRegistry {
    /// Create a new service registry with all services initialized from configuration.
    /// I'm ensuring all services are properly configured and connected.
    pub async fn new(db_pool: DatabasePool, redis_client: redis::Client, config: &Config) -> Result<Self> {
        tracing::info!("initializing service registry");

        let cache_service = CacheService::with_config(redis_client, "search:".to_string(), config.cache_default_ttl);

        let content_store = ContentStore::new(db_pool);

        let scoring_engine = ScoringEngine::new(scoring_engine::TypeWeights {
            video: config.video_type_weight,
            article: config.article_type_weight,
        });

        let search_engine = SearchEngine::new(content_store.clone(), cache_service.clone(), config.cache_default_ttl);

        let sync_orchestrator = SyncOrchestrator::new(
            content_store.clone(),
            scoring_engine,
            cache_service.clone(),
            config.provider_rate_limit_per_second,
        );

        tracing::info!("all services initialized successfully");

        Ok(Self {
            content_store,
            scoring_engine,
            search_engine,
            sync_orchestrator,
            cache_service,
        })
    }
}
