/*
 * Benchmarks for Content Store round trips. Requires DATABASE_URL to point at a reachable
 * Postgres instance with migrations applied — these measure real query latency, not just
 * in-process CPU cost.
 */

use content_search_service::database::connection::create_pool;
use content_search_service::models::content::ContentKind;
use content_search_service::models::search::{SortMode, ValidatedSearchParams};
use content_search_service::services::content_store::ContentStore;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tokio::runtime::Runtime;

fn store() -> (Runtime, ContentStore) {
    let rt = Runtime::new().expect("tokio runtime");
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/content_search_bench".to_string());
    let pool = rt.block_on(create_pool(&database_url)).expect("database pool for benchmarks");
    (rt, ContentStore::new(pool))
}

fn bench_list_active_providers(c: &mut Criterion) {
    let (rt, store) = store();

    c.bench_function("list_active_providers", |b| {
        b.to_async(&rt).iter(|| async { black_box(store.list_active_providers().await) })
    });
}

fn bench_search_relevance(c: &mut Criterion) {
    let (rt, store) = store();
    let params = ValidatedSearchParams {
        query: "rust".to_string(),
        kind: Some(ContentKind::Article),
        sort: SortMode::Relevance,
        page: 1,
        page_size: 20,
    };

    c.bench_function("search_relevance_page", |b| {
        b.to_async(&rt).iter(|| async { black_box(store.search(&params).await) })
    });
}

fn bench_search_popularity(c: &mut Criterion) {
    let (rt, store) = store();
    let params = ValidatedSearchParams {
        query: String::new(),
        kind: None,
        sort: SortMode::Popularity,
        page: 1,
        page_size: 20,
    };

    c.bench_function("search_popularity_page", |b| {
        b.to_async(&rt).iter(|| async { black_box(store.search(&params).await) })
    });
}

criterion_group!(
    benches,
    bench_list_active_providers,
    bench_search_relevance,
    bench_search_popularity
);
criterion_main!(benches);
