/*
 * Benchmarks for the scoring/ranking hot path exercised on every sync pass.
 */

use chrono::{Duration as ChronoDuration, Utc};
use content_search_service::models::content::{ContentKind, Statistics};
use content_search_service::models::search::{SearchParams, ValidatedSearchParams, SortMode};
use content_search_service::services::scoring_engine::{ScoringEngine, TypeWeights};
use content_search_service::services::search_engine::SearchEngine;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use uuid::Uuid;

fn bench_score_video(c: &mut Criterion) {
    let engine = ScoringEngine::new(TypeWeights { video: 1.5, article: 1.0 });
    let stats = Statistics {
        content_id: Uuid::nil(),
        views: 482_931,
        likes: 12_044,
        reading_time_minutes: 0,
        reactions: 0,
        updated_at: Utc::now(),
    };
    let published_at = Utc::now() - ChronoDuration::days(14);
    let now = Utc::now();

    c.bench_function("score_video", |b| {
        b.iter(|| black_box(engine.score(ContentKind::Video, black_box(&stats), published_at, now)))
    });
}

fn bench_score_article(c: &mut Criterion) {
    let engine = ScoringEngine::new(TypeWeights { video: 1.5, article: 1.0 });
    let stats = Statistics {
        content_id: Uuid::nil(),
        views: 0,
        likes: 0,
        reading_time_minutes: 8,
        reactions: 340,
        updated_at: Utc::now(),
    };
    let published_at = Utc::now() - ChronoDuration::days(2);
    let now = Utc::now();

    c.bench_function("score_article", |b| {
        b.iter(|| black_box(engine.score(ContentKind::Article, black_box(&stats), published_at, now)))
    });
}

fn bench_search_fingerprint(c: &mut Criterion) {
    let validated = ValidatedSearchParams {
        query: "rust async runtime".to_string(),
        kind: Some(ContentKind::Article),
        sort: SortMode::Relevance,
        page: 1,
        page_size: 20,
    };

    c.bench_function("search_fingerprint", |b| {
        b.iter(|| black_box(SearchEngine::fingerprint(black_box(&validated))))
    });
}

fn bench_search_validate(c: &mut Criterion) {
    let params = SearchParams {
        query: "distributed tracing".to_string(),
        kind: None,
        sort: Some("relevance".to_string()),
        page: Some(2),
        page_size: Some(50),
    };

    c.bench_function("search_validate", |b| {
        b.iter(|| black_box(SearchEngine::validate(black_box(&params))))
    });
}

criterion_group!(
    benches,
    bench_score_video,
    bench_score_article,
    bench_search_fingerprint,
    bench_search_validate
);
criterion_main!(benches);
