/*
 * Scoring Engine (C4): a pure function mapping (content, statistics, publication time, now) to
 * a score tuple. I'm keeping this free of I/O, mirroring the pure scorer shape used by the
 * per-record recalculation job this is grounded on — the recency/engagement formula itself is
 * a discrete, stepwise function, not the continuous decay the teacher's original scorer used.
 */

use chrono::{DateTime, Utc};

use crate::models::content::{ContentKind, Statistics};

/// Per-kind multipliers applied to `base`. Configured, not hardcoded, so operators can retune
/// ranking without a redeploy.
#[derive(Debug, Clone, Copy)]
pub struct TypeWeights {
    pub video: f64,
    pub article: f64,
}

impl Default for TypeWeights {
    fn default() -> Self {
        Self {
            video: 1.5,
            article: 1.0,
        }
    }
}

impl TypeWeights {
    pub fn for_kind(&self, kind: ContentKind) -> f64 {
        match kind {
            ContentKind::Video => self.video,
            ContentKind::Article => self.article,
        }
    }
}

/// The four components the formula produces, plus the derived total. Every component is
/// rounded to 2 decimals half-away-from-zero before it's persisted or compared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub type_weight: f64,
    pub recency: f64,
    pub engagement: f64,
    pub r#final: f64,
}

/// Half-away-from-zero rounding to 2 decimal places, used for every score component the
/// API or database persists.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + value.signum() * 1e-9).round() / 100.0
}

/// Discrete recency bucket: 5.0 within a week, 3.0 within a month, 1.0 within a quarter,
/// 0.0 otherwise. Boundaries are inclusive.
fn recency_bucket(published_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_days = (now - published_at).num_seconds() as f64 / 86400.0;
    if age_days <= 7.0 {
        5.0
    } else if age_days <= 30.0 {
        3.0
    } else if age_days <= 90.0 {
        1.0
    } else {
        0.0
    }
}

/// Ratio-based engagement: for video, a like-per-view ratio scaled by 10; for article, a
/// reaction-per-reading-minute ratio scaled by 5. Zero when the denominator is zero.
fn engagement(kind: ContentKind, stats: &Statistics) -> f64 {
    match kind {
        ContentKind::Video if stats.views > 0 => (stats.likes as f64 / stats.views as f64) * 10.0,
        ContentKind::Article if stats.reading_time_minutes > 0 => {
            (stats.reactions as f64 / stats.reading_time_minutes as f64) * 5.0
        }
        _ => 0.0,
    }
}

fn base(kind: ContentKind, stats: &Statistics) -> f64 {
    match kind {
        ContentKind::Video => stats.views as f64 / 1000.0 + stats.likes as f64 / 100.0,
        ContentKind::Article => stats.reading_time_minutes as f64 + stats.reactions as f64 / 50.0,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine {
    weights: TypeWeights,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self {
            weights: TypeWeights::default(),
        }
    }
}

impl ScoringEngine {
    pub fn new(weights: TypeWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> TypeWeights {
        self.weights
    }

    /// Compute the full score breakdown for one content item against a fixed `now`, so the
    /// computation is deterministic and testable. Callers only invoke this when `Statistics`
    /// exists for the content — absence means the score is undefined and this is skipped.
    pub fn score(&self, kind: ContentKind, stats: &Statistics, published_at: DateTime<Utc>, now: DateTime<Utc>) -> ScoreBreakdown {
        let base = base(kind, stats);
        let type_weight = self.weights.for_kind(kind);
        let recency = recency_bucket(published_at, now);
        let engagement = engagement(kind, stats);
        let final_value = base * type_weight + recency + engagement;

        ScoreBreakdown {
            base: round2(base),
            type_weight,
            recency: round2(recency),
            engagement: round2(engagement),
            r#final: round2(final_value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn stats(views: i64, likes: i64, reading_time_minutes: i64, reactions: i64) -> Statistics {
        Statistics {
            content_id: Uuid::nil(),
            views,
            likes,
            reading_time_minutes,
            reactions,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn recency_bucket_boundaries_are_inclusive() {
        let now = Utc::now();
        assert_eq!(recency_bucket(now - chrono::Duration::days(7), now), 5.0);
        assert_eq!(recency_bucket(now - chrono::Duration::days(8), now), 3.0);
        assert_eq!(recency_bucket(now - chrono::Duration::days(30), now), 3.0);
        assert_eq!(recency_bucket(now - chrono::Duration::days(31), now), 1.0);
        assert_eq!(recency_bucket(now - chrono::Duration::days(90), now), 1.0);
        assert_eq!(recency_bucket(now - chrono::Duration::days(91), now), 0.0);
    }

    #[test]
    fn video_base_and_engagement() {
        let s = stats(2000, 100, 0, 0);
        assert_eq!(base(ContentKind::Video, &s), 3.0);
        assert_eq!(engagement(ContentKind::Video, &s), 0.5);
    }

    #[test]
    fn article_base_and_engagement() {
        let s = stats(0, 0, 10, 25);
        assert_eq!(base(ContentKind::Article, &s), 10.5);
        assert_eq!(engagement(ContentKind::Article, &s), 12.5);
    }

    #[test]
    fn engagement_is_zero_when_denominator_is_zero() {
        let video_no_views = stats(0, 5, 0, 0);
        assert_eq!(engagement(ContentKind::Video, &video_no_views), 0.0);
        let article_no_reading_time = stats(0, 0, 0, 5);
        assert_eq!(engagement(ContentKind::Article, &article_no_reading_time), 0.0);
    }

    #[test]
    fn round2_half_away_from_zero() {
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(-1.005), -1.01);
        assert_eq!(round2(1.004), 1.0);
    }

    #[test]
    fn default_type_weights_match_spec_defaults() {
        let weights = TypeWeights::default();
        assert_eq!(weights.video, 1.5);
        assert_eq!(weights.article, 1.0);
    }

    #[test]
    fn score_breakdown_is_deterministic_for_fixed_now() {
        let engine = ScoringEngine::default();
        let now = Utc::now();
        let published_at = now - chrono::Duration::days(3);
        let s = stats(2000, 100, 0, 0);
        let a = engine.score(ContentKind::Video, &s, published_at, now);
        let b = engine.score(ContentKind::Video, &s, published_at, now);
        assert_eq!(a, b);
        // base=3.0 * 1.5 + recency=5.0 + engagement=0.5 = 10.0
        assert_eq!(a.r#final, 10.0);
    }
}
