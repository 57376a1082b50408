//! # Score Calculator
//! Pure mapping `(ToolSnapshot, RankingConfig, now)` → rank score.
//! No I/O, no shared state; safe to call from any number of request tasks.
//!
//! The score is an additive model, one independent term per signal:
//! sponsorship, editorial featuring, internal tools, engagement (log-scaled),
//! reviews (Bayesian-smoothed), freshness (half-life decay), plus flat
//! trending and verified bonuses. The sum is rounded to 4 decimals.

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RankingConfig;
use crate::tool::{ToolSnapshot, MAX_RATING};

/// `sponsored_rank` is subtracted from this, so manual order stays below 1000 positions.
pub const SPONSORED_RANK_CEILING: f64 = 1000.0;
pub const FEATURED_RANK_CEILING: f64 = 500.0;

/// Fixed trust signal for verified tools; deliberately not configurable.
pub const VERIFIED_BONUS: f64 = 5.0;
/// Trending adds this fraction of the engagement weight.
pub const TRENDING_ENGAGEMENT_FACTOR: f64 = 0.5;

/// Prior mean of the Bayesian review average.
pub const REVIEW_PRIOR_MEAN: f64 = 3.5;

/// Upper bound of the unweighted review and freshness signals.
const SIGNAL_CEILING: f64 = 10.0;

// Raw engagement weights: clicks 10x views, saves 20x views.
const VIEW_WEIGHT: f64 = 0.1;
const CLICK_WEIGHT: f64 = 1.0;
const SAVE_WEIGHT: f64 = 2.0;

/// Per-term contributions, already multiplied by their weights.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub sponsored: f64,
    pub featured: f64,
    pub internal: f64,
    pub engagement: f64,
    pub reviews: f64,
    pub freshness: f64,
    pub trending: f64,
    pub verified: f64,
    /// Rounded sum of all terms; equal to `score()`.
    pub total: f64,
}

/// Score with every term reported separately.
pub fn explain(tool: &ToolSnapshot, config: &RankingConfig, now: DateTime<Utc>) -> ScoreBreakdown {
    let w = &config.weights;
    let mut b = ScoreBreakdown::default();

    if tool.is_sponsored {
        b.sponsored = w.sponsored;
        if let Some(rank) = tool.sponsored_rank {
            b.sponsored += SPONSORED_RANK_CEILING - f64::from(rank);
        }
    }

    if tool.is_featured {
        b.featured = w.featured;
        if let Some(rank) = tool.featured_rank {
            b.featured += FEATURED_RANK_CEILING - f64::from(rank);
        }
    }

    if tool.is_internal {
        b.internal = w.internal;
    }

    b.engagement = engagement_signal(tool) * w.engagement;
    b.reviews = review_signal(tool, config.min_reviews_for_score) * w.reviews;
    b.freshness =
        freshness_signal(tool.created_at, now, config.freshness_decay_days) * w.freshness;

    if tool.is_trending {
        b.trending = w.engagement * TRENDING_ENGAGEMENT_FACTOR;
    }
    if tool.is_verified {
        b.verified = VERIFIED_BONUS;
    }

    b.total = round4(
        b.sponsored
            + b.featured
            + b.internal
            + b.engagement
            + b.reviews
            + b.freshness
            + b.trending
            + b.verified,
    );
    b
}

/// Rank score of one tool. Higher sorts earlier; there is no fixed bound.
pub fn score(tool: &ToolSnapshot, config: &RankingConfig, now: DateTime<Utc>) -> f64 {
    explain(tool, config, now).total
}

/// `log10(raw + 1) * 10` over weighted views/clicks/saves. Diminishing returns:
/// ten times the raw engagement adds one unit of log10.
pub fn engagement_signal(tool: &ToolSnapshot) -> f64 {
    let raw = tool.view_count as f64 * VIEW_WEIGHT
        + tool.click_count as f64 * CLICK_WEIGHT
        + tool.save_count as f64 * SAVE_WEIGHT;
    (raw + 1.0).log10() * 10.0
}

/// Review signal in `[0, 10]`.
///
/// Below `min_reviews` the credit is partial and gated by both rating and
/// volume; from `min_reviews` on it is the Bayesian average against a prior
/// of `min_reviews` ratings at 3.5.
pub fn review_signal(tool: &ToolSnapshot, min_reviews: u32) -> f64 {
    if tool.review_count == 0 {
        return 0.0;
    }
    let count = tool.review_count as f64;
    let prior = f64::from(min_reviews);

    if tool.review_count < u64::from(min_reviews) {
        return (tool.average_rating / MAX_RATING) * (count / prior) * SIGNAL_CEILING;
    }

    let bayesian = (tool.average_rating * count + REVIEW_PRIOR_MEAN * prior) / (count + prior);
    (bayesian / MAX_RATING) * SIGNAL_CEILING
}

/// Freshness signal: 10.0 for tools created today (or in the future, clock
/// skew), halving every `half_life_days` whole days of age.
pub fn freshness_signal(created_at: DateTime<Utc>, now: DateTime<Utc>, half_life_days: u32) -> f64 {
    let days_old = (now - created_at).num_days();
    if days_old <= 0 {
        return SIGNAL_CEILING;
    }
    let decay_rate = std::f64::consts::LN_2 / f64::from(half_life_days.max(1));
    SIGNAL_CEILING * (-decay_rate * days_old as f64).exp()
}

/// Recompute and store `rank_score` for one tool.
pub fn rescore(tool: &mut ToolSnapshot, config: &RankingConfig, now: DateTime<Utc>) -> f64 {
    let s = score(tool, config, now);
    tool.rank_score = s;
    s
}

/// Recompute `rank_score` for every tool.
///
/// All scores are computed before any is written, so the batch is updated as
/// a whole. Chunking large collections is left to the caller.
pub fn bulk_recalculate(tools: &mut [ToolSnapshot], config: &RankingConfig, now: DateTime<Utc>) {
    let scores: Vec<f64> = tools.iter().map(|t| score(t, config, now)).collect();
    for (tool, s) in tools.iter_mut().zip(scores) {
        tool.rank_score = s;
    }

    counter!("ranking_recalculated_total").increment(tools.len() as u64);
    histogram!("ranking_batch_size").record(tools.len() as f64);
    info!(
        target: "ranking",
        tools = tools.len(),
        config = %config.name,
        version = config.version,
        "rank scores recalculated"
    );
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn tool(now: DateTime<Utc>) -> ToolSnapshot {
        ToolSnapshot::new(Uuid::new_v4(), now)
    }

    #[test]
    fn blank_tool_created_now_gets_only_freshness() {
        let now = Utc::now();
        let cfg = RankingConfig::default();
        let b = explain(&tool(now), &cfg, now);
        assert_eq!(b.engagement, 0.0);
        assert_eq!(b.reviews, 0.0);
        assert_eq!(b.freshness, 100.0);
        assert_eq!(b.total, 100.0);
    }

    #[test]
    fn concrete_marketplace_scenario() {
        let now = Utc::now();
        let cfg = RankingConfig::default();
        let mut t = tool(now);
        t.view_count = 100;
        t.click_count = 10;
        t.save_count = 2;
        t.review_count = 5;
        t.average_rating = 4.0;

        let b = explain(&t, &cfg, now);
        // raw = 10 + 10 + 4 = 24 -> log10(25) * 10 * 30
        assert!((b.engagement - 25f64.log10() * 300.0).abs() < 1e-9);
        assert!((b.engagement - 419.382).abs() < 1e-3);
        // Bayesian branch at the boundary: (20 + 17.5) / 10 = 3.75 -> 7.5 * 20
        assert!((b.reviews - 150.0).abs() < 1e-9);
        assert_eq!(b.freshness, 100.0);
        assert!((b.total - 669.382).abs() < 1e-9);
    }

    #[test]
    fn sponsored_and_featured_overrides() {
        let now = Utc::now();
        let cfg = RankingConfig::default();

        let mut first = tool(now);
        first.is_sponsored = true;
        first.sponsored_rank = Some(1);
        let mut second = first.clone();
        second.sponsored_rank = Some(2);
        let mut unranked = first.clone();
        unranked.sponsored_rank = None;

        let a = explain(&first, &cfg, now);
        assert_eq!(a.sponsored, 100.0 + 999.0);
        assert!(score(&first, &cfg, now) > score(&second, &cfg, now));
        assert!(score(&second, &cfg, now) > score(&unranked, &cfg, now));

        let mut feat = tool(now);
        feat.is_featured = true;
        feat.featured_rank = Some(10);
        assert_eq!(explain(&feat, &cfg, now).featured, 50.0 + 490.0);

        // Override ranks without the flag do nothing.
        let mut stray = tool(now);
        stray.sponsored_rank = Some(1);
        stray.featured_rank = Some(1);
        let b = explain(&stray, &cfg, now);
        assert_eq!(b.sponsored, 0.0);
        assert_eq!(b.featured, 0.0);
    }

    #[test]
    fn internal_trending_verified_bonuses() {
        let now = Utc::now();
        let cfg = RankingConfig::default();
        let mut t = tool(now);
        t.is_internal = true;
        t.is_trending = true;
        t.is_verified = true;
        let b = explain(&t, &cfg, now);
        assert_eq!(b.internal, 80.0);
        assert_eq!(b.trending, 15.0);
        assert_eq!(b.verified, 5.0);
        assert_eq!(b.total, 80.0 + 15.0 + 5.0 + 100.0);
    }

    #[test]
    fn freshness_half_life() {
        let now = Utc::now();
        let fresh = freshness_signal(now, now, 30);
        let half = freshness_signal(now - Duration::days(30), now, 30);
        let quarter = freshness_signal(now - Duration::days(60), now, 30);
        assert_eq!(fresh, 10.0);
        assert!((half - 5.0).abs() < 1e-9);
        assert!((quarter - 2.5).abs() < 1e-9);

        // Future timestamps (clock skew) clamp to the ceiling.
        assert_eq!(freshness_signal(now + Duration::days(3), now, 30), 10.0);
        // Less than a whole day old still counts as new.
        assert_eq!(freshness_signal(now - Duration::hours(23), now, 30), 10.0);
    }

    #[test]
    fn no_reviews_no_credit() {
        let now = Utc::now();
        let mut t = tool(now);
        for rating in [0.0, 2.5, 5.0] {
            t.average_rating = rating;
            assert_eq!(review_signal(&t, 5), 0.0);
            assert_eq!(review_signal(&t, 0), 0.0);
        }
    }

    #[test]
    fn single_perfect_review_does_not_beat_established_tool() {
        let now = Utc::now();
        let mut lucky = tool(now);
        lucky.review_count = 1;
        lucky.average_rating = 5.0;
        let mut established = tool(now);
        established.review_count = 40;
        established.average_rating = 4.2;
        assert!(review_signal(&lucky, 5) < review_signal(&established, 5));
    }

    #[test]
    fn zero_prior_uses_plain_average() {
        let now = Utc::now();
        let mut t = tool(now);
        t.review_count = 3;
        t.average_rating = 4.0;
        assert!((review_signal(&t, 0) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn bulk_recalculate_is_idempotent() {
        let now = Utc::now();
        let cfg = RankingConfig::default();
        let mut tools: Vec<ToolSnapshot> = (0..5u64)
            .map(|i| {
                let mut t = tool(now - Duration::days(i as i64 * 11));
                t.click_count = i * 17;
                t.review_count = i;
                t.average_rating = 3.0 + i as f64 * 0.4;
                t
            })
            .collect();

        bulk_recalculate(&mut tools, &cfg, now);
        let first: Vec<f64> = tools.iter().map(|t| t.rank_score).collect();
        bulk_recalculate(&mut tools, &cfg, now);
        let second: Vec<f64> = tools.iter().map(|t| t.rank_score).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|s| *s > 0.0));
    }

    #[test]
    fn scores_are_rounded_to_four_decimals() {
        let now = Utc::now();
        let cfg = RankingConfig::default();
        let mut t = tool(now - Duration::days(7));
        t.view_count = 33;
        let s = score(&t, &cfg, now);
        assert_eq!(s, (s * 10_000.0).round() / 10_000.0);
    }
}
