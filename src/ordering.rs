//! Listing order: a closed set of sort strategies over tool snapshots.
//!
//! Every strategy is a pure comparator applied with a stable sort, so tools
//! that compare equal keep the order the caller fetched them in. There is no
//! secondary key beyond what each strategy lists.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RankingError;
use crate::tool::ToolSnapshot;

pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const MAX_PAGE_LIMIT: usize = 100;

/// Accepted values of the legacy `ranking_type` query parameter map 1:1 onto
/// these variants (`default`, `sponsored`, `featured`, `trending`, `newest`,
/// `top_rated`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortStrategy {
    /// `rank_score` desc.
    #[default]
    Default,
    /// Sponsored first, then `sponsored_rank` asc (unranked last), then `rank_score` desc.
    Sponsored,
    /// Featured first, then `featured_rank` asc (unranked last), then `rank_score` desc.
    Featured,
    /// Trending first, then `rank_score` desc.
    Trending,
    /// `created_at` desc.
    Newest,
    /// `average_rating` desc, then `review_count` desc.
    TopRated,
}

impl SortStrategy {
    pub const ALL: [SortStrategy; 6] = [
        SortStrategy::Default,
        SortStrategy::Sponsored,
        SortStrategy::Featured,
        SortStrategy::Trending,
        SortStrategy::Newest,
        SortStrategy::TopRated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortStrategy::Default => "default",
            SortStrategy::Sponsored => "sponsored",
            SortStrategy::Featured => "featured",
            SortStrategy::Trending => "trending",
            SortStrategy::Newest => "newest",
            SortStrategy::TopRated => "top_rated",
        }
    }

    /// `Less` means `a` is listed before `b`.
    pub fn compare(self, a: &ToolSnapshot, b: &ToolSnapshot) -> Ordering {
        match self {
            SortStrategy::Default => by_score(a, b),
            SortStrategy::Sponsored => flag_first(a.is_sponsored, b.is_sponsored)
                .then_with(|| rank_asc_nulls_last(a.sponsored_rank, b.sponsored_rank))
                .then_with(|| by_score(a, b)),
            SortStrategy::Featured => flag_first(a.is_featured, b.is_featured)
                .then_with(|| rank_asc_nulls_last(a.featured_rank, b.featured_rank))
                .then_with(|| by_score(a, b)),
            SortStrategy::Trending => {
                flag_first(a.is_trending, b.is_trending).then_with(|| by_score(a, b))
            }
            SortStrategy::Newest => b.created_at.cmp(&a.created_at),
            SortStrategy::TopRated => b
                .average_rating
                .total_cmp(&a.average_rating)
                .then_with(|| b.review_count.cmp(&a.review_count)),
        }
    }

    /// Stable in-place sort.
    pub fn sort(self, tools: &mut [ToolSnapshot]) {
        tools.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortStrategy {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SortStrategy::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| RankingError::UnknownSortStrategy(s.to_string()))
    }
}

fn by_score(a: &ToolSnapshot, b: &ToolSnapshot) -> Ordering {
    b.rank_score.total_cmp(&a.rank_score)
}

fn flag_first(a: bool, b: bool) -> Ordering {
    b.cmp(&a)
}

fn rank_asc_nulls_last(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Offset/limit window over an already sorted listing. `limit` is clamped to
/// `1..=MAX_PAGE_LIMIT`.
pub fn paginate<T>(items: &[T], offset: usize, limit: usize) -> &[T] {
    let limit = limit.clamp(1, MAX_PAGE_LIMIT);
    let start = offset.min(items.len());
    let end = start.saturating_add(limit).min(items.len());
    &items[start..end]
}
