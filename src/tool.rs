//! # Tool Snapshot
//! The subset of a marketplace tool record that ranking consumes.
//!
//! Snapshots are fetched by the caller from its own storage, scored here, and
//! written back. Only `rank_score` (and `is_trending`, through trending
//! detection) is ever mutated by this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RankingError, Result};

/// Highest accepted average rating.
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSnapshot {
    pub id: Uuid,

    #[serde(default)]
    pub is_sponsored: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_internal: bool,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub is_verified: bool,

    /// Manual position among sponsored tools; lower is better.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsored_rank: Option<u32>,
    /// Manual position among featured tools; lower is better.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_rank: Option<u32>,

    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub click_count: u64,
    #[serde(default)]
    pub save_count: u64,

    #[serde(default)]
    pub review_count: u64,
    /// Mean rating in `[0.0, 5.0]`.
    #[serde(default)]
    pub average_rating: f64,

    pub created_at: DateTime<Utc>,

    /// Last computed score; output of the scorer, never an input to it.
    #[serde(default)]
    pub rank_score: f64,
}

impl ToolSnapshot {
    /// Fresh, unflagged tool with zeroed counters.
    pub fn new(id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            is_sponsored: false,
            is_featured: false,
            is_internal: false,
            is_trending: false,
            is_verified: false,
            sponsored_rank: None,
            featured_rank: None,
            view_count: 0,
            click_count: 0,
            save_count: 0,
            review_count: 0,
            average_rating: 0.0,
            created_at,
            rank_score: 0.0,
        }
    }

    /// Data-entry boundary check. The scorer assumes snapshots that pass this.
    pub fn validate(&self) -> Result<()> {
        if !self.average_rating.is_finite() || !(0.0..=MAX_RATING).contains(&self.average_rating)
        {
            return Err(RankingError::invalid_tool(format!(
                "tool {}: average_rating {} outside [0, 5]",
                self.id, self.average_rating
            )));
        }
        check_override_rank(self.id, "sponsored_rank", self.sponsored_rank)?;
        check_override_rank(self.id, "featured_rank", self.featured_rank)?;
        Ok(())
    }
}

pub(crate) fn check_override_rank(id: Uuid, field: &str, rank: Option<u32>) -> Result<()> {
    match rank {
        Some(0) => Err(RankingError::invalid_tool(format!(
            "tool {id}: {field} must be >= 1"
        ))),
        _ => Ok(()),
    }
}
