//! Score lifecycle: the events after which a tool's `rank_score` is recomputed.
//!
//! - an engagement event (view / click / save) is recorded,
//! - an admin edits ranking flags or manual overrides.
//!
//! Bulk recalculation and config changes go through `scoring::bulk_recalculate`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RankingConfig;
use crate::error::Result;
use crate::scoring::rescore;
use crate::tool::{check_override_rank, ToolSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    View,
    Click,
    Save,
}

/// Bump the matching counter and rescore. Returns the new score.
pub fn record_engagement(
    tool: &mut ToolSnapshot,
    kind: EngagementKind,
    config: &RankingConfig,
    now: DateTime<Utc>,
) -> f64 {
    let counter = match kind {
        EngagementKind::View => &mut tool.view_count,
        EngagementKind::Click => &mut tool.click_count,
        EngagementKind::Save => &mut tool.save_count,
    };
    *counter = counter.saturating_add(1);

    let s = rescore(tool, config, now);
    debug!(target: "ranking", tool = %tool.id, ?kind, score = s, "engagement recorded");
    s
}

/// Admin edit of ranking flags and overrides. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolRankingUpdate {
    pub is_sponsored: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_internal: Option<bool>,
    pub is_trending: Option<bool>,
    pub is_verified: Option<bool>,
    pub sponsored_rank: Option<u32>,
    pub featured_rank: Option<u32>,
}

/// Apply an admin ranking edit and rescore. The tool is untouched when the
/// update is rejected.
pub fn apply_ranking_update(
    tool: &mut ToolSnapshot,
    update: &ToolRankingUpdate,
    config: &RankingConfig,
    now: DateTime<Utc>,
) -> Result<f64> {
    check_override_rank(tool.id, "sponsored_rank", update.sponsored_rank)?;
    check_override_rank(tool.id, "featured_rank", update.featured_rank)?;

    for (slot, value) in [
        (&mut tool.is_sponsored, update.is_sponsored),
        (&mut tool.is_featured, update.is_featured),
        (&mut tool.is_internal, update.is_internal),
        (&mut tool.is_trending, update.is_trending),
        (&mut tool.is_verified, update.is_verified),
    ] {
        if let Some(v) = value {
            *slot = v;
        }
    }
    if update.sponsored_rank.is_some() {
        tool.sponsored_rank = update.sponsored_rank;
    }
    if update.featured_rank.is_some() {
        tool.featured_rank = update.featured_rank;
    }

    let s = rescore(tool, config, now);
    debug!(target: "ranking", tool = %tool.id, score = s, "ranking flags updated");
    Ok(s)
}
