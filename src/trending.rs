//! Trending detection: batch pass that promotes tools whose click count
//! reaches `trending_threshold`.
//!
//! Promotion is one-way. A tool whose clicks later fall behind its peers keeps
//! the flag until an admin clears it through a ranking update.

use metrics::counter;
use tracing::info;
use uuid::Uuid;

use crate::config::RankingConfig;
use crate::tool::ToolSnapshot;

/// Flag newly trending tools and return their ids in input order.
///
/// Scores are left alone; callers persisting the flag rescore afterwards.
pub fn detect_trending(tools: &mut [ToolSnapshot], config: &RankingConfig) -> Vec<Uuid> {
    let mut promoted = Vec::new();
    for tool in tools.iter_mut() {
        if !tool.is_trending && tool.click_count >= config.trending_threshold {
            tool.is_trending = true;
            promoted.push(tool.id);
        }
    }

    if !promoted.is_empty() {
        counter!("ranking_trending_promoted_total").increment(promoted.len() as u64);
    }
    info!(
        target: "ranking",
        scanned = tools.len(),
        promoted = promoted.len(),
        threshold = config.trending_threshold,
        "trending detection finished"
    );
    promoted
}
