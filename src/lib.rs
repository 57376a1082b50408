// src/lib.rs
// Public library surface for the service binary and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod fusion;
pub mod lifecycle;
pub mod metrics;
pub mod ordering;
pub mod scoring;
pub mod search;
pub mod tool;
pub mod trending;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::{ConfigRegistry, RankingConfig, RankingConfigUpdate, RankingWeights};
pub use crate::error::{RankingError, Result};
pub use crate::fusion::{fuse, fuse_candidates, Candidate, FusedHit, RrfFusion, DEFAULT_RRF_K};
pub use crate::lifecycle::{apply_ranking_update, record_engagement, EngagementKind, ToolRankingUpdate};
pub use crate::ordering::{paginate, SortStrategy};
pub use crate::scoring::{bulk_recalculate, explain, rescore, score, ScoreBreakdown};
pub use crate::search::{
    HybridSearcher, KeywordHits, KeywordSearch, SearchMode, SearchPage, SearchQuery, SemanticSearch,
};
pub use crate::tool::ToolSnapshot;
pub use crate::trending::detect_trending;
