//! Search orchestration over two pluggable retrieval collaborators.
//!
//! The keyword and semantic backends are black boxes returning tool ids in
//! their own rank order. `HybridSearcher` queries one or both, fuses hybrid
//! results with RRF and applies offset/limit paging.

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::fusion::RrfFusion;
use crate::ordering::{paginate, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Keyword,
    Semantic,
    #[default]
    Hybrid,
}

impl SearchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::Keyword => "keyword",
            SearchMode::Semantic => "semantic",
            SearchMode::Hybrid => "hybrid",
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub mode: SearchMode,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: None,
            tags: Vec::new(),
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
            mode: SearchMode::default(),
        }
    }

    pub fn mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}

/// One page of ids plus the size of the result list it was cut from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub ids: Vec<Uuid>,
    pub total: usize,
}

/// Keyword matches: at most `fetch` ids, best first, plus the number of
/// tools matching the query overall.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordHits {
    pub ids: Vec<Uuid>,
    pub total: usize,
}

/// Substring/tag matching backend.
#[async_trait]
pub trait KeywordSearch: Send + Sync {
    async fn keyword_search(&self, query: &SearchQuery, fetch: usize) -> Result<KeywordHits>;
}

/// Embedding similarity backend. Returns at most `fetch` ids, most similar first.
#[async_trait]
pub trait SemanticSearch: Send + Sync {
    async fn semantic_search(&self, query: &SearchQuery, fetch: usize) -> Result<Vec<Uuid>>;
}

#[derive(Clone)]
pub struct HybridSearcher {
    keyword: Arc<dyn KeywordSearch>,
    semantic: Arc<dyn SemanticSearch>,
    fusion: RrfFusion,
}

impl HybridSearcher {
    pub fn new(keyword: Arc<dyn KeywordSearch>, semantic: Arc<dyn SemanticSearch>) -> Self {
        Self {
            keyword,
            semantic,
            fusion: RrfFusion::default(),
        }
    }

    pub fn with_fusion(mut self, fusion: RrfFusion) -> Self {
        self.fusion = fusion;
        self
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        let limit = query.limit.clamp(1, MAX_PAGE_LIMIT);
        let window = query.offset.saturating_add(limit);
        counter!("search_requests_total", "mode" => query.mode.as_str()).increment(1);

        // `total` is the full match count for keyword mode and the fetched
        // list length otherwise.
        let (ranked, total) = match query.mode {
            SearchMode::Keyword => {
                let hits = self.keyword.keyword_search(query, window).await?;
                (hits.ids, hits.total)
            }
            SearchMode::Semantic => {
                let ids = self.semantic.semantic_search(query, window).await?;
                let total = ids.len();
                (ids, total)
            }
            SearchMode::Hybrid => {
                // Over-fetch from both sides so fusion has candidates to reorder.
                let fetch = window.saturating_mul(2);
                let (kw, sem) = tokio::join!(
                    self.keyword.keyword_search(query, fetch),
                    self.semantic.semantic_search(query, fetch)
                );
                let (kw, sem) = (kw?, sem?);
                debug!(
                    target: "ranking",
                    keyword_hits = kw.ids.len(),
                    keyword_total = kw.total,
                    semantic_hits = sem.len(),
                    k = self.fusion.k,
                    "fusing hybrid search results"
                );
                let fused = self.fusion.fuse(&kw.ids, &sem);
                let total = fused.len();
                (fused, total)
            }
        };

        Ok(SearchPage {
            ids: paginate(&ranked, query.offset, limit).to_vec(),
            total,
        })
    }
}

/// Catalog fields the in-memory keyword backend matches on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedTool {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rank_score: f64,
}

/// In-memory keyword backend: case-insensitive substring over name and
/// description or an exact tag hit, ordered by `rank_score` desc.
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    tools: Vec<IndexedTool>,
}

impl KeywordIndex {
    pub fn new(mut tools: Vec<IndexedTool>) -> Self {
        tools.sort_by(|a, b| b.rank_score.total_cmp(&a.rank_score));
        Self { tools }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn matches(tool: &IndexedTool, query: &SearchQuery, needle: &str) -> bool {
        let text_hit = tool.name.to_lowercase().contains(needle)
            || tool.description.to_lowercase().contains(needle)
            || tool.tags.iter().any(|t| t.to_lowercase() == needle);
        if !text_hit {
            return false;
        }
        if let Some(cat) = &query.category {
            match &tool.category {
                Some(c) if c.eq_ignore_ascii_case(cat) => {}
                _ => return false,
            }
        }
        query.tags.is_empty()
            || query
                .tags
                .iter()
                .any(|qt| tool.tags.iter().any(|t| t.eq_ignore_ascii_case(qt)))
    }
}

#[async_trait]
impl KeywordSearch for KeywordIndex {
    async fn keyword_search(&self, query: &SearchQuery, fetch: usize) -> Result<KeywordHits> {
        let needle = query.text.trim().to_lowercase();
        let mut hits = KeywordHits::default();
        for tool in self.tools.iter().filter(|t| Self::matches(t, query, &needle)) {
            if hits.ids.len() < fetch {
                hits.ids.push(tool.id);
            }
            hits.total += 1;
        }
        Ok(hits)
    }
}
