//! Reciprocal rank fusion (RRF) of a keyword ranking and a semantic ranking.
//!
//! Each position contributes `1 / (k + rank + 1)` (zero-based `rank`) and the
//! contributions of an id are summed across both lists. Only positions are
//! used, so the two retrieval methods never need comparable raw scores; ids
//! found by both methods get both contributions and rise to the top.
//!
//! Precondition: an id appears at most once per list. Duplicates inside one
//! list are not collapsed and would be counted once per occurrence.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Standard RRF damping constant. Lower values favour the top of each list,
/// higher values flatten the curve toward the long tail.
pub const DEFAULT_RRF_K: u32 = 60;

/// A ranked entry from one retrieval source; `rank` is zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate<I> {
    pub id: I,
    pub rank: usize,
}

impl<I> Candidate<I> {
    pub fn new(id: I, rank: usize) -> Self {
        Self { id, rank }
    }
}

/// One fused result with the per-source positions that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedHit<I> {
    pub id: I,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_rank: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_rank: Option<usize>,
}

/// RRF with a tunable `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrfFusion {
    pub k: u32,
}

impl Default for RrfFusion {
    fn default() -> Self {
        Self { k: DEFAULT_RRF_K }
    }
}

impl RrfFusion {
    pub fn new(k: u32) -> Self {
        Self { k }
    }

    /// Contribution of one position.
    pub fn contribution(&self, rank: usize) -> f64 {
        1.0 / (f64::from(self.k) + rank as f64 + 1.0)
    }

    /// Fuse with explicit per-candidate ranks.
    ///
    /// Output is sorted by fused score descending; equal scores keep the order
    /// in which ids were first seen (keyword list first, then semantic).
    pub fn fuse_detailed<I>(&self, keyword: &[Candidate<I>], semantic: &[Candidate<I>]) -> Vec<FusedHit<I>>
    where
        I: Eq + Hash + Clone,
    {
        let mut slots: HashMap<I, usize> = HashMap::new();
        let mut hits: Vec<FusedHit<I>> = Vec::new();

        let mut add = |c: &Candidate<I>, from_keyword: bool| {
            let idx = *slots.entry(c.id.clone()).or_insert_with(|| {
                hits.push(FusedHit {
                    id: c.id.clone(),
                    score: 0.0,
                    keyword_rank: None,
                    semantic_rank: None,
                });
                hits.len() - 1
            });
            let hit = &mut hits[idx];
            hit.score += self.contribution(c.rank);
            let slot = if from_keyword {
                &mut hit.keyword_rank
            } else {
                &mut hit.semantic_rank
            };
            if slot.is_none() {
                *slot = Some(c.rank);
            }
        };

        for c in keyword {
            add(c, true);
        }
        for c in semantic {
            add(c, false);
        }

        // Stable: ties stay in first-seen order.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits
    }

    /// Fuse two ordered id lists; list position is the rank.
    pub fn fuse<I>(&self, keyword: &[I], semantic: &[I]) -> Vec<I>
    where
        I: Eq + Hash + Clone,
    {
        self.fuse_detailed(&positions(keyword), &positions(semantic))
            .into_iter()
            .map(|h| h.id)
            .collect()
    }
}

/// `fuse` with an explicit `k`.
pub fn fuse<I>(list_a: &[I], list_b: &[I], k: u32) -> Vec<I>
where
    I: Eq + Hash + Clone,
{
    RrfFusion::new(k).fuse(list_a, list_b)
}

/// Fuse candidates that carry their own source ranks.
pub fn fuse_candidates<I>(list_a: &[Candidate<I>], list_b: &[Candidate<I>], k: u32) -> Vec<I>
where
    I: Eq + Hash + Clone,
{
    RrfFusion::new(k)
        .fuse_detailed(list_a, list_b)
        .into_iter()
        .map(|h| h.id)
        .collect()
}

/// Turn an ordered list into candidates ranked by position.
pub fn positions<I: Clone>(ids: &[I]) -> Vec<Candidate<I>> {
    ids.iter()
        .enumerate()
        .map(|(rank, id)| Candidate::new(id.clone(), rank))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_source_keeps_order() {
        assert_eq!(fuse::<&str>(&[], &["x", "y"], 60), vec!["x", "y"]);
        assert_eq!(fuse::<&str>(&["x", "y"], &[], 60), vec!["x", "y"]);
        assert!(fuse::<&str>(&[], &[], 60).is_empty());
    }

    #[test]
    fn reversed_lists_favor_endpoints_slightly() {
        // a, c: 1/61 + 1/63; b: 2/62. The endpoint pairs win by a hair.
        let out = fuse(&["a", "b", "c"], &["c", "b", "a"], 60);
        assert_eq!(out, vec!["a", "c", "b"]);

        let detailed = RrfFusion::default()
            .fuse_detailed(&positions(&["a", "b", "c"]), &positions(&["c", "b", "a"]));
        let a = detailed[0].score;
        let b = detailed[2].score;
        assert!((a - (1.0 / 61.0 + 1.0 / 63.0)).abs() < 1e-12);
        assert!((b - 2.0 / 62.0).abs() < 1e-12);
        assert_eq!(detailed[0].keyword_rank, Some(0));
        assert_eq!(detailed[0].semantic_rank, Some(2));
    }

    #[test]
    fn agreement_beats_single_source_at_same_position() {
        let out = fuse(&["shared", "kw_only"], &["shared", "sem_only"], 60);
        assert_eq!(out[0], "shared");
        // kw_only and sem_only tie at 1/62; keyword list was seen first.
        assert_eq!(out[1..], ["kw_only", "sem_only"]);
    }

    #[test]
    fn low_k_is_more_top_heavy() {
        let sharp = RrfFusion::new(1);
        let flat = RrfFusion::new(600);
        let sharp_ratio = sharp.contribution(0) / sharp.contribution(9);
        let flat_ratio = flat.contribution(0) / flat.contribution(9);
        assert!(sharp_ratio > flat_ratio);
    }

    #[test]
    fn explicit_candidate_ranks_are_used() {
        let kw = vec![Candidate::new(7u32, 4), Candidate::new(9u32, 0)];
        let sem = vec![Candidate::new(7u32, 0)];
        let out = fuse_candidates(&kw, &sem, 60);
        assert_eq!(out, vec![7, 9]);
    }

    #[test]
    fn duplicates_within_a_list_double_count() {
        let hits = RrfFusion::default().fuse_detailed(&positions(&["d", "d"]), &[]);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].score - (1.0 / 61.0 + 1.0 / 62.0)).abs() < 1e-12);
        assert_eq!(hits[0].keyword_rank, Some(0));
    }
}
