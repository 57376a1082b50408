// src/config/ranking.rs
//! Ranking configuration: term weights, decay windows and thresholds.
//!
//! TOML shape (every key optional, missing keys take the defaults below):
//! ```toml
//! name = "default"
//! freshness_decay_days = 30
//! engagement_decay_days = 7
//! min_reviews_for_score = 5
//! trending_threshold = 100
//!
//! [weights]
//! sponsored = 100.0
//! featured = 50.0
//! internal = 80.0
//! engagement = 30.0
//! reviews = 20.0
//! freshness = 10.0
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{RankingError, Result};

pub const DEFAULT_CONFIG_NAME: &str = "default";

fn default_name() -> String {
    DEFAULT_CONFIG_NAME.to_string()
}
fn default_version() -> u64 {
    1
}
fn default_freshness_decay_days() -> u32 {
    30
}
fn default_engagement_decay_days() -> u32 {
    7
}
fn default_min_reviews_for_score() -> u32 {
    5
}
fn default_trending_threshold() -> u64 {
    100
}

/// Per-term weights. Defaults encode the intended priority order:
/// sponsored > internal > featured > engagement > reviews > freshness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub sponsored: f64,
    pub featured: f64,
    pub internal: f64,
    pub engagement: f64,
    pub reviews: f64,
    pub freshness: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            sponsored: 100.0,
            featured: 50.0,
            internal: 80.0,
            engagement: 30.0,
            reviews: 20.0,
            freshness: 10.0,
        }
    }
}

impl RankingWeights {
    fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("sponsored", self.sponsored),
            ("featured", self.featured),
            ("internal", self.internal),
            ("engagement", self.engagement),
            ("reviews", self.reviews),
            ("freshness", self.freshness),
        ]
    }
}

/// Named, versioned parameter set injected into every scoring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Bumped on every accepted update.
    #[serde(default = "default_version")]
    pub version: u64,
    #[serde(default)]
    pub weights: RankingWeights,
    /// Freshness half-life in days.
    #[serde(default = "default_freshness_decay_days")]
    pub freshness_decay_days: u32,
    /// Trending lookback window in days.
    #[serde(default = "default_engagement_decay_days")]
    pub engagement_decay_days: u32,
    /// Prior sample size of the Bayesian review average.
    #[serde(default = "default_min_reviews_for_score")]
    pub min_reviews_for_score: u32,
    /// Click count at which a tool gets promoted to trending.
    #[serde(default = "default_trending_threshold")]
    pub trending_threshold: u64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: Some("Default ranking configuration".to_string()),
            version: default_version(),
            weights: RankingWeights::default(),
            freshness_decay_days: default_freshness_decay_days(),
            engagement_decay_days: default_engagement_decay_days(),
            min_reviews_for_score: default_min_reviews_for_score(),
            trending_threshold: default_trending_threshold(),
        }
    }
}

impl RankingConfig {
    /// Default parameters under another name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            ..Self::default()
        }
    }

    /// Reject values the scorer is not defined for.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RankingError::invalid_config("name must not be empty"));
        }
        for (field, w) in self.weights.named() {
            if !w.is_finite() || w < 0.0 {
                return Err(RankingError::invalid_config(format!(
                    "weight {field} must be a non-negative number, got {w}"
                )));
            }
        }
        if self.freshness_decay_days < 1 {
            return Err(RankingError::invalid_config(
                "freshness_decay_days must be >= 1",
            ));
        }
        if self.engagement_decay_days < 1 {
            return Err(RankingError::invalid_config(
                "engagement_decay_days must be >= 1",
            ));
        }
        Ok(())
    }
}

/// Admin-side partial update. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfigUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub weight_sponsored: Option<f64>,
    pub weight_featured: Option<f64>,
    pub weight_internal: Option<f64>,
    pub weight_engagement: Option<f64>,
    pub weight_reviews: Option<f64>,
    pub weight_freshness: Option<f64>,
    pub freshness_decay_days: Option<u32>,
    pub engagement_decay_days: Option<u32>,
    pub min_reviews_for_score: Option<u32>,
    pub trending_threshold: Option<u64>,
}

impl RankingConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Produce the updated config; `base` is left untouched if validation fails.
    pub fn apply_to(&self, base: &RankingConfig) -> Result<RankingConfig> {
        let mut next = base.clone();

        if let Some(name) = &self.name {
            next.name = name.trim().to_string();
        }
        if let Some(desc) = &self.description {
            next.description = Some(desc.clone());
        }

        let w = &mut next.weights;
        for (slot, value) in [
            (&mut w.sponsored, self.weight_sponsored),
            (&mut w.featured, self.weight_featured),
            (&mut w.internal, self.weight_internal),
            (&mut w.engagement, self.weight_engagement),
            (&mut w.reviews, self.weight_reviews),
            (&mut w.freshness, self.weight_freshness),
        ] {
            if let Some(v) = value {
                *slot = v;
            }
        }

        if let Some(v) = self.freshness_decay_days {
            next.freshness_decay_days = v;
        }
        if let Some(v) = self.engagement_decay_days {
            next.engagement_decay_days = v;
        }
        if let Some(v) = self.min_reviews_for_score {
            next.min_reviews_for_score = v;
        }
        if let Some(v) = self.trending_threshold {
            next.trending_threshold = v;
        }

        next.validate()?;
        if !self.is_empty() {
            next.version = base.version.saturating_add(1);
        }
        Ok(next)
    }
}
