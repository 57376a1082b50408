// src/config/registry.rs
//! Named ranking configs with exactly one active at a time.
//!
//! Readers get an `Arc` snapshot of the active config and score with it for
//! the whole request; a concurrent admin update never changes a config that a
//! request is already holding.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use metrics::counter;
use tracing::info;

use super::ranking::{RankingConfig, RankingConfigUpdate, DEFAULT_CONFIG_NAME};
use crate::error::{RankingError, Result};

#[derive(Debug, Default)]
pub struct ConfigRegistry {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    configs: BTreeMap<String, Arc<RankingConfig>>,
    active: Option<String>,
}

impl Inner {
    fn active(&self) -> Option<Arc<RankingConfig>> {
        self.active
            .as_ref()
            .and_then(|name| self.configs.get(name))
            .cloned()
    }

    /// Active config, else a registered `default`, else the built-in default.
    fn effective(&self) -> Arc<RankingConfig> {
        self.active()
            .or_else(|| self.configs.get(DEFAULT_CONFIG_NAME).cloned())
            .unwrap_or_else(|| Arc::new(RankingConfig::default()))
    }
}

impl ConfigRegistry {
    /// Empty registry; `active()` synthesizes the default until something is activated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with one config, already active.
    pub fn with_active(config: RankingConfig) -> Result<Self> {
        let reg = Self::new();
        reg.install(config)?;
        Ok(reg)
    }

    /// Active config. Until one is activated this is the registered
    /// `default` entry if there is one, otherwise the built-in default.
    pub fn active(&self) -> Arc<RankingConfig> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.effective()
    }

    pub fn active_name(&self) -> Option<String> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.active.clone()
    }

    pub fn names(&self) -> Vec<String> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.configs.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<RankingConfig>> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.configs.get(name).cloned()
    }

    /// Register (or replace) a config without changing which one is active.
    pub fn insert(&self, config: RankingConfig) -> Result<()> {
        config.validate()?;
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard
            .configs
            .insert(config.name.clone(), Arc::new(config));
        Ok(())
    }

    /// Make `name` the single active config.
    pub fn activate(&self, name: &str) -> Result<Arc<RankingConfig>> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let cfg = guard
            .configs
            .get(name)
            .cloned()
            .ok_or_else(|| RankingError::UnknownConfig(name.to_string()))?;
        guard.active = Some(name.to_string());
        drop(guard);

        info!(target: "ranking", config = %cfg.name, version = cfg.version, "ranking config activated");
        counter!("ranking_config_updates_total").increment(1);
        Ok(cfg)
    }

    /// Register `config` and activate it in one step (used by file reloads).
    ///
    /// Replacing a config of the same name never moves its version backwards:
    /// the result is at least one past the replaced entry's version.
    pub fn install(&self, mut config: RankingConfig) -> Result<Arc<RankingConfig>> {
        config.validate()?;
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = guard.configs.get(&config.name) {
            config.version = config.version.max(prev.version.saturating_add(1));
        }
        let cfg = Arc::new(config);
        guard.configs.insert(cfg.name.clone(), cfg.clone());
        guard.active = Some(cfg.name.clone());
        drop(guard);

        info!(target: "ranking", config = %cfg.name, version = cfg.version, "ranking config installed");
        counter!("ranking_config_updates_total").increment(1);
        Ok(cfg)
    }

    /// Apply a partial update to the active config. When nothing is active yet,
    /// the update applies to what `active()` would return, and the result
    /// gets registered and activated.
    pub fn update_active(&self, update: &RankingConfigUpdate) -> Result<Arc<RankingConfig>> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let base = guard.effective();
        let next = update.apply_to(&base)?;

        if next.name != base.name && guard.configs.contains_key(&next.name) {
            return Err(RankingError::invalid_config(format!(
                "a config named '{}' already exists",
                next.name
            )));
        }

        guard.configs.remove(&base.name);
        let next = Arc::new(next);
        guard.configs.insert(next.name.clone(), next.clone());
        guard.active = Some(next.name.clone());
        drop(guard);

        info!(
            target: "ranking",
            config = %next.name,
            version = next.version,
            "ranking config updated"
        );
        counter!("ranking_config_updates_total").increment(1);
        Ok(next)
    }
}
