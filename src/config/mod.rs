// src/config/mod.rs
//! Ranking configuration: the parameter set, the active-config registry and
//! file loading.

pub mod loader;
pub mod ranking;
pub mod registry;

pub use loader::{load_config_default, load_config_from, ENV_RANKING_CONFIG_PATH};
pub use ranking::{RankingConfig, RankingConfigUpdate, RankingWeights};
pub use registry::ConfigRegistry;
