// src/config/loader.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::ranking::RankingConfig;

pub const ENV_RANKING_CONFIG_PATH: &str = "RANKING_CONFIG_PATH";
pub const DEFAULT_RANKING_CONFIG_TOML: &str = "config/ranking.toml";
pub const DEFAULT_RANKING_CONFIG_JSON: &str = "config/ranking.json";

/// Load a ranking config from an explicit path. Supports TOML or JSON formats.
pub fn load_config_from(path: &Path) -> Result<RankingConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading ranking config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing ranking config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validating ranking config {}", path.display()))?;
    Ok(cfg)
}

/// Resolve the config file to use:
/// 1) $RANKING_CONFIG_PATH
/// 2) config/ranking.toml
/// 3) config/ranking.json
///
/// `None` means no file exists and the built-in default applies.
pub fn resolve_config_path() -> Result<Option<PathBuf>> {
    if let Ok(p) = std::env::var(ENV_RANKING_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(Some(pb));
        }
        return Err(anyhow!(
            "{ENV_RANKING_CONFIG_PATH} points to non-existent path {}",
            pb.display()
        ));
    }
    for candidate in [DEFAULT_RANKING_CONFIG_TOML, DEFAULT_RANKING_CONFIG_JSON] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return Ok(Some(pb));
        }
    }
    Ok(None)
}

/// Load using env var + fallbacks, synthesizing the default when no file exists.
pub fn load_config_default() -> Result<RankingConfig> {
    match resolve_config_path()? {
        Some(path) => load_config_from(&path),
        None => {
            warn!(target: "ranking", "no ranking config file found, using built-in defaults");
            Ok(RankingConfig::default())
        }
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<RankingConfig> {
    // JSON is unambiguous from the first byte; everything else is tried as TOML.
    let looks_json = hint_ext == "json" || s.trim_start().starts_with('{');
    if looks_json {
        return serde_json::from_str(s).map_err(|e| anyhow!("invalid JSON ranking config: {e}"));
    }
    toml::from_str(s).map_err(|e| anyhow!("invalid TOML ranking config: {e}"))
}
