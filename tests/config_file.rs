// tests/config_file.rs
use std::{env, fs};

use tool_ranking_engine::config::{
    load_config_default, load_config_from, ConfigRegistry, RankingConfigUpdate,
    ENV_RANKING_CONFIG_PATH,
};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("ranking.toml");
    fs::write(
        &p_toml,
        r#"
name = "holiday"
min_reviews_for_score = 3

[weights]
sponsored = 150.0
"#,
    )
    .unwrap();
    let cfg = load_config_from(&p_toml).unwrap();
    assert_eq!(cfg.name, "holiday");
    assert_eq!(cfg.min_reviews_for_score, 3);
    assert_eq!(cfg.weights.sponsored, 150.0);
    // Omitted fields keep their defaults.
    assert_eq!(cfg.weights.featured, 50.0);
    assert_eq!(cfg.freshness_decay_days, 30);

    let p_json = dir.path().join("ranking.json");
    fs::write(
        &p_json,
        r#"{"name":"json-cfg","trending_threshold":250,"weights":{"freshness":0.0}}"#,
    )
    .unwrap();
    let cj = load_config_from(&p_json).unwrap();
    assert_eq!(cj.name, "json-cfg");
    assert_eq!(cj.trending_threshold, 250);
    assert_eq!(cj.weights.freshness, 0.0);
}

#[test]
fn invalid_file_is_rejected_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("ranking.toml");
    fs::write(&p, "name = \"bad\"\nfreshness_decay_days = 0\n").unwrap();

    let err = load_config_from(&p).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("freshness_decay_days"), "got: {msg}");
    assert!(msg.contains("ranking.toml"), "got: {msg}");
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    env::remove_var(ENV_RANKING_CONFIG_PATH);

    // 1) Nothing on disk -> built-in default
    let cfg = load_config_default().unwrap();
    assert_eq!(cfg.name, "default");
    assert_eq!(cfg.weights.sponsored, 100.0);

    // 2) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("ranking.toml"), r#"name = "from-toml""#).unwrap();
    assert_eq!(load_config_default().unwrap().name, "from-toml");

    // 3) Env var wins
    let p_env = tmp.path().join("override.json");
    fs::write(&p_env, r#"{"name":"from-env"}"#).unwrap();
    env::set_var(ENV_RANKING_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(load_config_default().unwrap().name, "from-env");

    // 4) Env var pointing nowhere is an error, not a silent fallback
    env::set_var(
        ENV_RANKING_CONFIG_PATH,
        tmp.path().join("missing.toml").display().to_string(),
    );
    assert!(load_config_default().is_err());

    env::remove_var(ENV_RANKING_CONFIG_PATH);
    env::set_current_dir(&old).unwrap();
}

#[test]
fn reloading_file_config_never_moves_version_backwards() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("ranking.toml");
    fs::write(&p, "name = \"default\"\ntrending_threshold = 40\n").unwrap();

    let registry = ConfigRegistry::new();
    assert_eq!(registry.active().name, "default");

    // Admin edit moves the active config to version 2.
    let patched = registry
        .update_active(&RankingConfigUpdate {
            weight_sponsored: Some(120.0),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(patched.version, 2);

    // The file declares no version (1), yet the reload lands on 3.
    let loaded = load_config_from(&p).unwrap();
    assert_eq!(loaded.version, 1);
    let installed = registry.install(loaded).unwrap();
    assert_eq!(installed.version, 3);
    assert_eq!(installed.trending_threshold, 40);
    assert_eq!(installed.weights.sponsored, 100.0);

    let active = registry.active();
    assert_eq!(active.version, 3);
    assert_eq!(active.trending_threshold, 40);
    assert_eq!(registry.active_name().as_deref(), Some("default"));
}
