//! Tool ranking service binary entrypoint.
//! Boots the Axum HTTP server, wiring the ranking routes, shared config
//! registry, and the Prometheus `/metrics` endpoint.

use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tool_ranking_engine::api::{self, AppState};
use tool_ranking_engine::metrics::Metrics;

/// Compact tracing logs (`LOG_FORMAT=json` for JSON lines); `RUST_LOG`
/// overrides the default filter.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ranking=info,warn"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    // Shuttle may have installed a subscriber already; keep theirs in that case.
    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // This enables RANKING_CONFIG_PATH / RRF_K from .env.
    let _ = dotenvy::dotenv();

    init_tracing();

    let state = AppState::from_env()?;
    info!(
        target: "ranking",
        config = %state.registry.active().name,
        k = state.fusion.k,
        "ranking service starting"
    );

    let mut router = api::router(state);
    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => warn!("metrics disabled: {e:#}"),
    }

    Ok(router.into())
}
