use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{load_config_default, ConfigRegistry, RankingConfig, RankingConfigUpdate};
use crate::error::RankingError;
use crate::fusion::{positions, FusedHit, RrfFusion, DEFAULT_RRF_K};
use crate::ordering::{paginate, SortStrategy, DEFAULT_PAGE_LIMIT};
use crate::scoring::{bulk_recalculate, explain, ScoreBreakdown};
use crate::tool::ToolSnapshot;
use crate::trending::detect_trending;

pub const ENV_RRF_K: &str = "RRF_K";

/// Shared state: the active-config registry and the service's fusion constant.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConfigRegistry>,
    pub fusion: RrfFusion,
}

impl AppState {
    pub fn new(registry: ConfigRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            fusion: RrfFusion::default(),
        }
    }

    /// Config from `$RANKING_CONFIG_PATH` / `config/ranking.*` (or defaults),
    /// RRF constant from `$RRF_K`.
    pub fn from_env() -> anyhow::Result<Self> {
        let cfg = load_config_default()?;
        let registry = ConfigRegistry::with_active(cfg)?;
        let k = parse_rrf_k(std::env::var(ENV_RRF_K).ok());
        Ok(Self {
            registry: Arc::new(registry),
            fusion: RrfFusion::new(k),
        })
    }
}

// parse optional RRF constant; anything unparsable or zero falls back to the default
fn parse_rrf_k(raw: Option<String>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|k| *k > 0)
        .unwrap_or(DEFAULT_RRF_K)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/ranking/config", get(get_config).patch(patch_config))
        .route("/ranking/config/reload", post(reload_config))
        .route("/ranking/score", post(score_tool))
        .route("/ranking/recalculate", post(recalculate))
        .route("/ranking/trending", post(trending))
        .route("/tools/sorted", post(sorted_tools))
        .route("/search/fuse", post(fuse_lists))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for RankingError {
    fn into_response(self) -> Response {
        let status = match &self {
            RankingError::InvalidConfig(_)
            | RankingError::InvalidTool(_)
            | RankingError::UnknownSortStrategy(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RankingError::UnknownConfig(_) => StatusCode::NOT_FOUND,
            RankingError::Search(_) => StatusCode::BAD_GATEWAY,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn get_config(State(state): State<AppState>) -> Json<RankingConfig> {
    Json(state.registry.active().as_ref().clone())
}

async fn patch_config(
    State(state): State<AppState>,
    Json(update): Json<RankingConfigUpdate>,
) -> Result<Json<RankingConfig>, RankingError> {
    let cfg = state.registry.update_active(&update)?;
    Ok(Json(cfg.as_ref().clone()))
}

async fn reload_config(State(state): State<AppState>) -> Result<Json<RankingConfig>, RankingError> {
    let fresh = load_config_default().map_err(|e| {
        warn!(target: "ranking", "ranking config reload failed: {e:#}");
        RankingError::invalid_config(format!("{e:#}"))
    })?;
    let cfg = state.registry.install(fresh)?;
    info!(target: "ranking", config = %cfg.name, "ranking config reloaded from file");
    Ok(Json(cfg.as_ref().clone()))
}

#[derive(Deserialize)]
struct ScoreReq {
    tool: ToolSnapshot,
    #[serde(default)]
    now: Option<DateTime<Utc>>, // defaults to the request time
}

#[derive(Serialize)]
struct ScoreResp {
    id: Uuid,
    config: String,
    config_version: u64,
    breakdown: ScoreBreakdown,
}

async fn score_tool(
    State(state): State<AppState>,
    Json(body): Json<ScoreReq>,
) -> Result<Json<ScoreResp>, RankingError> {
    body.tool.validate()?;
    let cfg = state.registry.active();
    let now = body.now.unwrap_or_else(Utc::now);
    Ok(Json(ScoreResp {
        id: body.tool.id,
        config: cfg.name.clone(),
        config_version: cfg.version,
        breakdown: explain(&body.tool, &cfg, now),
    }))
}

#[derive(Deserialize)]
struct BatchReq {
    tools: Vec<ToolSnapshot>,
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

impl BatchReq {
    /// Either every snapshot is valid or the whole batch is rejected.
    fn validated(self) -> Result<(Vec<ToolSnapshot>, DateTime<Utc>), RankingError> {
        for t in &self.tools {
            t.validate()?;
        }
        Ok((self.tools, self.now.unwrap_or_else(Utc::now)))
    }
}

async fn recalculate(
    State(state): State<AppState>,
    Json(body): Json<BatchReq>,
) -> Result<Json<Vec<ToolSnapshot>>, RankingError> {
    let (mut tools, now) = body.validated()?;
    let cfg = state.registry.active();
    bulk_recalculate(&mut tools, &cfg, now);
    Ok(Json(tools))
}

#[derive(Serialize)]
struct TrendingResp {
    promoted: Vec<Uuid>,
    tools: Vec<ToolSnapshot>,
}

async fn trending(
    State(state): State<AppState>,
    Json(body): Json<BatchReq>,
) -> Result<Json<TrendingResp>, RankingError> {
    let (mut tools, now) = body.validated()?;
    let cfg = state.registry.active();
    let promoted = detect_trending(&mut tools, &cfg);
    // Promotion changes the trending term; hand back consistent scores.
    bulk_recalculate(&mut tools, &cfg, now);
    Ok(Json(TrendingResp { promoted, tools }))
}

#[derive(Deserialize)]
struct SortParams {
    #[serde(default)]
    ranking_type: Option<String>,
    #[serde(default)]
    offset: Option<usize>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Serialize)]
struct ListingPage {
    ranking_type: SortStrategy,
    total: usize,
    tools: Vec<ToolSnapshot>,
}

async fn sorted_tools(
    Query(params): Query<SortParams>,
    Json(mut tools): Json<Vec<ToolSnapshot>>,
) -> Result<Json<ListingPage>, RankingError> {
    let strategy = match params.ranking_type.as_deref() {
        Some(s) => s.parse::<SortStrategy>()?,
        None => SortStrategy::Default,
    };
    strategy.sort(&mut tools);
    let page = paginate(
        &tools,
        params.offset.unwrap_or(0),
        params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
    )
    .to_vec();
    Ok(Json(ListingPage {
        ranking_type: strategy,
        total: tools.len(),
        tools: page,
    }))
}

#[derive(Deserialize)]
struct FuseReq {
    #[serde(default)]
    keyword: Vec<Uuid>,
    #[serde(default)]
    semantic: Vec<Uuid>,
    #[serde(default)]
    k: Option<u32>,
}

async fn fuse_lists(
    State(state): State<AppState>,
    Json(body): Json<FuseReq>,
) -> Result<Json<Vec<FusedHit<Uuid>>>, RankingError> {
    let fusion = match body.k {
        Some(0) => return Err(RankingError::invalid_config("k must be >= 1")),
        Some(k) => RrfFusion::new(k),
        None => state.fusion,
    };
    Ok(Json(fusion.fuse_detailed(
        &positions(&body.keyword),
        &positions(&body.semantic),
    )))
}
