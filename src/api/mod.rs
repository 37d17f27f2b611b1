// HTTP API routes (player lookup, match and trend coaching, health, metrics)

pub mod pages;

use axum::{
    extract::{Json, MatchedPath, Path, Query, Request, State},
    http::header,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::analysis::match_metrics::MatchMetrics;
use crate::analysis::prompt::{build_match_prompt, build_trend_prompt, MatchPromptInput};
use crate::analysis::trend::{aggregate, MatchSummary};
use crate::analysis::weapons::{rank_weapons, WeaponRanking};
use crate::config::Config;
use crate::error::ApiError;
use crate::llm::LlmClient;
use crate::metrics;
use crate::stats::models::MatchDetail;
use crate::stats::StatsProvider;

// ── Request types ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SearchPlayerRequest {
    pub player_name: String,
    pub platform: Option<String>,
}

#[derive(Deserialize)]
pub struct PlatformParams {
    pub platform: Option<String>,
}

#[derive(Deserialize)]
pub struct AnalyzeParams {
    pub player_id: Option<String>,
    pub platform: Option<String>,
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub stats: Arc<dyn StatsProvider>,
    pub llm: Arc<LlmClient>,
    pub config: Arc<Config>,
}

impl AppState {
    /// The requested shard, or the configured default.
    fn platform(&self, requested: Option<String>) -> String {
        requested
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.config.default_platform.clone())
    }

    /// Weapon ranking for a player, `None` when mastery data is unavailable.
    async fn weapon_ranking(&self, player_id: &str, platform: &str) -> Option<WeaponRanking> {
        let records = self.stats.weapon_mastery(player_id, platform).await?;
        Some(rank_weapons(&records, &self.config.weapon_thresholds))
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(pages::home))
        .route("/search", post(pages::search_form))
        .route("/player/{name}", get(pages::player_profile))
        // Player lookups
        .route("/api/player/search", post(search_player))
        .route("/api/player/{id}/stats", get(get_player_stats))
        .route("/api/player/{id}/matches", get(get_recent_matches))
        .route("/api/player/{id}/weapons", get(get_weapon_ranking))
        // Coaching
        .route(
            "/api/match/{id}/analyze",
            get(analyze_match).post(analyze_match),
        )
        .route("/api/player/{id}/trend-analysis", get(trend_analysis))
        // Ops
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(tag_matched_path))
        .layer(middleware::from_fn(track_requests))
        .with_state(state)
}

/// Metric label for requests that matched no route.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Hand the matched route template to `track_requests` through the response.
async fn tag_matched_path(req: Request, next: Next) -> Response {
    let matched = req.extensions().get::<MatchedPath>().cloned();
    let mut response = next.run(req).await;
    if let Some(matched) = matched {
        response.extensions_mut().insert(matched);
    }
    response
}

/// Log every request and record it in the HTTP metrics, labelled by route
/// template so that arbitrary URLs cannot mint new series.
async fn track_requests(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let endpoint = response
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ENDPOINT.to_string());
    metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), endpoint.as_str(), status.as_str()])
        .inc();
    metrics::HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[endpoint.as_str()])
        .observe(start.elapsed().as_secs_f64());
    tracing::info!(
        "{method} {path} -> {} ({:.0}ms)",
        status.as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    response
}

// ── Ops ───────────────────────────────────────────────────────────────

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

// ── Player lookups ────────────────────────────────────────────────────

async fn search_player(
    State(state): State<AppState>,
    Json(req): Json<SearchPlayerRequest>,
) -> Result<Json<Value>, ApiError> {
    let platform = state.platform(req.platform);
    let player = state
        .stats
        .search_player(&req.player_name, &platform)
        .await
        .ok_or_else(|| ApiError::NotFound("Player not found.".into()))?;

    Ok(Json(json!({
        "player_id": player.id,
        "player_name": player.name,
        "platform": platform,
    })))
}

async fn get_player_stats(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Query(params): Query<PlatformParams>,
) -> Result<Json<Value>, ApiError> {
    let platform = state.platform(params.platform);
    let stats = state
        .stats
        .player_stats(&player_id, &platform)
        .await
        .ok_or_else(|| ApiError::NotFound("Player stats not found.".into()))?;
    Ok(Json(stats))
}

async fn get_recent_matches(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Query(params): Query<PlatformParams>,
) -> Result<Json<Value>, ApiError> {
    let platform = state.platform(params.platform);
    let matches = state
        .stats
        .recent_matches(&player_id, &platform)
        .await
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::NotFound("No matches found.".into()))?;
    Ok(Json(json!({ "matches": matches })))
}

async fn get_weapon_ranking(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Query(params): Query<PlatformParams>,
) -> Result<Json<Value>, ApiError> {
    let platform = state.platform(params.platform);
    let ranking = state
        .weapon_ranking(&player_id, &platform)
        .await
        .ok_or_else(|| ApiError::NotFound("Weapon mastery not found.".into()))?;
    Ok(Json(json!({
        "player_id": player_id,
        "strong": ranking.strong,
        "weak": ranking.weak,
    })))
}

// ── Coaching ──────────────────────────────────────────────────────────

async fn analyze_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Query(params): Query<AnalyzeParams>,
) -> Result<Json<Value>, ApiError> {
    let player_id = params
        .player_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("player_id is required.".into()))?;
    let platform = state.platform(params.platform);
    let doc = state
        .stats
        .match_details(&match_id, &platform)
        .await
        .ok_or_else(|| ApiError::NotFound("Match not found.".into()))?;
    let detail = MatchDetail::from_document(doc)?;

    let player = detail
        .player_stats(&player_id)
        .ok_or_else(|| ApiError::NotFound("Player not found in this match.".into()))?;
    let teammates = detail.teammates_of(&player_id);
    let match_metrics = MatchMetrics::compute(player, &teammates);
    let weapons = state.weapon_ranking(&player_id, &platform).await;

    let prompt = build_match_prompt(&MatchPromptInput {
        info: &detail.info,
        player,
        teammates: &teammates,
        metrics: &match_metrics,
        weapons: weapons.as_ref(),
    });
    tracing::info!(
        "Analysing match {match_id} for {} ({})",
        player_id,
        detail.info.mode.display_name()
    );
    let analysis = state.llm.generate(&prompt).await;

    Ok(Json(json!({
        "match_id": match_id,
        "analysis": analysis,
        "player_stats": player,
        "teammates_count": teammates.len(),
    })))
}

async fn trend_analysis(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Query(params): Query<PlatformParams>,
) -> Result<Json<Value>, ApiError> {
    let platform = state.platform(params.platform);
    let matches = state
        .stats
        .recent_matches(&player_id, &platform)
        .await
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::NotFound("No matches found.".into()))?;

    // One match at a time, in the order the stats API returned them.
    let mut summaries = Vec::with_capacity(matches.len());
    for m in &matches {
        let Some(doc) = state.stats.match_details(&m.id, &platform).await else {
            continue;
        };
        let detail = match MatchDetail::from_document(doc) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("Skipping match {}: {e}", m.id);
                continue;
            }
        };
        if let Some(stats) = detail.player_stats(&player_id) {
            summaries.push(MatchSummary::from(stats));
        }
    }
    if summaries.is_empty() {
        return Err(ApiError::NotFound(
            "No match data available for analysis.".into(),
        ));
    }

    let trend = aggregate(&summaries);
    let weapons = state.weapon_ranking(&player_id, &platform).await;
    let prompt = build_trend_prompt(&trend, weapons.as_ref());
    let analysis = state.llm.generate(&prompt).await;

    Ok(Json(json!({
        "player_id": player_id,
        "matches_analyzed": trend.total_matches,
        "trend_analysis": analysis,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::weapons::WeaponUsageRecord;
    use crate::stats::models::{MatchRef, PlayerRecord};
    use async_trait::async_trait;

    struct NoStats;

    #[async_trait]
    impl StatsProvider for NoStats {
        async fn search_player(&self, _: &str, _: &str) -> Option<PlayerRecord> {
            None
        }
        async fn player_stats(&self, _: &str, _: &str) -> Option<Value> {
            None
        }
        async fn recent_matches(&self, _: &str, _: &str) -> Option<Vec<MatchRef>> {
            None
        }
        async fn match_details(&self, _: &str, _: &str) -> Option<Value> {
            None
        }
        async fn weapon_mastery(&self, _: &str, _: &str) -> Option<Vec<WeaponUsageRecord>> {
            None
        }
    }

    fn state() -> AppState {
        AppState {
            stats: Arc::new(NoStats),
            llm: Arc::new(LlmClient::new(None, None)),
            config: Arc::new(Config::default()),
        }
    }

    #[test]
    fn test_platform_defaults() {
        let state = state();
        assert_eq!(state.platform(None), "steam");
        assert_eq!(state.platform(Some(String::new())), "steam");
        assert_eq!(state.platform(Some("kakao".into())), "kakao");
    }

    #[tokio::test]
    async fn test_weapon_ranking_unavailable() {
        assert!(state().weapon_ranking("account.x", "steam").await.is_none());
    }
}
