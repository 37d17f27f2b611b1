// Client for the battle-royale stats API (JSON:API over HTTPS).

pub mod models;

use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;

use crate::analysis::weapons::WeaponUsageRecord;
use crate::config::Config;
use crate::error::StatsError;
use crate::metrics;
use models::{MatchRef, PlayerRecord};

/// Lookups against the stats API. Every call returns `None` on failure;
/// the cause is logged, never propagated.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn search_player(&self, player_name: &str, platform: &str) -> Option<PlayerRecord>;

    /// Lifetime per-mode stats document, passed through untouched.
    async fn player_stats(&self, player_id: &str, platform: &str) -> Option<Value>;

    /// The player's most recent matches, newest first.
    async fn recent_matches(&self, player_id: &str, platform: &str) -> Option<Vec<MatchRef>>;

    /// Full `matches/{id}` document; parse with [`models::MatchDetail::from_document`].
    async fn match_details(&self, match_id: &str, platform: &str) -> Option<Value>;

    async fn weapon_mastery(&self, player_id: &str, platform: &str)
        -> Option<Vec<WeaponUsageRecord>>;
}

pub struct StatsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    match_history_limit: usize,
}

impl StatsClient {
    pub fn new(config: &Config) -> Self {
        if config.pubg_api_key.is_none() {
            tracing::warn!("PUBG_API_KEY not set, stats lookups will be rejected upstream");
        }
        StatsClient {
            http: reqwest::Client::new(),
            base_url: config.stats_base_url.clone(),
            api_key: config.pubg_api_key.clone().unwrap_or_default(),
            match_history_limit: config.match_history_limit,
        }
    }

    fn url(&self, platform: &str, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, platform, path)
    }

    /// GET `url` and return the body of a 2xx response.
    async fn fetch(
        &self,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String, StatsError> {
        let start = Instant::now();
        let result: Result<String, StatsError> = async {
            let response = self
                .http
                .get(url)
                .query(query)
                .bearer_auth(&self.api_key)
                .header("Accept", "application/vnd.api+json")
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(StatsError::Status(status.as_u16()));
            }
            Ok(response.text().await?)
        }
        .await;

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::STATS_API_REQUESTS_TOTAL
            .with_label_values(&[endpoint, outcome])
            .inc();
        tracing::debug!(
            "stats API {endpoint} {outcome} in {:.0}ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        result
    }
}

/// Log a failed lookup and collapse it to `None`.
fn log_failure<T>(what: &str, result: Result<T, StatsError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("{what} failed: {e}");
            None
        }
    }
}

#[async_trait]
impl StatsProvider for StatsClient {
    async fn search_player(&self, player_name: &str, platform: &str) -> Option<PlayerRecord> {
        let url = self.url(platform, "players");
        let result: Result<Option<PlayerRecord>, StatsError> = async {
            let body = self
                .fetch("search_player", &url, &[("filter[playerNames]", player_name)])
                .await?;
            models::player_from_search(&body, platform)
        }
        .await;
        log_failure("Player search", result).flatten()
    }

    async fn player_stats(&self, player_id: &str, platform: &str) -> Option<Value> {
        let url = self.url(platform, &format!("players/{player_id}/seasons/lifetime"));
        let result: Result<Value, StatsError> = async {
            let body = self.fetch("player_stats", &url, &[]).await?;
            Ok(serde_json::from_str(&body)?)
        }
        .await;
        log_failure("Player stats lookup", result)
    }

    async fn recent_matches(&self, player_id: &str, platform: &str) -> Option<Vec<MatchRef>> {
        let url = self.url(platform, &format!("players/{player_id}"));
        let result: Result<Vec<MatchRef>, StatsError> = async {
            let body = self.fetch("recent_matches", &url, &[]).await?;
            models::recent_matches_from_player(&body, self.match_history_limit)
        }
        .await;
        log_failure("Recent matches lookup", result)
    }

    async fn match_details(&self, match_id: &str, platform: &str) -> Option<Value> {
        let url = self.url(platform, &format!("matches/{match_id}"));
        let result: Result<Value, StatsError> = async {
            let body = self.fetch("match_details", &url, &[]).await?;
            Ok(serde_json::from_str(&body)?)
        }
        .await;
        log_failure("Match detail lookup", result)
    }

    async fn weapon_mastery(
        &self,
        player_id: &str,
        platform: &str,
    ) -> Option<Vec<WeaponUsageRecord>> {
        let url = self.url(platform, &format!("players/{player_id}/weapon_mastery"));
        let result: Result<Vec<WeaponUsageRecord>, StatsError> = async {
            let body = self.fetch("weapon_mastery", &url, &[]).await?;
            models::weapon_usage_from_mastery(&body)
        }
        .await;
        log_failure("Weapon mastery lookup", result)
    }
}
