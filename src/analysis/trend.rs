// Aggregation of recent matches into averages and short trend windows.

use serde::{Deserialize, Serialize};

use crate::stats::models::ParticipantStats;

/// Number of most recent entries kept in each trend window.
pub const TREND_WINDOW: usize = 10;

/// Per-match numbers taken from a participant record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub kills: u32,
    pub damage: f64,
    /// Seconds.
    pub survival_time: f64,
    pub rank: u32,
    pub knockdowns: u32,
    pub revives: u32,
    pub assists: u32,
    pub headshots: u32,
}

impl From<&ParticipantStats> for MatchSummary {
    fn from(s: &ParticipantStats) -> Self {
        MatchSummary {
            kills: s.kills,
            damage: s.damage_dealt,
            survival_time: s.time_survived,
            rank: s.win_place,
            knockdowns: s.dbnos,
            revives: s.revives,
            assists: s.assists,
            headshots: s.headshot_kills,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedTrend {
    pub total_matches: usize,
    pub avg_kills: f64,
    pub avg_damage: f64,
    pub avg_survival_time: f64,
    pub avg_rank: f64,
    pub avg_knockdowns: f64,
    pub avg_revives: f64,
    pub avg_assists: f64,
    pub avg_headshots: f64,
    pub kill_trend: Vec<u32>,
    pub rank_trend: Vec<u32>,
    pub knockdown_trend: Vec<u32>,
    pub revive_trend: Vec<u32>,
}

/// Average every field over `matches` and keep the last [`TREND_WINDOW`]
/// kills, ranks, knockdowns and revives in input order.
///
/// An empty slice yields the all-zero default.
pub fn aggregate(matches: &[MatchSummary]) -> AggregatedTrend {
    if matches.is_empty() {
        return AggregatedTrend::default();
    }

    let n = matches.len() as f64;
    let mean = |f: fn(&MatchSummary) -> f64| matches.iter().map(f).sum::<f64>() / n;
    let window = &matches[matches.len().saturating_sub(TREND_WINDOW)..];
    let trend = |f: fn(&MatchSummary) -> u32| window.iter().map(f).collect::<Vec<_>>();

    AggregatedTrend {
        total_matches: matches.len(),
        avg_kills: mean(|m| m.kills as f64),
        avg_damage: mean(|m| m.damage),
        avg_survival_time: mean(|m| m.survival_time),
        avg_rank: mean(|m| m.rank as f64),
        avg_knockdowns: mean(|m| m.knockdowns as f64),
        avg_revives: mean(|m| m.revives as f64),
        avg_assists: mean(|m| m.assists as f64),
        avg_headshots: mean(|m| m.headshots as f64),
        kill_trend: trend(|m| m.kills),
        rank_trend: trend(|m| m.rank),
        knockdown_trend: trend(|m| m.knockdowns),
        revive_trend: trend(|m| m.revives),
    }
}
