// Derived per-match metrics used by the match analysis prompt.

use serde::Serialize;

use crate::stats::models::ParticipantStats;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchMetrics {
    pub survival_minutes: f64,
    /// Kills per survival interval, as reported to players.
    pub kill_efficiency: f64,
    pub damage_per_kill: f64,
    /// Percent of kills that were headshots.
    pub headshot_rate: f64,
    /// Percent of the team's kills made by this player.
    pub kill_contribution: f64,
    /// Percent of knockdowns converted into kills.
    pub knock_conversion: f64,
    pub ride_km: f64,
    pub walk_km: f64,
    pub total_travel_km: f64,
}

impl MatchMetrics {
    pub fn compute(player: &ParticipantStats, teammates: &[&ParticipantStats]) -> Self {
        let survival_minutes = player.time_survived / 60.0;
        let kills = player.kills as f64;

        let kill_efficiency = if survival_minutes > 0.0 {
            kills / (survival_minutes / 60.0).max(1.0)
        } else {
            0.0
        };
        let team_total_kills = kills + teammates.iter().map(|t| t.kills as f64).sum::<f64>();
        let kill_contribution = if team_total_kills > 0.0 {
            kills / team_total_kills * 100.0
        } else {
            0.0
        };
        let ride_km = player.ride_distance / 1000.0;
        let walk_km = player.walk_distance / 1000.0;

        MatchMetrics {
            survival_minutes,
            kill_efficiency,
            damage_per_kill: damage_per_kill(player),
            headshot_rate: headshot_rate(player),
            kill_contribution,
            knock_conversion: kills / player.dbnos.max(1) as f64 * 100.0,
            ride_km,
            walk_km,
            total_travel_km: ride_km + walk_km,
        }
    }
}

/// Damage per kill, or the raw damage when there were no kills.
pub fn damage_per_kill(stats: &ParticipantStats) -> f64 {
    if stats.kills > 0 {
        stats.damage_dealt / stats.kills as f64
    } else {
        stats.damage_dealt
    }
}

/// Headshot kills as a percentage of kills.
pub fn headshot_rate(stats: &ParticipantStats) -> f64 {
    if stats.kills > 0 {
        stats.headshot_kills as f64 / stats.kills as f64 * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> ParticipantStats {
        ParticipantStats {
            name: "Hero".into(),
            kills: 4,
            damage_dealt: 800.0,
            time_survived: 1500.0,
            headshot_kills: 1,
            dbnos: 5,
            ride_distance: 2500.0,
            walk_distance: 1500.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_basic_metrics() {
        let m = MatchMetrics::compute(&player(), &[]);
        assert!((m.survival_minutes - 25.0).abs() < 1e-9);
        assert!((m.damage_per_kill - 200.0).abs() < 1e-9);
        assert!((m.headshot_rate - 25.0).abs() < 1e-9);
        assert!((m.knock_conversion - 80.0).abs() < 1e-9);
        assert!((m.total_travel_km - 4.0).abs() < 1e-9);
        // Solo: all of the team's kills are ours.
        assert!((m.kill_contribution - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_kill_efficiency_uses_floor_of_one() {
        // 25 minutes survived -> 25/60 < 1, so divisor is 1.
        let m = MatchMetrics::compute(&player(), &[]);
        assert!((m.kill_efficiency - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_kill_contribution_with_teammates() {
        let mate = ParticipantStats {
            kills: 4,
            ..Default::default()
        };
        let m = MatchMetrics::compute(&player(), &[&mate, &mate]);
        assert!((m.kill_contribution - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_kill_match() {
        let stats = ParticipantStats {
            damage_dealt: 120.0,
            ..Default::default()
        };
        let m = MatchMetrics::compute(&stats, &[]);
        assert_eq!(m.kill_efficiency, 0.0);
        assert_eq!(m.damage_per_kill, 120.0);
        assert_eq!(m.headshot_rate, 0.0);
        assert_eq!(m.kill_contribution, 0.0);
        assert_eq!(m.knock_conversion, 0.0);
    }
}
