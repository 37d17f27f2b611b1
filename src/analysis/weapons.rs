// Weapon efficiency scoring and strong/weak ranking.

use serde::{Deserialize, Serialize};

/// How many weapons each side of the ranking keeps.
const TOP_WEAPONS: usize = 3;

const KILL_RATE_WEIGHT: f64 = 100.0;
const DAMAGE_PER_USE_WEIGHT: f64 = 0.1;
const HEADSHOT_RATE_WEIGHT: f64 = 50.0;

/// Cut-offs for the weapon ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponThresholds {
    /// Weapons used fewer times than this are ignored.
    pub min_uses: u32,
    /// Scores strictly above this are "strong".
    pub strong_score: f64,
    /// Scores strictly below this are "weak".
    pub weak_score: f64,
}

impl Default for WeaponThresholds {
    fn default() -> Self {
        WeaponThresholds {
            min_uses: 10,
            strong_score: 30.0,
            weak_score: 15.0,
        }
    }
}

/// Usage counters for one weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponUsageRecord {
    pub weapon: String,
    pub times_used: u32,
    pub kills: u32,
    pub damage: f64,
    pub headshots: u32,
    pub longest_kill: f64,
}

impl WeaponUsageRecord {
    pub fn kill_rate(&self) -> f64 {
        self.kills as f64 / self.times_used.max(1) as f64
    }

    pub fn damage_per_use(&self) -> f64 {
        self.damage / self.times_used.max(1) as f64
    }

    /// Headshots per kill.
    pub fn headshot_rate(&self) -> f64 {
        self.headshots as f64 / self.kills.max(1) as f64
    }

    pub fn efficiency_score(&self) -> f64 {
        KILL_RATE_WEIGHT * self.kill_rate()
            + DAMAGE_PER_USE_WEIGHT * self.damage_per_use()
            + HEADSHOT_RATE_WEIGHT * self.headshot_rate()
    }
}

/// A ranked weapon with its derived rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredWeapon {
    pub weapon: String,
    pub times_used: u32,
    pub kill_rate: f64,
    pub damage_per_use: f64,
    pub headshot_rate: f64,
    pub longest_kill: f64,
    pub score: f64,
}

impl From<&WeaponUsageRecord> for ScoredWeapon {
    fn from(r: &WeaponUsageRecord) -> Self {
        ScoredWeapon {
            weapon: r.weapon.clone(),
            times_used: r.times_used,
            kill_rate: r.kill_rate(),
            damage_per_use: r.damage_per_use(),
            headshot_rate: r.headshot_rate(),
            longest_kill: r.longest_kill,
            score: r.efficiency_score(),
        }
    }
}

/// Strongest weapons (best first) and weakest weapons (worst first).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeaponRanking {
    pub strong: Vec<ScoredWeapon>,
    pub weak: Vec<ScoredWeapon>,
}

impl WeaponRanking {
    pub fn is_empty(&self) -> bool {
        self.strong.is_empty() && self.weak.is_empty()
    }
}

/// Rank weapons by efficiency score.
///
/// Weapons below `min_uses` are dropped. Scores above `strong_score` land in
/// `strong` (descending), scores below `weak_score` in `weak` (ascending);
/// each side keeps at most three entries.
pub fn rank_weapons(records: &[WeaponUsageRecord], thresholds: &WeaponThresholds) -> WeaponRanking {
    let scored: Vec<ScoredWeapon> = records
        .iter()
        .filter(|r| r.times_used >= thresholds.min_uses)
        .map(ScoredWeapon::from)
        .collect();

    let mut strong: Vec<ScoredWeapon> = scored
        .iter()
        .filter(|w| w.score > thresholds.strong_score)
        .cloned()
        .collect();
    let mut weak: Vec<ScoredWeapon> = scored
        .into_iter()
        .filter(|w| w.score < thresholds.weak_score)
        .collect();

    strong.sort_by(|a, b| b.score.total_cmp(&a.score));
    weak.sort_by(|a, b| a.score.total_cmp(&b.score));
    strong.truncate(TOP_WEAPONS);
    weak.truncate(TOP_WEAPONS);

    WeaponRanking { strong, weak }
}
