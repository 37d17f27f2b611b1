// Typed views over the stats API's JSON:API documents.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::weapons::WeaponUsageRecord;
use crate::error::StatsError;
use crate::game_mode::GameMode;

// ── Shared JSON:API pieces ───────────────────────────────────────────

/// `{ "type": ..., "id": ... }` resource identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Relationship {
    #[serde(default)]
    data: Vec<ResourceRef>,
}

// ── Players ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    pub platform: String,
}

/// A player's recent match as listed in the player document.
pub type MatchRef = ResourceRef;

#[derive(Debug, Deserialize)]
struct PlayerResource {
    id: String,
    attributes: PlayerAttributes,
    #[serde(default)]
    relationships: PlayerRelationships,
}

#[derive(Debug, Deserialize)]
struct PlayerAttributes {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct PlayerRelationships {
    #[serde(default)]
    matches: Relationship,
}

#[derive(Debug, Deserialize)]
struct PlayerSearchDocument {
    #[serde(default)]
    data: Vec<PlayerResource>,
}

#[derive(Debug, Deserialize)]
struct PlayerDocument {
    data: PlayerResource,
}

/// First player of a `players?filter[playerNames]=` response, if any.
pub fn player_from_search(body: &str, platform: &str) -> Result<Option<PlayerRecord>, StatsError> {
    let doc: PlayerSearchDocument = serde_json::from_str(body)?;
    Ok(doc.data.into_iter().next().map(|p| PlayerRecord {
        id: p.id,
        name: p.attributes.name,
        platform: platform.to_string(),
    }))
}

/// Match references from a `players/{id}` response, newest first.
pub fn recent_matches_from_player(body: &str, limit: usize) -> Result<Vec<MatchRef>, StatsError> {
    let doc: PlayerDocument = serde_json::from_str(body)?;
    let mut matches = doc.data.relationships.matches.data;
    matches.truncate(limit);
    Ok(matches)
}

// ── Matches ──────────────────────────────────────────────────────────

/// One participant's statistics block. Missing numbers default to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParticipantStats {
    pub name: String,
    pub player_id: String,
    pub kills: u32,
    pub damage_dealt: f64,
    /// Seconds.
    pub time_survived: f64,
    pub win_place: u32,
    pub kill_place: u32,
    #[serde(rename = "DBNOs", alias = "dBNOs")]
    pub dbnos: u32,
    pub revives: u32,
    pub assists: u32,
    pub headshot_kills: u32,
    /// Metres.
    pub ride_distance: f64,
    /// Metres.
    pub walk_distance: f64,
    /// Metres.
    pub swim_distance: f64,
    pub weapons_acquired: u32,
    pub boosts: u32,
    pub heals: u32,
    pub team_kills: u32,
    /// Metres.
    pub longest_kill: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchInfo {
    pub id: String,
    /// Raw tag such as `squad-fpp`.
    pub game_mode: String,
    pub mode: GameMode,
    pub map_name: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Seconds.
    pub duration: u32,
}

#[derive(Debug, Clone)]
pub struct Roster {
    pub id: String,
    pub rank: u32,
    pub participant_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub id: String,
    pub stats: ParticipantStats,
}

#[derive(Debug, Clone)]
pub struct MatchDetail {
    pub info: MatchInfo,
    pub participants: Vec<Participant>,
    pub rosters: Vec<Roster>,
}

#[derive(Debug, Deserialize)]
struct MatchDocument {
    data: MatchResource,
    #[serde(default)]
    included: Vec<Included>,
}

#[derive(Debug, Deserialize)]
struct MatchResource {
    id: String,
    attributes: MatchAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchAttributes {
    #[serde(default)]
    game_mode: String,
    #[serde(default)]
    map_name: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    duration: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Included {
    Participant {
        id: String,
        attributes: ParticipantAttributes,
    },
    Roster {
        id: String,
        #[serde(default)]
        attributes: RosterAttributes,
        #[serde(default)]
        relationships: RosterRelationships,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ParticipantAttributes {
    #[serde(default)]
    stats: ParticipantStats,
}

#[derive(Debug, Default, Deserialize)]
struct RosterAttributes {
    #[serde(default)]
    stats: RosterStats,
}

#[derive(Debug, Default, Deserialize)]
struct RosterStats {
    #[serde(default)]
    rank: u32,
}

#[derive(Debug, Default, Deserialize)]
struct RosterRelationships {
    #[serde(default)]
    participants: Relationship,
}

impl MatchDetail {
    /// Parse a `matches/{id}` document.
    pub fn from_document(doc: Value) -> Result<Self, StatsError> {
        let doc: MatchDocument = serde_json::from_value(doc)?;
        let attrs = doc.data.attributes;
        let created_at = attrs
            .created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let info = MatchInfo {
            id: doc.data.id,
            mode: GameMode::parse(&attrs.game_mode),
            game_mode: attrs.game_mode,
            map_name: attrs.map_name,
            created_at,
            duration: attrs.duration,
        };

        let mut participants = Vec::new();
        let mut rosters = Vec::new();
        for item in doc.included {
            match item {
                Included::Participant { id, attributes } => participants.push(Participant {
                    id,
                    stats: attributes.stats,
                }),
                Included::Roster {
                    id,
                    attributes,
                    relationships,
                } => rosters.push(Roster {
                    id,
                    rank: attributes.stats.rank,
                    participant_ids: relationships
                        .participants
                        .data
                        .into_iter()
                        .map(|r| r.id)
                        .collect(),
                }),
                Included::Other => {}
            }
        }

        Ok(MatchDetail {
            info,
            participants,
            rosters,
        })
    }

    fn participant_of(&self, player_id: &str) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.stats.player_id == player_id)
    }

    /// Stats of the participant whose account id is `player_id`.
    pub fn player_stats(&self, player_id: &str) -> Option<&ParticipantStats> {
        self.participant_of(player_id).map(|p| &p.stats)
    }

    /// Everyone else on the player's roster.
    pub fn teammates_of(&self, player_id: &str) -> Vec<&ParticipantStats> {
        let Some(me) = self.participant_of(player_id) else {
            return Vec::new();
        };
        let Some(roster) = self
            .rosters
            .iter()
            .find(|r| r.participant_ids.iter().any(|id| *id == me.id))
        else {
            return Vec::new();
        };
        self.participants
            .iter()
            .filter(|p| p.id != me.id && roster.participant_ids.contains(&p.id))
            .map(|p| &p.stats)
            .collect()
    }
}

// ── Lifetime stats ───────────────────────────────────────────────────

/// Lifetime totals for one game mode, with the usual derived ratios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifetimeModeStats {
    pub mode: String,
    pub rounds_played: u32,
    pub wins: u32,
    pub top10s: u32,
    pub kills: u32,
    pub assists: u32,
    pub losses: u32,
    pub damage_dealt: f64,
    pub kd_ratio: f64,
    pub win_ratio: f64,
    pub avg_damage: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ModeTotals {
    rounds_played: u32,
    wins: u32,
    #[serde(rename = "top10s")]
    top10s: u32,
    kills: u32,
    assists: u32,
    losses: u32,
    damage_dealt: f64,
}

/// Modes with at least one round from a `seasons/lifetime` document,
/// sorted by mode tag.
pub fn lifetime_mode_stats(doc: &Value) -> Vec<LifetimeModeStats> {
    let Some(modes) = doc.pointer("/data/attributes/gameModeStats") else {
        return Vec::new();
    };
    let modes: BTreeMap<String, ModeTotals> = match serde_json::from_value(modes.clone()) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!("Ignoring malformed lifetime stats: {e}");
            return Vec::new();
        }
    };

    modes
        .into_iter()
        .filter(|(_, t)| t.rounds_played > 0)
        .map(|(mode, t)| LifetimeModeStats {
            kd_ratio: t.kills as f64 / t.losses.max(1) as f64,
            win_ratio: t.wins as f64 / t.rounds_played.max(1) as f64,
            avg_damage: t.damage_dealt / t.rounds_played.max(1) as f64,
            mode,
            rounds_played: t.rounds_played,
            wins: t.wins,
            top10s: t.top10s,
            kills: t.kills,
            assists: t.assists,
            losses: t.losses,
            damage_dealt: t.damage_dealt,
        })
        .collect()
}

// ── Weapon mastery ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WeaponMasteryDocument {
    data: WeaponMasteryResource,
}

#[derive(Debug, Deserialize)]
struct WeaponMasteryResource {
    attributes: WeaponMasteryAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeaponMasteryAttributes {
    #[serde(default)]
    weapon_summaries: BTreeMap<String, WeaponSummary>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct WeaponSummary {
    stats_total: WeaponStatsTotal,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct WeaponStatsTotal {
    kills: u32,
    groggies: u32,
    damage_player: f64,
    head_shots: u32,
    longest_defeat: f64,
}

/// Strip the `Item_Weapon_` prefix and `_C` suffix from a weapon id.
pub fn weapon_display_name(id: &str) -> String {
    let name = id.strip_prefix("Item_Weapon_").unwrap_or(id);
    name.strip_suffix("_C").unwrap_or(name).to_string()
}

/// Usage records from a `players/{id}/weapon_mastery` document.
///
/// Mastery summaries carry no per-round counter, so every knock or kill
/// counts as one use of the weapon.
pub fn weapon_usage_from_mastery(body: &str) -> Result<Vec<WeaponUsageRecord>, StatsError> {
    let doc: WeaponMasteryDocument = serde_json::from_str(body)?;
    Ok(doc
        .data
        .attributes
        .weapon_summaries
        .into_iter()
        .map(|(id, summary)| {
            let t = summary.stats_total;
            WeaponUsageRecord {
                weapon: weapon_display_name(&id),
                times_used: t.kills + t.groggies,
                kills: t.kills,
                damage: t.damage_player,
                headshots: t.head_shots,
                longest_kill: t.longest_defeat,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_mode::{ModeFamily, Perspective};
    use serde_json::json;

    fn match_document() -> Value {
        json!({
            "data": {
                "type": "match",
                "id": "m-1",
                "attributes": {
                    "gameMode": "squad-fpp",
                    "mapName": "Baltic_Main",
                    "createdAt": "2024-05-01T12:30:00Z",
                    "duration": 1830
                }
            },
            "included": [
                { "type": "participant", "id": "p1", "attributes": { "stats": {
                    "name": "Hero", "playerId": "account.hero", "kills": 3,
                    "damageDealt": 412.5, "timeSurvived": 1500, "winPlace": 2,
                    "DBNOs": 4, "revives": 1, "assists": 2, "headshotKills": 1
                }}},
                { "type": "participant", "id": "p2", "attributes": { "stats": {
                    "name": "Buddy", "playerId": "account.buddy", "kills": 1
                }}},
                { "type": "participant", "id": "p3", "attributes": { "stats": {
                    "name": "Enemy", "playerId": "account.enemy", "kills": 7
                }}},
                { "type": "roster", "id": "r1",
                  "attributes": { "stats": { "rank": 2, "teamId": 5 } },
                  "relationships": { "participants": { "data": [
                      { "type": "participant", "id": "p1" },
                      { "type": "participant", "id": "p2" }
                  ]}}},
                { "type": "roster", "id": "r2",
                  "attributes": { "stats": { "rank": 1 } },
                  "relationships": { "participants": { "data": [
                      { "type": "participant", "id": "p3" }
                  ]}}},
                { "type": "asset", "id": "a1", "attributes": { "URL": "https://example" } }
            ]
        })
    }

    #[test]
    fn test_player_from_search() {
        let body = r#"{"data":[{"type":"player","id":"account.abc","attributes":{"name":"Hero","shardId":"steam"}}]}"#;
        let player = player_from_search(body, "steam").unwrap().unwrap();
        assert_eq!(player.id, "account.abc");
        assert_eq!(player.name, "Hero");
        assert_eq!(player.platform, "steam");
    }

    #[test]
    fn test_player_from_empty_search() {
        assert_eq!(player_from_search(r#"{"data":[]}"#, "steam").unwrap(), None);
        assert!(player_from_search("not json", "steam").is_err());
    }

    #[test]
    fn test_recent_matches_truncated() {
        let refs: Vec<Value> = (0..25)
            .map(|i| json!({ "type": "match", "id": format!("m{i}") }))
            .collect();
        let body = json!({
            "data": {
                "type": "player",
                "id": "account.abc",
                "attributes": { "name": "Hero" },
                "relationships": { "matches": { "data": refs } }
            }
        })
        .to_string();
        let matches = recent_matches_from_player(&body, 20).unwrap();
        assert_eq!(matches.len(), 20);
        assert_eq!(matches[0].id, "m0");
        assert_eq!(matches[0].kind, "match");
    }

    #[test]
    fn test_match_ref_serializes_type_field() {
        let r = MatchRef {
            kind: "match".into(),
            id: "m1".into(),
        };
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({ "type": "match", "id": "m1" })
        );
    }

    #[test]
    fn test_match_detail_parsing() {
        let detail = MatchDetail::from_document(match_document()).unwrap();
        assert_eq!(detail.info.id, "m-1");
        assert_eq!(detail.info.map_name, "Baltic_Main");
        assert_eq!(detail.info.mode.family, ModeFamily::Squad);
        assert_eq!(detail.info.mode.perspective, Perspective::FirstPerson);
        assert!(detail.info.created_at.is_some());
        assert_eq!(detail.participants.len(), 3);
        assert_eq!(detail.rosters.len(), 2);

        let me = detail.player_stats("account.hero").unwrap();
        assert_eq!(me.kills, 3);
        assert_eq!(me.dbnos, 4);
        assert_eq!(me.win_place, 2);
        assert!((me.time_survived - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn test_teammates_are_roster_mates_only() {
        let detail = MatchDetail::from_document(match_document()).unwrap();
        let mates = detail.teammates_of("account.hero");
        assert_eq!(mates.len(), 1);
        assert_eq!(mates[0].name, "Buddy");
        assert!(detail.teammates_of("account.enemy").is_empty());
        assert!(detail.teammates_of("account.nobody").is_empty());
    }

    #[test]
    fn test_missing_player_in_match() {
        let detail = MatchDetail::from_document(match_document()).unwrap();
        assert!(detail.player_stats("account.nobody").is_none());
    }

    #[test]
    fn test_malformed_match_document() {
        assert!(MatchDetail::from_document(json!({ "data": [] })).is_err());
    }

    #[test]
    fn test_lifetime_mode_stats() {
        let doc = json!({
            "data": { "attributes": { "gameModeStats": {
                "squad-fpp": { "roundsPlayed": 10, "wins": 2, "top10s": 5,
                               "kills": 18, "assists": 4, "losses": 8,
                               "damageDealt": 2500.0 },
                "solo": { "roundsPlayed": 0 }
            }}}
        });
        let stats = lifetime_mode_stats(&doc);
        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert_eq!(s.mode, "squad-fpp");
        assert!((s.kd_ratio - 2.25).abs() < 1e-9);
        assert!((s.win_ratio - 0.2).abs() < 1e-9);
        assert!((s.avg_damage - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_lifetime_mode_stats_missing_section() {
        assert!(lifetime_mode_stats(&json!({ "data": {} })).is_empty());
    }

    #[test]
    fn test_weapon_usage_from_mastery() {
        let body = json!({
            "data": {
                "type": "weaponMasterySummary",
                "id": "account.abc",
                "attributes": { "weaponSummaries": {
                    "Item_Weapon_HK416_C": {
                        "XPTotal": 12000, "LevelCurrent": 20,
                        "StatsTotal": { "Kills": 12, "Groggies": 8,
                                        "DamagePlayer": 3000.0, "HeadShots": 5,
                                        "LongestDefeat": 210.5 }
                    },
                    "Item_Weapon_Pan_C": { "StatsTotal": {} }
                }}
            }
        })
        .to_string();
        let records = weapon_usage_from_mastery(&body).unwrap();
        assert_eq!(records.len(), 2);
        let hk = &records[0];
        assert_eq!(hk.weapon, "HK416");
        assert_eq!(hk.times_used, 20);
        assert_eq!(hk.kills, 12);
        assert_eq!(hk.headshots, 5);
        assert_eq!(records[1].times_used, 0);
    }

    #[test]
    fn test_weapon_display_name() {
        assert_eq!(weapon_display_name("Item_Weapon_AK47_C"), "AK47");
        assert_eq!(weapon_display_name("Mini14"), "Mini14");
    }
}
