// Prompt construction for match and trend coaching.
//
// Everything here is a pure function of its inputs: same stats, same text.

use std::fmt::Write;

use crate::analysis::match_metrics::{damage_per_kill, headshot_rate, MatchMetrics};
use crate::analysis::trend::AggregatedTrend;
use crate::analysis::weapons::{ScoredWeapon, WeaponRanking};
use crate::display::map_display_name;
use crate::game_mode::{GameMode, ModeFamily, Perspective};
use crate::stats::models::{MatchInfo, ParticipantStats};

/// System message for chat-style providers.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert PUBG coach. You analyse a player's \
match statistics and give specific, actionable advice for improvement.";

/// Everything the match prompt needs.
pub struct MatchPromptInput<'a> {
    pub info: &'a MatchInfo,
    pub player: &'a ParticipantStats,
    pub teammates: &'a [&'a ParticipantStats],
    pub metrics: &'a MatchMetrics,
    pub weapons: Option<&'a WeaponRanking>,
}

pub fn build_match_prompt(input: &MatchPromptInput<'_>) -> String {
    let MatchPromptInput {
        info,
        player: p,
        teammates,
        metrics: m,
        weapons,
    } = input;
    let map = map_display_name(&info.map_name);
    let team_kill_flag = if p.team_kills > 0 {
        "(needs attention)"
    } else {
        "(clean)"
    };

    let mut prompt = format!(
        r#"
You are a professional PUBG coach and mentor to pro players. Analyse the match below in depth and give the player concrete, actionable advice to improve.

## Match overview
- **Game mode**: {mode} ({raw_mode})
- **Map**: {map}
- **Final placement**: #{rank} of 100
- **Survival time**: {survival:.1} min

## Player performance
### Combat
- **Kills**: {kills} (team share: {contribution:.1}%)
- **Total damage**: {damage:.0} (per kill: {dpk:.0})
- **Headshots**: {headshots} (accuracy: {hs_rate:.1}%)
- **Knockdowns**: {dbnos} (conversion to kills: {conversion:.1}%)
- **Assists**: {assists}
- **Longest kill**: {longest:.1} m

### Survival and movement
- **Kill efficiency**: {efficiency:.2} kills/min
- **Distance travelled**: vehicle {ride:.1} km + on foot {walk:.1} km (total {travel:.1} km)
- **Weapons acquired**: {weapons_acquired}

### Teamwork and support
- **Revives**: {revives}
- **Team kills**: {team_kills} {team_kill_flag}

### Items
- **Boosts used**: {boosts}
- **Heals used**: {heals}
"#,
        mode = info.mode.display_name(),
        raw_mode = info.game_mode,
        rank = p.win_place,
        survival = m.survival_minutes,
        kills = p.kills,
        contribution = m.kill_contribution,
        damage = p.damage_dealt,
        dpk = m.damage_per_kill,
        headshots = p.headshot_kills,
        hs_rate = m.headshot_rate,
        dbnos = p.dbnos,
        conversion = m.knock_conversion,
        assists = p.assists,
        longest = p.longest_kill,
        efficiency = m.kill_efficiency,
        ride = m.ride_km,
        walk = m.walk_km,
        travel = m.total_travel_km,
        weapons_acquired = p.weapons_acquired,
        revives = p.revives,
        team_kills = p.team_kills,
        boosts = p.boosts,
        heals = p.heals,
    );

    push_team_section(&mut prompt, info.mode, teammates);

    if let Some(ranking) = weapons.filter(|r| !r.is_empty()) {
        push_weapon_section(&mut prompt, ranking);
    }

    let _ = write!(
        prompt,
        r#"
## Analysis request

Using your coaching experience, analyse each area below with **concrete numbers and examples**:

### 1. Combat performance
- **Kill efficiency**: how good is {efficiency:.2} kills/min for this mode and map?
- **Damage efficiency**: is {dpk:.0} damage per kill reasonable? (200-300 is typical)
- **Headshot accuracy**: assess the {hs_rate:.1}% headshot rate and how to raise it
- **Finishing**: {dbnos} knockdowns turned into {kills} kills - how well does the player close out fights?
- **Engagement style**: what do the numbers say (aggressive, defensive, long range, ...)?
"#,
        efficiency = m.kill_efficiency,
        dpk = m.damage_per_kill,
        hs_rate = m.headshot_rate,
        dbnos = p.dbnos,
        kills = p.kills,
    );

    push_teamwork_request(&mut prompt, info.mode.family, p, m);

    let _ = write!(
        prompt,
        r#"
### 3. Strategy and map use
- **Positioning**: the survival plan that led to #{rank}
- **Movement**: is {travel:.1} km efficient? (vehicle {ride:.1} km vs on foot {walk:.1} km)
- **Zone management**: how {survival:.1} min of survival relates to the final placement
- **Map fit**: how well the play style suits {map}
"#,
        rank = p.win_place,
        travel = m.total_travel_km,
        ride = m.ride_km,
        walk = m.walk_km,
        survival = m.survival_minutes,
        map = map,
    );

    prompt.push_str(perspective_advice(info.mode.perspective));

    let _ = write!(
        prompt,
        r#"
### 4. Resources and game sense
- **Items**: were {boosts} boosts and {heals} heals used well?
- **Loadout**: {weapons_acquired} weapons picked up - how often did the player swap gear?
- **Timing**: judgement on when to fight and when to disengage

### 5. Improvements and action plan
**Fix from the next game:**
- [ ] Concrete improvement 1 (e.g. a specific headshot drill)
- [ ] Concrete improvement 2 (e.g. a decision rule for a specific situation)
- [ ] Concrete improvement 3

**Short term (1-2 weeks):**
- Numeric targets (e.g. 30% headshot rate, 0.5 kills/min)

**Longer term (1 month+):**
- Direction for the play style

### 6. Overall grade
**Match grade**: S/A/B/C/D with reasoning
**Top 3 strengths**:
1.
2.
3.

**Top 3 areas to improve**:
1.
2.
3.

**Goal for the next match**: specific and measurable

---
Guidelines:
- Base every point on the numbers above
- Personalise the advice to this player rather than giving generic tips
- Give executable methods ("10 minutes of single-fire M416 headshots in the training range daily", not "practise aim")
- Keep an encouraging, positive tone
- Separate each section clearly
"#,
        boosts = p.boosts,
        heals = p.heals,
        weapons_acquired = p.weapons_acquired,
    );

    prompt
}

fn push_team_section(prompt: &mut String, mode: GameMode, teammates: &[&ParticipantStats]) {
    prompt.push_str("\n## Teammate comparison\n");
    if mode.family == ModeFamily::Solo {
        prompt.push_str("**Solo play** - no teammate data.\n");
        return;
    }
    if !mode.is_team_mode() || teammates.is_empty() {
        prompt.push_str("No teammate data for this match.\n");
        return;
    }
    for (i, mate) in teammates.iter().enumerate() {
        let _ = write!(
            prompt,
            r#"**Teammate {n}** ({name}):
- Kills/damage: {kills} kills, {damage:.0} damage (per kill: {dpk:.0})
- Survival: {survival:.1} min, headshots: {headshots} ({hs_rate:.1}%)
- Knockdowns/revives/assists: {dbnos}/{revives}/{assists}
"#,
            n = i + 1,
            name = if mate.name.is_empty() { "Unknown" } else { mate.name.as_str() },
            kills = mate.kills,
            damage = mate.damage_dealt,
            dpk = damage_per_kill(mate),
            survival = mate.time_survived / 60.0,
            headshots = mate.headshot_kills,
            hs_rate = headshot_rate(mate),
            dbnos = mate.dbnos,
            revives = mate.revives,
            assists = mate.assists,
        );
    }
}

fn push_teamwork_request(
    prompt: &mut String,
    family: ModeFamily,
    p: &ParticipantStats,
    m: &MatchMetrics,
) {
    if family == ModeFamily::Solo {
        let _ = write!(
            prompt,
            r#"
### 2. Solo self-reliance
- **Third-party awareness**: with no one to revive you, how did {dbnos} knockdowns and {kills} kills affect exposure to other squads?
- **Fight selection**: which fights were worth taking alone?
- **Rotation discipline**: solo rotations and cover use to reach #{rank}
"#,
            dbnos = p.dbnos,
            kills = p.kills,
            rank = p.win_place,
        );
        return;
    }

    let _ = write!(
        prompt,
        r#"
### 2. Teamwork
- **Team contribution**: {contribution:.1}% of the team's kills - carry or support role?
- **Support**: what {revives} revives and {assists} assists say about the player
- **Synergy**: cooperation level based on the teammate comparison
- **Leadership**: the player's role and responsibility inside the team
"#,
        contribution = m.kill_contribution,
        revives = p.revives,
        assists = p.assists,
    );
}

fn perspective_advice(perspective: Perspective) -> &'static str {
    match perspective {
        Perspective::FirstPerson => {
            "- **First-person play**: no camera peeking - judge corner peeks, lean usage and audio cues\n"
        }
        Perspective::ThirdPerson => {
            "- **Third-person play**: judge camera peeking from cover and how the player denies enemy peeks\n"
        }
    }
}

fn push_weapon_section(prompt: &mut String, ranking: &WeaponRanking) {
    prompt.push_str("\n## Weapon mastery\n");
    push_weapon_list(prompt, "Most effective weapons", &ranking.strong);
    push_weapon_list(prompt, "Least effective weapons", &ranking.weak);
}

fn push_weapon_list(prompt: &mut String, title: &str, weapons: &[ScoredWeapon]) {
    if weapons.is_empty() {
        return;
    }
    let _ = writeln!(prompt, "**{title}**:");
    for w in weapons {
        let _ = writeln!(
            prompt,
            "- {}: score {:.1} (kill rate {:.2}, {:.0} damage/use, headshots {:.1}% of kills, longest kill {:.0} m)",
            w.weapon,
            w.score,
            w.kill_rate,
            w.damage_per_use,
            w.headshot_rate * 100.0,
            w.longest_kill,
        );
    }
}

pub fn build_trend_prompt(trend: &AggregatedTrend, weapons: Option<&WeaponRanking>) -> String {
    let mut prompt = format!(
        r#"
Analyse the overall performance of a PUBG player over their last {n} matches.

## Overall averages
- Matches: {n}
- Average kills: {kills:.1}
- Average damage: {damage:.0}
- Average placement: #{rank:.1}
- Average survival: {survival:.1} min
- Average knockdowns: {dbnos:.1}
- Average revives: {revives:.1}
- Average assists: {assists:.1}
- Average headshots: {headshots:.1}

## Last {window} matches
- Kills: {kill_trend:?}
- Placement: {rank_trend:?}
- Knockdowns: {dbno_trend:?}
- Revives: {revive_trend:?}
"#,
        n = trend.total_matches,
        kills = trend.avg_kills,
        damage = trend.avg_damage,
        rank = trend.avg_rank,
        survival = trend.avg_survival_time / 60.0,
        dbnos = trend.avg_knockdowns,
        revives = trend.avg_revives,
        assists = trend.avg_assists,
        headshots = trend.avg_headshots,
        window = trend.kill_trend.len(),
        kill_trend = trend.kill_trend,
        rank_trend = trend.rank_trend,
        dbno_trend = trend.knockdown_trend,
        revive_trend = trend.revive_trend,
    );

    if let Some(ranking) = weapons.filter(|r| !r.is_empty()) {
        push_weapon_section(&mut prompt, ranking);
    }

    prompt.push_str(
        r#"
## Analysis request

Analyse the following and give concrete ways to improve:

### 1. Performance trend
- Is recent performance improving or declining?
- How do kills and placement relate?
- Knockdowns versus confirmed kills
- Is the play consistent from match to match?

### 2. Teamwork
- Revive pattern and level of teamwork
- Assist contribution and cooperative play
- Balance between individual stats and team contribution

### 3. Strengths and weaknesses
- Strengths of the current play style
- Weaknesses that need work
- Where the player stands relative to others

### 4. Improvement plan
- Short-term goals (1-2 weeks)
- Longer-term direction (1-2 months)
- Concrete, executable action plan

### 5. Play style
- The best play style for these numbers
- Recommended modes or strategies
- Patterns to avoid

### 6. Targets
- Goals for the next 10 matches
- Realistic numeric targets

Write in a friendly, motivating tone focused on practical advice. Separate each section clearly and include concrete numbers and examples.
"#,
    );

    prompt
}
