// Server-rendered HTML pages: search form and player profile.

use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;
use std::fmt::Write;

use super::AppState;
use crate::display::{map_display_name, rank_color};
use crate::game_mode::GameMode;
use crate::stats::models::{lifetime_mode_stats, LifetimeModeStats, MatchDetail, PlayerRecord};

/// Recent matches shown on the profile page.
const PROFILE_MATCHES: usize = 5;

#[derive(Deserialize)]
pub struct SearchForm {
    pub player_name: String,
}

/// One row of the recent-matches table.
struct MatchRow {
    mode: String,
    map: String,
    rank: u32,
    kills: u32,
    damage: f64,
    survival_minutes: f64,
}

pub async fn home() -> Html<String> {
    Html(layout(
        "PUBG Battle Analytics",
        r#"<h1>PUBG Battle Analytics</h1>
<form method="post" action="/search">
  <input type="text" name="player_name" placeholder="Player name" required>
  <button type="submit">Search</button>
</form>"#,
    ))
}

pub async fn search_form(Form(form): Form<SearchForm>) -> impl IntoResponse {
    let name = form.player_name.trim();
    Redirect::to(&format!("/player/{}", encode_path_segment(name)))
}

pub async fn player_profile(
    State(state): State<AppState>,
    Path(player_name): Path<String>,
) -> Html<String> {
    let platform = state.config.default_platform.clone();
    let Some(player) = state.stats.search_player(&player_name, &platform).await else {
        return Html(error_page("Player not found."));
    };

    let lifetime = state
        .stats
        .player_stats(&player.id, &platform)
        .await
        .map(|doc| lifetime_mode_stats(&doc))
        .unwrap_or_default();

    let matches = state
        .stats
        .recent_matches(&player.id, &platform)
        .await
        .unwrap_or_default();
    let mut rows = Vec::new();
    for m in matches.iter().take(PROFILE_MATCHES) {
        let Some(doc) = state.stats.match_details(&m.id, &platform).await else {
            continue;
        };
        match MatchDetail::from_document(doc) {
            Ok(detail) => {
                if let Some(row) = match_row(&detail, &player.id) {
                    rows.push(row);
                }
            }
            Err(e) => {
                tracing::error!("Could not render match {} for {}: {e}", m.id, player.name);
                return Html(error_page(&format!("An error occurred: {e}")));
            }
        }
    }

    Html(profile_page(&player, &lifetime, &rows))
}

fn match_row(detail: &MatchDetail, player_id: &str) -> Option<MatchRow> {
    let stats = detail.player_stats(player_id)?;
    Some(MatchRow {
        mode: detail.info.mode.display_name(),
        map: map_display_name(&detail.info.map_name).to_string(),
        rank: stats.win_place,
        kills: stats.kills,
        damage: stats.damage_dealt,
        survival_minutes: stats.time_survived / 60.0,
    })
}

fn profile_page(player: &PlayerRecord, lifetime: &[LifetimeModeStats], rows: &[MatchRow]) -> String {
    let mut body = format!(
        "<h1>{}</h1>\n<p>Platform: {}</p>\n",
        escape_html(&player.name),
        escape_html(&player.platform)
    );

    body.push_str("<h2>Lifetime stats</h2>\n");
    if lifetime.is_empty() {
        body.push_str("<p>No lifetime stats available.</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>Mode</th><th>Rounds</th><th>Wins</th><th>Top 10</th>\
             <th>K/D</th><th>Win %</th><th>Avg damage</th></tr>\n",
        );
        for s in lifetime {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.1}%</td><td>{:.0}</td></tr>",
                escape_html(&GameMode::parse(&s.mode).display_name()),
                s.rounds_played,
                s.wins,
                s.top10s,
                s.kd_ratio,
                s.win_ratio * 100.0,
                s.avg_damage,
            );
        }
        body.push_str("</table>\n");
    }

    body.push_str("<h2>Recent matches</h2>\n");
    if rows.is_empty() {
        body.push_str("<p>No recent matches.</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>Mode</th><th>Map</th><th>Rank</th><th>Kills</th>\
             <th>Damage</th><th>Survived</th></tr>\n",
        );
        for r in rows {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td style=\"color: {}\">#{}</td><td>{}</td><td>{:.0}</td><td>{:.1} min</td></tr>",
                escape_html(&r.mode),
                escape_html(&r.map),
                rank_color(r.rank),
                r.rank,
                r.kills,
                r.damage,
                r.survival_minutes,
            );
        }
        body.push_str("</table>\n");
    }

    layout(&format!("{} - PUBG Battle Analytics", player.name), &body)
}

fn error_page(message: &str) -> String {
    layout(
        "Error - PUBG Battle Analytics",
        &format!(
            "<h1>Error</h1>\n<p class=\"error\">{}</p>\n<p><a href=\"/\">Back to search</a></p>",
            escape_html(message)
        ),
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
{}
</body>
</html>
"#,
        escape_html(title),
        body
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_path_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}
