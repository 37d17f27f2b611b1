// Game mode tags ("squad-fpp", "normal-duo", ...) parsed once into explicit variants.

use serde::{Deserialize, Serialize};

/// Team size family of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeFamily {
    Solo,
    Duo,
    Squad,
    /// Event and arcade modes (tdm, war, ...).
    Other,
}

/// Camera perspective of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    FirstPerson,
    ThirdPerson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMode {
    pub family: ModeFamily,
    pub perspective: Perspective,
    pub ranked: bool,
}

impl GameMode {
    /// Parse a raw mode tag from the stats API. Unknown tags map to
    /// `ModeFamily::Other` in third person.
    pub fn parse(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        let family = if tag.contains("solo") {
            ModeFamily::Solo
        } else if tag.contains("duo") {
            ModeFamily::Duo
        } else if tag.contains("squad") {
            ModeFamily::Squad
        } else {
            ModeFamily::Other
        };
        let perspective = if tag.contains("fpp") {
            Perspective::FirstPerson
        } else {
            Perspective::ThirdPerson
        };
        GameMode {
            family,
            perspective,
            ranked: tag.starts_with("ranked"),
        }
    }

    pub fn is_team_mode(&self) -> bool {
        matches!(self.family, ModeFamily::Duo | ModeFamily::Squad)
    }

    /// Human-readable label, e.g. "Ranked Squad (FPP)".
    pub fn display_name(&self) -> String {
        let family = match self.family {
            ModeFamily::Solo => "Solo",
            ModeFamily::Duo => "Duo",
            ModeFamily::Squad => "Squad",
            ModeFamily::Other => "Event",
        };
        let mut name = if self.ranked {
            format!("Ranked {family}")
        } else {
            family.to_string()
        };
        if self.perspective == Perspective::FirstPerson {
            name.push_str(" (FPP)");
        }
        name
    }
}
