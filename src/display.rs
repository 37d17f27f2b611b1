// Display helpers for pages: map names and placement colours.

/// Human-readable name for a map asset id such as `Baltic_Main`.
pub fn map_display_name(map_name: &str) -> &str {
    match map_name {
        "Erangel_Main" => "Erangel",
        "Baltic_Main" => "Erangel (Remastered)",
        "Desert_Main" => "Miramar",
        "Savage_Main" => "Sanhok",
        "DihorOtok_Main" => "Vikendi",
        "Summerland_Main" => "Karakin",
        "Range_Main" => "Camp Jackal",
        "Chimera_Main" => "Paramo",
        "Tiger_Main" => "Taego",
        "Heaven_Main" => "Haven",
        "Kiki_Main" => "Deston",
        "Neon_Main" => "Rondo",
        other => other,
    }
}

/// Colour for a final placement: gold, silver, bronze, then grey.
pub fn rank_color(rank: u32) -> &'static str {
    match rank {
        1 => "#FFD700",
        2..=3 => "#C0C0C0",
        4..=10 => "#CD7F32",
        _ => "#666666",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_maps() {
        assert_eq!(map_display_name("Desert_Main"), "Miramar");
        assert_eq!(map_display_name("Baltic_Main"), "Erangel (Remastered)");
    }

    #[test]
    fn test_unknown_map_passes_through() {
        assert_eq!(map_display_name("Moon_Main"), "Moon_Main");
    }

    #[test]
    fn test_rank_color() {
        assert_eq!(rank_color(1), "#FFD700");
        assert_eq!(rank_color(3), "#C0C0C0");
        assert_eq!(rank_color(10), "#CD7F32");
        assert_eq!(rank_color(11), "#666666");
        // Unplaced participants report 0.
        assert_eq!(rank_color(0), "#666666");
    }
}
