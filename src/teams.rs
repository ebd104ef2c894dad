//! Franchise codes for the 30-team league.

/// Codes as the stats site spells them for modern seasons.
const MODERN_CODES: [&str; 30] = [
    "ATL", "BOS", "BRK", "CHI", "CHO", "CLE", "DAL", "DEN", "DET", "GSW", "HOU", "IND", "LAC",
    "LAL", "MEM", "MIA", "MIL", "MIN", "NOP", "NYK", "OKC", "ORL", "PHI", "PHO", "POR", "SAC",
    "SAS", "TOR", "UTA", "WAS",
];

/// Charlotte is the one franchise whose code changed identity: CHA through
/// the 2014 season, CHO from 2015 on.
const LAST_CHA_SEASON: i32 = 2014;

pub fn charlotte_code(season_year: Option<i32>) -> &'static str {
    match season_year {
        Some(year) if year <= LAST_CHA_SEASON => "CHA",
        _ => "CHO",
    }
}

/// The 30 team codes valid for the given season (a season is named by its
/// ending year). A season that does not parse as a year falls back to the
/// modern code set.
pub fn codes_for_season(season: &str) -> Vec<&'static str> {
    let year = season.trim().parse::<i32>().ok();
    MODERN_CODES
        .iter()
        .copied()
        .map(|code| {
            if code == "CHO" {
                charlotte_code(year)
            } else {
                code
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modern_season_uses_cho() {
        let codes = codes_for_season("2023");
        assert_eq!(codes.len(), 30);
        assert!(codes.contains(&"CHO"));
        assert!(!codes.contains(&"CHA"));
    }

    #[test]
    fn bobcats_era_uses_cha() {
        let codes = codes_for_season("2014");
        assert_eq!(codes.len(), 30);
        assert!(codes.contains(&"CHA"));
        assert!(!codes.contains(&"CHO"));
    }

    #[test]
    fn boundary_flips_at_2015() {
        assert_eq!(charlotte_code(Some(2014)), "CHA");
        assert_eq!(charlotte_code(Some(2015)), "CHO");
    }

    #[test]
    fn unparseable_season_falls_back_to_modern() {
        assert!(codes_for_season("next year").contains(&"CHO"));
    }
}
