//! Row normalization: raw header/cell pairs into typed season records.
//!
//! Stat values stay exactly as the source prints them; consumers decide how
//! to read them as numbers. A blank cell is `None`, never `""` or a zero, so
//! "did not attempt" can never be confused with "attempted zero" downstream.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The five stats tables on a team/season page and where their rows land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    PerGame,
    Totals,
    Advanced,
    PlayoffTotals,
    PlayoffAdvanced,
}

impl TableKind {
    pub const ALL: [TableKind; 5] = [
        TableKind::PerGame,
        TableKind::Totals,
        TableKind::Advanced,
        TableKind::PlayoffTotals,
        TableKind::PlayoffAdvanced,
    ];

    /// Element id of the source table on the page.
    pub fn source_id(self) -> &'static str {
        match self {
            TableKind::PerGame => "per_game",
            TableKind::Totals => "totals",
            TableKind::Advanced => "advanced",
            TableKind::PlayoffTotals => "playoffs_totals",
            TableKind::PlayoffAdvanced => "playoffs_advanced",
        }
    }

    /// Storage table the normalized rows append to.
    pub fn table(self) -> &'static str {
        match self {
            TableKind::PerGame => "per_game_stats",
            TableKind::Totals => "totals_stats",
            TableKind::Advanced => "advanced_stats",
            TableKind::PlayoffTotals => "playoff_totals_stats",
            TableKind::PlayoffAdvanced => "playoff_advanced_stats",
        }
    }

    pub fn is_advanced(self) -> bool {
        matches!(self, TableKind::Advanced | TableKind::PlayoffAdvanced)
    }
}

/// Positional header→cell map for one row. A row shorter than the header
/// list simply leaves the tail headers unmapped; they normalize to absent.
pub fn row_map<'a>(headers: &'a [String], cells: &'a [String]) -> HashMap<&'a str, &'a str> {
    headers
        .iter()
        .zip(cells.iter())
        .map(|(header, cell)| (header.as_str(), cell.as_str()))
        .collect()
}

fn cell(map: &HashMap<&str, &str>, header: &str) -> Option<String> {
    map.get(header)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Box-score shape, shared by the per-game table and both totals tables.
/// `minutes` is minutes-per-game on the per-game table and a season total on
/// the totals tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxScoreRow {
    pub player_name: String,
    pub team: String,
    pub season: String,
    pub age: Option<String>,
    pub games: Option<String>,
    pub games_started: Option<String>,
    pub minutes: Option<String>,
    pub field_goals: Option<String>,
    pub field_attempts: Option<String>,
    pub field_percent: Option<String>,
    pub three_fg: Option<String>,
    pub three_attempts: Option<String>,
    pub three_percent: Option<String>,
    pub two_fg: Option<String>,
    pub two_attempts: Option<String>,
    pub two_percent: Option<String>,
    pub effective_fg_percent: Option<String>,
    pub ft: Option<String>,
    pub fta: Option<String>,
    pub ft_percent: Option<String>,
    pub orb: Option<String>,
    pub drb: Option<String>,
    pub trb: Option<String>,
    pub ast: Option<String>,
    pub stl: Option<String>,
    pub blk: Option<String>,
    pub tov: Option<String>,
    pub pf: Option<String>,
    pub pts: Option<String>,
}

impl BoxScoreRow {
    /// Normalize one extracted row. Headers the mapping does not know are
    /// ignored; mapped headers with no cell (short row) or a blank cell come
    /// out absent. `team` and `season` are injected verbatim.
    pub fn from_row(headers: &[String], cells: &[String], team: &str, season: &str) -> Self {
        let map = row_map(headers, cells);
        Self {
            player_name: cell(&map, "Player").unwrap_or_default(),
            team: team.to_string(),
            season: season.to_string(),
            age: cell(&map, "Age"),
            games: cell(&map, "G"),
            games_started: cell(&map, "GS"),
            minutes: cell(&map, "MP"),
            field_goals: cell(&map, "FG"),
            field_attempts: cell(&map, "FGA"),
            field_percent: cell(&map, "FG%"),
            three_fg: cell(&map, "3P"),
            three_attempts: cell(&map, "3PA"),
            three_percent: cell(&map, "3P%"),
            two_fg: cell(&map, "2P"),
            two_attempts: cell(&map, "2PA"),
            two_percent: cell(&map, "2P%"),
            effective_fg_percent: cell(&map, "eFG%"),
            ft: cell(&map, "FT"),
            fta: cell(&map, "FTA"),
            ft_percent: cell(&map, "FT%"),
            orb: cell(&map, "ORB"),
            drb: cell(&map, "DRB"),
            trb: cell(&map, "TRB"),
            ast: cell(&map, "AST"),
            stl: cell(&map, "STL"),
            blk: cell(&map, "BLK"),
            tov: cell(&map, "TOV"),
            pf: cell(&map, "PF"),
            pts: cell(&map, "PTS"),
        }
    }
}

/// Advanced-stats shape, shared by the regular-season and playoff tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedRow {
    pub player_name: String,
    pub team: String,
    pub season: String,
    pub age: Option<String>,
    pub games: Option<String>,
    pub minutes_played: Option<String>,
    pub per: Option<String>,
    pub ts_percent: Option<String>,
    pub three_p_attempt_rate: Option<String>,
    pub ft_attempt_rate: Option<String>,
    pub orb_percent: Option<String>,
    pub drb_percent: Option<String>,
    pub trb_percent: Option<String>,
    pub ast_percent: Option<String>,
    pub stl_percent: Option<String>,
    pub blk_percent: Option<String>,
    pub tov_percent: Option<String>,
    pub usg_percent: Option<String>,
    pub ows: Option<String>,
    pub dws: Option<String>,
    pub ws: Option<String>,
    pub ws_per_48: Option<String>,
    pub obpm: Option<String>,
    pub dbpm: Option<String>,
    pub bpm: Option<String>,
    pub vorp: Option<String>,
}

impl AdvancedRow {
    pub fn from_row(headers: &[String], cells: &[String], team: &str, season: &str) -> Self {
        let map = row_map(headers, cells);
        Self {
            player_name: cell(&map, "Player").unwrap_or_default(),
            team: team.to_string(),
            season: season.to_string(),
            age: cell(&map, "Age"),
            games: cell(&map, "G"),
            minutes_played: cell(&map, "MP"),
            per: cell(&map, "PER"),
            ts_percent: cell(&map, "TS%"),
            three_p_attempt_rate: cell(&map, "3PAr"),
            ft_attempt_rate: cell(&map, "FTr"),
            orb_percent: cell(&map, "ORB%"),
            drb_percent: cell(&map, "DRB%"),
            trb_percent: cell(&map, "TRB%"),
            ast_percent: cell(&map, "AST%"),
            stl_percent: cell(&map, "STL%"),
            blk_percent: cell(&map, "BLK%"),
            tov_percent: cell(&map, "TOV%"),
            usg_percent: cell(&map, "USG%"),
            ows: cell(&map, "OWS"),
            dws: cell(&map, "DWS"),
            ws: cell(&map, "WS"),
            ws_per_48: cell(&map, "WS/48"),
            obpm: cell(&map, "OBPM"),
            dbpm: cell(&map, "DBPM"),
            bpm: cell(&map, "BPM"),
            vorp: cell(&map, "VORP"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn blank_cells_normalize_to_absent() {
        let headers = strs(&["Player", "Age", "G", "3P", "3PA"]);
        let cells = strs(&["J. Doe", "25", "70", "", ""]);
        let row = BoxScoreRow::from_row(&headers, &cells, "BOS", "2023");
        assert_eq!(row.player_name, "J. Doe");
        assert_eq!(row.age.as_deref(), Some("25"));
        assert_eq!(row.games.as_deref(), Some("70"));
        assert_eq!(row.three_fg, None);
        assert_eq!(row.three_attempts, None);
        assert_eq!(row.team, "BOS");
        assert_eq!(row.season, "2023");
    }

    #[test]
    fn short_rows_leave_the_tail_absent() {
        let headers = strs(&["Player", "Age", "G", "PTS"]);
        let cells = strs(&["A. Smith", "31"]);
        let row = BoxScoreRow::from_row(&headers, &cells, "MIA", "2022");
        assert_eq!(row.player_name, "A. Smith");
        assert_eq!(row.age.as_deref(), Some("31"));
        assert_eq!(row.games, None);
        assert_eq!(row.pts, None);
    }

    #[test]
    fn unknown_headers_are_ignored() {
        let headers = strs(&["Player", "Awards", "PTS"]);
        let cells = strs(&["C. Brown", "MVP-3", "28.1"]);
        let row = BoxScoreRow::from_row(&headers, &cells, "DEN", "2023");
        assert_eq!(row.player_name, "C. Brown");
        assert_eq!(row.pts.as_deref(), Some("28.1"));
    }

    #[test]
    fn advanced_mapping_covers_composite_headers() {
        let headers = strs(&["Player", "Age", "MP", "PER", "TS%", "WS/48", "VORP"]);
        let cells = strs(&["C. Center", "27", "2015", "24.5", ".621", ".212", "5.9"]);
        let row = AdvancedRow::from_row(&headers, &cells, "DEN", "2023");
        assert_eq!(row.minutes_played.as_deref(), Some("2015"));
        assert_eq!(row.ts_percent.as_deref(), Some(".621"));
        assert_eq!(row.ws_per_48.as_deref(), Some(".212"));
        assert_eq!(row.vorp.as_deref(), Some("5.9"));
    }

    #[test]
    fn missing_player_cell_is_an_empty_name() {
        let headers = strs(&["Player", "PTS"]);
        let row = BoxScoreRow::from_row(&headers, &[], "BOS", "2023");
        assert_eq!(row.player_name, "");
        assert_eq!(row.pts, None);
    }
}
