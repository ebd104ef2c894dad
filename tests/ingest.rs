use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use hoopstats::analytics::{PlayerFilter, filter_players};
use hoopstats::fetch::FetchTeamPage;
use hoopstats::ingest::{TeamOutcome, ingest_season};
use hoopstats::store;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

/// Serves canned pages per team; teams in `fail` simulate a dead network,
/// everyone else without a page gets an empty document.
struct StubFetcher {
    pages: HashMap<&'static str, String>,
    fail: HashSet<&'static str>,
}

impl StubFetcher {
    fn new(pages: HashMap<&'static str, String>, fail: HashSet<&'static str>) -> Self {
        Self { pages, fail }
    }
}

impl FetchTeamPage for StubFetcher {
    fn fetch(&self, team: &str, _season: &str) -> Result<String> {
        if self.fail.contains(team) {
            anyhow::bail!("connection refused");
        }
        Ok(self
            .pages
            .get(team)
            .cloned()
            .unwrap_or_else(|| "<html><body></body></html>".to_string()))
    }
}

// The fixture page yields 3 per-game + 2 totals + 2 advanced + 1 playoff
// totals + 1 playoff advanced rows.
const RECORDS_PER_FIXTURE_PAGE: usize = 9;
const PER_GAME_ROWS_PER_FIXTURE_PAGE: usize = 3;

fn stub_with_two_teams() -> StubFetcher {
    let page = read_fixture("team_page.html");
    let pages = HashMap::from([("BOS", page.clone()), ("MEM", page)]);
    StubFetcher::new(pages, HashSet::from(["LAL"]))
}

#[test]
fn ingest_reports_per_team_outcomes_without_aborting() {
    let conn = store::open_in_memory().unwrap();
    let fetcher = stub_with_two_teams();

    let report = ingest_season(&conn, &fetcher, "2023").unwrap();

    assert_eq!(report.season, "2023");
    assert_eq!(report.teams.len(), 30);
    assert_eq!(report.teams_ok(), 2);
    assert_eq!(report.total_records, 2 * RECORDS_PER_FIXTURE_PAGE);

    let bos = report.teams.iter().find(|t| t.team == "BOS").unwrap();
    assert_eq!(bos.outcome, TeamOutcome::Ok);
    assert_eq!(bos.records_written, RECORDS_PER_FIXTURE_PAGE);
    assert!(bos.missing_tables.is_empty());

    let lal = report.teams.iter().find(|t| t.team == "LAL").unwrap();
    assert!(matches!(lal.outcome, TeamOutcome::TransportError(_)));
    assert_eq!(lal.records_written, 0);

    // Every other team got a page with no stats tables on it.
    let den = report.teams.iter().find(|t| t.team == "DEN").unwrap();
    assert_eq!(den.outcome, TeamOutcome::TableNotFound);
    assert_eq!(den.missing_tables.len(), 5);
}

#[test]
fn ingested_records_round_trip_through_the_store() {
    let conn = store::open_in_memory().unwrap();
    let fetcher = stub_with_two_teams();

    let report = ingest_season(&conn, &fetcher, "2023").unwrap();

    let per_game = filter_players(&conn, PlayerFilter::Season("2023")).unwrap();
    assert_eq!(per_game.len(), 2 * PER_GAME_ROWS_PER_FIXTURE_PAGE);
    assert!(per_game.iter().all(|r| r.season == "2023"));

    // Every kind's rows land in its own table; the report total covers all.
    let mut stored = 0usize;
    for table in [
        "per_game_stats",
        "totals_stats",
        "advanced_stats",
        "playoff_totals_stats",
        "playoff_advanced_stats",
    ] {
        let count: usize = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap();
        stored += count;
    }
    assert_eq!(stored, report.total_records);
}

#[test]
fn blank_cells_ingest_as_null_not_empty_text() {
    let conn = store::open_in_memory().unwrap();
    let fetcher = stub_with_two_teams();
    ingest_season(&conn, &fetcher, "2023").unwrap();

    let rows = filter_players(&conn, PlayerFilter::NameContains("smith")).unwrap();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|r| r.three_fg.is_none()));

    let empties: usize = conn
        .query_row(
            "SELECT COUNT(*) FROM per_game_stats WHERE three_fg = ''",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(empties, 0);
}

#[test]
fn reingesting_a_season_appends_duplicates() {
    let conn = store::open_in_memory().unwrap();
    let fetcher = stub_with_two_teams();

    let first = ingest_season(&conn, &fetcher, "2023").unwrap();
    let second = ingest_season(&conn, &fetcher, "2023").unwrap();
    assert_eq!(first.total_records, second.total_records);

    let per_game = filter_players(&conn, PlayerFilter::Season("2023")).unwrap();
    assert_eq!(per_game.len(), 4 * PER_GAME_ROWS_PER_FIXTURE_PAGE);
}

#[test]
fn every_run_is_recorded_in_ingest_runs() {
    let conn = store::open_in_memory().unwrap();
    let fetcher = stub_with_two_teams();

    ingest_season(&conn, &fetcher, "2023").unwrap();
    ingest_season(&conn, &fetcher, "2022").unwrap();

    let runs: usize = conn
        .query_row("SELECT COUNT(*) FROM ingest_runs", [], |r| r.get(0))
        .unwrap();
    assert_eq!(runs, 2);

    let (teams_total, teams_ok, finished): (i64, i64, Option<String>) = conn
        .query_row(
            "SELECT teams_total, teams_succeeded, finished_at FROM ingest_runs WHERE season = '2023'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(teams_total, 30);
    assert_eq!(teams_ok, 2);
    assert!(finished.is_some());
}

#[test]
fn historical_season_swaps_the_charlotte_code() {
    let conn = store::open_in_memory().unwrap();
    let fetcher = StubFetcher::new(HashMap::new(), HashSet::new());

    let modern = ingest_season(&conn, &fetcher, "2023").unwrap();
    assert!(modern.teams.iter().any(|t| t.team == "CHO"));
    assert!(!modern.teams.iter().any(|t| t.team == "CHA"));

    let historical = ingest_season(&conn, &fetcher, "2014").unwrap();
    assert!(historical.teams.iter().any(|t| t.team == "CHA"));
    assert!(!historical.teams.iter().any(|t| t.team == "CHO"));
}
