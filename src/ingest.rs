//! Season ingestion: fetch each team's page, extract every stats table,
//! normalize and append the rows, and report per-team outcomes.
//!
//! The loop is strictly sequential and never aborts early: a fetch failure
//! or a missing table costs that team (or that table) only, and a storage
//! failure costs that record only. Nothing written earlier is rolled back.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::extract::extract_table;
use crate::fetch::FetchTeamPage;
use crate::records::{AdvancedRow, BoxScoreRow, TableKind};
use crate::store;
use crate::teams;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamOutcome {
    Ok,
    /// Page fetched but none of the stats tables were present.
    TableNotFound,
    TransportError(String),
}

#[derive(Debug, Clone)]
pub struct TeamReport {
    pub team: String,
    pub outcome: TeamOutcome,
    pub records_written: usize,
    /// Source ids of tables absent from the page. Playoff tables missing for
    /// a team that did not make the playoffs is the normal case.
    pub missing_tables: Vec<&'static str>,
    pub storage_errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct IngestReport {
    pub season: String,
    pub teams: Vec<TeamReport>,
    pub total_records: usize,
}

impl IngestReport {
    pub fn teams_ok(&self) -> usize {
        self.teams
            .iter()
            .filter(|t| t.outcome == TeamOutcome::Ok)
            .count()
    }

    pub fn errors(&self) -> Vec<String> {
        let mut out = Vec::new();
        for team in &self.teams {
            if let TeamOutcome::TransportError(msg) = &team.outcome {
                out.push(format!("{}: {msg}", team.team));
            }
            out.extend(team.storage_errors.iter().cloned());
        }
        out
    }
}

/// Ingest one season across the full set of team codes. One page fetch per
/// team; all five stats tables are extracted from that single page.
pub fn ingest_season(
    conn: &Connection,
    fetcher: &dyn FetchTeamPage,
    season: &str,
) -> Result<IngestReport> {
    let codes = teams::codes_for_season(season);

    let started_at = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO ingest_runs(started_at, finished_at, season, teams_total, teams_succeeded, records_written, errors_json)
         VALUES (?1, NULL, ?2, ?3, 0, 0, '[]')",
        params![started_at, season, codes.len() as i64],
    )
    .context("insert ingest run")?;
    let run_id = conn.last_insert_rowid();

    let mut team_reports = Vec::with_capacity(codes.len());
    let mut total_records = 0usize;
    for code in codes {
        let report = ingest_team(conn, fetcher, code, season);
        total_records += report.records_written;
        team_reports.push(report);
    }

    let report = IngestReport {
        season: season.to_string(),
        teams: team_reports,
        total_records,
    };

    let errors_json = serde_json::to_string(&report.errors()).unwrap_or_else(|_| "[]".to_string());
    let finished_at = Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE ingest_runs
         SET finished_at = ?1, teams_succeeded = ?2, records_written = ?3, errors_json = ?4
         WHERE run_id = ?5",
        params![
            finished_at,
            report.teams_ok() as i64,
            report.total_records as i64,
            errors_json,
            run_id
        ],
    )
    .context("update ingest run")?;

    Ok(report)
}

fn ingest_team(
    conn: &Connection,
    fetcher: &dyn FetchTeamPage,
    team: &str,
    season: &str,
) -> TeamReport {
    let html = match fetcher.fetch(team, season) {
        Ok(html) => html,
        Err(err) => {
            return TeamReport {
                team: team.to_string(),
                outcome: TeamOutcome::TransportError(err.to_string()),
                records_written: 0,
                missing_tables: Vec::new(),
                storage_errors: Vec::new(),
            };
        }
    };

    let mut records_written = 0usize;
    let mut missing_tables = Vec::new();
    let mut storage_errors = Vec::new();
    let mut any_table = false;

    for kind in TableKind::ALL {
        let Some(table) = extract_table(&html, kind.source_id()) else {
            missing_tables.push(kind.source_id());
            continue;
        };
        any_table = true;
        for cells in &table.rows {
            let result = if kind.is_advanced() {
                let row = AdvancedRow::from_row(&table.headers, cells, team, season);
                store::insert_advanced(conn, kind, &row)
            } else {
                let row = BoxScoreRow::from_row(&table.headers, cells, team, season);
                store::insert_box_score(conn, kind, &row)
            };
            match result {
                Ok(()) => records_written += 1,
                Err(err) => {
                    storage_errors.push(format!("{team}/{}: {err}", kind.source_id()));
                }
            }
        }
    }

    let outcome = if any_table {
        TeamOutcome::Ok
    } else {
        TeamOutcome::TableNotFound
    };
    TeamReport {
        team: team.to_string(),
        outcome,
        records_written,
        missing_tables,
        storage_errors,
    }
}
