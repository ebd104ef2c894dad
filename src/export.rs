//! Season export: one CSV + JSON file pair per (team, stats table), the
//! same per-team dumps the scraper writes alongside the database.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::Serialize;

use crate::records::{AdvancedRow, BoxScoreRow, TableKind};
use crate::store;

#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub files_written: usize,
    pub errors: Vec<String>,
}

const BOX_SCORE_FIELDS: [&str; 29] = [
    "player_name",
    "team",
    "season",
    "age",
    "games",
    "games_started",
    "minutes",
    "field_goals",
    "field_attempts",
    "field_percent",
    "three_fg",
    "three_attempts",
    "three_percent",
    "two_fg",
    "two_attempts",
    "two_percent",
    "effective_fg_percent",
    "ft",
    "fta",
    "ft_percent",
    "orb",
    "drb",
    "trb",
    "ast",
    "stl",
    "blk",
    "tov",
    "pf",
    "pts",
];

const ADVANCED_FIELDS: [&str; 26] = [
    "player_name",
    "team",
    "season",
    "age",
    "games",
    "minutes_played",
    "per",
    "ts_percent",
    "three_p_attempt_rate",
    "ft_attempt_rate",
    "orb_percent",
    "drb_percent",
    "trb_percent",
    "ast_percent",
    "stl_percent",
    "blk_percent",
    "tov_percent",
    "usg_percent",
    "ows",
    "dws",
    "ws",
    "ws_per_48",
    "obpm",
    "dbpm",
    "bpm",
    "vorp",
];

/// Dump one season's stored records to `dir`, one CSV and one JSON file per
/// (team, table) that has rows. Per-file failures accumulate in the report
/// rather than aborting the export.
pub fn export_season(conn: &Connection, dir: &Path, season: &str) -> Result<ExportReport> {
    fs::create_dir_all(dir).with_context(|| format!("create export dir {}", dir.display()))?;

    let mut report = ExportReport::default();
    for kind in TableKind::ALL {
        let result = if kind.is_advanced() {
            export_advanced_kind(conn, dir, season, kind, &mut report)
        } else {
            export_box_score_kind(conn, dir, season, kind, &mut report)
        };
        if let Err(err) = result {
            report.errors.push(format!("{}: {err}", kind.source_id()));
        }
    }
    Ok(report)
}

fn export_box_score_kind(
    conn: &Connection,
    dir: &Path,
    season: &str,
    kind: TableKind,
    report: &mut ExportReport,
) -> Result<()> {
    let sql = format!(
        "SELECT {} FROM {} WHERE season = ?1 ORDER BY team ASC, id ASC",
        store::BOX_SCORE_SELECT,
        kind.table()
    );
    let mut stmt = conn.prepare(&sql).context("prepare export query")?;
    let rows = stmt
        .query_map(params![season], store::box_score_from_row)
        .context("query export rows")?;

    let mut by_team: BTreeMap<String, Vec<BoxScoreRow>> = BTreeMap::new();
    for row in rows {
        let row = row.context("decode export row")?;
        by_team.entry(row.team.clone()).or_default().push(row);
    }

    for (team, team_rows) in &by_team {
        let cells: Vec<Vec<&str>> = team_rows.iter().map(box_score_cells).collect();
        write_pair(
            dir,
            team,
            season,
            kind,
            &BOX_SCORE_FIELDS,
            &cells,
            team_rows,
            report,
        );
    }
    Ok(())
}

fn export_advanced_kind(
    conn: &Connection,
    dir: &Path,
    season: &str,
    kind: TableKind,
    report: &mut ExportReport,
) -> Result<()> {
    let sql = format!(
        "SELECT {} FROM {} WHERE season = ?1 ORDER BY team ASC, id ASC",
        store::ADVANCED_SELECT,
        kind.table()
    );
    let mut stmt = conn.prepare(&sql).context("prepare export query")?;
    let rows = stmt
        .query_map(params![season], store::advanced_from_row)
        .context("query export rows")?;

    let mut by_team: BTreeMap<String, Vec<AdvancedRow>> = BTreeMap::new();
    for row in rows {
        let row = row.context("decode export row")?;
        by_team.entry(row.team.clone()).or_default().push(row);
    }

    for (team, team_rows) in &by_team {
        let cells: Vec<Vec<&str>> = team_rows.iter().map(advanced_cells).collect();
        write_pair(
            dir,
            team,
            season,
            kind,
            &ADVANCED_FIELDS,
            &cells,
            team_rows,
            report,
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn write_pair<T: Serialize>(
    dir: &Path,
    team: &str,
    season: &str,
    kind: TableKind,
    fields: &[&str],
    cells: &[Vec<&str>],
    rows: &[T],
    report: &mut ExportReport,
) {
    let stem = format!("{team}_{season}_{}", kind.source_id());

    let csv_path = dir.join(format!("{stem}.csv"));
    match write_atomic(&csv_path, &csv_document(fields, cells)) {
        Ok(()) => report.files_written += 1,
        Err(err) => report.errors.push(format!("{stem}.csv: {err}")),
    }

    let json_path = dir.join(format!("{stem}.json"));
    match serde_json::to_string(rows).context("serialize export rows") {
        Ok(json) => match write_atomic(&json_path, &json) {
            Ok(()) => report.files_written += 1,
            Err(err) => report.errors.push(format!("{stem}.json: {err}")),
        },
        Err(err) => report.errors.push(format!("{stem}.json: {err}")),
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

fn csv_document(fields: &[&str], rows: &[Vec<&str>]) -> String {
    let mut out = String::new();
    out.push_str(&csv_line(fields));
    out.push('\n');
    for row in rows {
        out.push_str(&csv_line(row));
        out.push('\n');
    }
    out
}

fn csv_line(cells: &[&str]) -> String {
    cells
        .iter()
        .map(|cell| csv_escape(cell))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn box_score_cells(row: &BoxScoreRow) -> Vec<&str> {
    vec![
        row.player_name.as_str(),
        row.team.as_str(),
        row.season.as_str(),
        opt(&row.age),
        opt(&row.games),
        opt(&row.games_started),
        opt(&row.minutes),
        opt(&row.field_goals),
        opt(&row.field_attempts),
        opt(&row.field_percent),
        opt(&row.three_fg),
        opt(&row.three_attempts),
        opt(&row.three_percent),
        opt(&row.two_fg),
        opt(&row.two_attempts),
        opt(&row.two_percent),
        opt(&row.effective_fg_percent),
        opt(&row.ft),
        opt(&row.fta),
        opt(&row.ft_percent),
        opt(&row.orb),
        opt(&row.drb),
        opt(&row.trb),
        opt(&row.ast),
        opt(&row.stl),
        opt(&row.blk),
        opt(&row.tov),
        opt(&row.pf),
        opt(&row.pts),
    ]
}

fn advanced_cells(row: &AdvancedRow) -> Vec<&str> {
    vec![
        row.player_name.as_str(),
        row.team.as_str(),
        row.season.as_str(),
        opt(&row.age),
        opt(&row.games),
        opt(&row.minutes_played),
        opt(&row.per),
        opt(&row.ts_percent),
        opt(&row.three_p_attempt_rate),
        opt(&row.ft_attempt_rate),
        opt(&row.orb_percent),
        opt(&row.drb_percent),
        opt(&row.trb_percent),
        opt(&row.ast_percent),
        opt(&row.stl_percent),
        opt(&row.blk_percent),
        opt(&row.tov_percent),
        opt(&row.usg_percent),
        opt(&row.ows),
        opt(&row.dws),
        opt(&row.ws),
        opt(&row.ws_per_48),
        opt(&row.obpm),
        opt(&row.dbpm),
        opt(&row.bpm),
        opt(&row.vorp),
    ]
}
