//! SQLite persistence. Stat tables are append-only: ingestion only ever
//! inserts, re-running a season appends duplicates, and nothing in the crate
//! updates or deletes a stored record.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, Row, params};

use crate::records::{AdvancedRow, BoxScoreRow, TableKind};

const BOX_SCORE_COLUMNS_DDL: &str = "\
    age TEXT NULL,
    games TEXT NULL,
    games_started TEXT NULL,
    minutes TEXT NULL,
    field_goals TEXT NULL,
    field_attempts TEXT NULL,
    field_percent TEXT NULL,
    three_fg TEXT NULL,
    three_attempts TEXT NULL,
    three_percent TEXT NULL,
    two_fg TEXT NULL,
    two_attempts TEXT NULL,
    two_percent TEXT NULL,
    effective_fg_percent TEXT NULL,
    ft TEXT NULL,
    fta TEXT NULL,
    ft_percent TEXT NULL,
    orb TEXT NULL,
    drb TEXT NULL,
    trb TEXT NULL,
    ast TEXT NULL,
    stl TEXT NULL,
    blk TEXT NULL,
    tov TEXT NULL,
    pf TEXT NULL,
    pts TEXT NULL";

const ADVANCED_COLUMNS_DDL: &str = "\
    age TEXT NULL,
    games TEXT NULL,
    minutes_played TEXT NULL,
    per TEXT NULL,
    ts_percent TEXT NULL,
    three_p_attempt_rate TEXT NULL,
    ft_attempt_rate TEXT NULL,
    orb_percent TEXT NULL,
    drb_percent TEXT NULL,
    trb_percent TEXT NULL,
    ast_percent TEXT NULL,
    stl_percent TEXT NULL,
    blk_percent TEXT NULL,
    tov_percent TEXT NULL,
    usg_percent TEXT NULL,
    ows TEXT NULL,
    dws TEXT NULL,
    ws TEXT NULL,
    ws_per_48 TEXT NULL,
    obpm TEXT NULL,
    dbpm TEXT NULL,
    bpm TEXT NULL,
    vorp TEXT NULL";

const INGEST_RUNS_DDL: &str = "\
CREATE TABLE IF NOT EXISTS ingest_runs (
    run_id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT NULL,
    season TEXT NOT NULL,
    teams_total INTEGER NOT NULL,
    teams_succeeded INTEGER NOT NULL,
    records_written INTEGER NOT NULL,
    errors_json TEXT NOT NULL
);
";

/// Column list shared by every box-score SELECT; `box_score_from_row` reads
/// positionally in this order.
pub const BOX_SCORE_SELECT: &str = "player_name, team, season, age, games, games_started, \
    minutes, field_goals, field_attempts, field_percent, three_fg, three_attempts, \
    three_percent, two_fg, two_attempts, two_percent, effective_fg_percent, ft, fta, \
    ft_percent, orb, drb, trb, ast, stl, blk, tov, pf, pts";

pub const ADVANCED_SELECT: &str = "player_name, team, season, age, games, minutes_played, \
    per, ts_percent, three_p_attempt_rate, ft_attempt_rate, orb_percent, drb_percent, \
    trb_percent, ast_percent, stl_percent, blk_percent, tov_percent, usg_percent, ows, dws, \
    ws, ws_per_48, obpm, dbpm, bpm, vorp";

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    let mut ddl = String::from("PRAGMA journal_mode = WAL;\n");
    for kind in TableKind::ALL {
        let columns = if kind.is_advanced() {
            ADVANCED_COLUMNS_DDL
        } else {
            BOX_SCORE_COLUMNS_DDL
        };
        let table = kind.table();
        ddl.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n\
             \x20   id INTEGER PRIMARY KEY AUTOINCREMENT,\n\
             \x20   player_name TEXT NOT NULL,\n\
             \x20   team TEXT NOT NULL,\n\
             \x20   season TEXT NOT NULL,\n\
             {columns}\n\
             );\n\
             CREATE INDEX IF NOT EXISTS idx_{table}_season ON {table}(season);\n\
             CREATE INDEX IF NOT EXISTS idx_{table}_player ON {table}(player_name);\n"
        ));
    }
    ddl.push_str(INGEST_RUNS_DDL);
    conn.execute_batch(&ddl).context("create sqlite schema")?;
    Ok(())
}

pub fn insert_box_score(conn: &Connection, kind: TableKind, row: &BoxScoreRow) -> Result<()> {
    debug_assert!(!kind.is_advanced());
    let sql = format!(
        "INSERT INTO {} ({BOX_SCORE_SELECT}) VALUES (\
         ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, \
         ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29)",
        kind.table()
    );
    conn.execute(
        &sql,
        params![
            row.player_name,
            row.team,
            row.season,
            row.age,
            row.games,
            row.games_started,
            row.minutes,
            row.field_goals,
            row.field_attempts,
            row.field_percent,
            row.three_fg,
            row.three_attempts,
            row.three_percent,
            row.two_fg,
            row.two_attempts,
            row.two_percent,
            row.effective_fg_percent,
            row.ft,
            row.fta,
            row.ft_percent,
            row.orb,
            row.drb,
            row.trb,
            row.ast,
            row.stl,
            row.blk,
            row.tov,
            row.pf,
            row.pts,
        ],
    )
    .with_context(|| format!("insert into {}", kind.table()))?;
    Ok(())
}

pub fn insert_advanced(conn: &Connection, kind: TableKind, row: &AdvancedRow) -> Result<()> {
    debug_assert!(kind.is_advanced());
    let sql = format!(
        "INSERT INTO {} ({ADVANCED_SELECT}) VALUES (\
         ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, \
         ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)",
        kind.table()
    );
    conn.execute(
        &sql,
        params![
            row.player_name,
            row.team,
            row.season,
            row.age,
            row.games,
            row.minutes_played,
            row.per,
            row.ts_percent,
            row.three_p_attempt_rate,
            row.ft_attempt_rate,
            row.orb_percent,
            row.drb_percent,
            row.trb_percent,
            row.ast_percent,
            row.stl_percent,
            row.blk_percent,
            row.tov_percent,
            row.usg_percent,
            row.ows,
            row.dws,
            row.ws,
            row.ws_per_48,
            row.obpm,
            row.dbpm,
            row.bpm,
            row.vorp,
        ],
    )
    .with_context(|| format!("insert into {}", kind.table()))?;
    Ok(())
}

pub fn box_score_from_row(row: &Row<'_>) -> rusqlite::Result<BoxScoreRow> {
    Ok(BoxScoreRow {
        player_name: row.get(0)?,
        team: row.get(1)?,
        season: row.get(2)?,
        age: row.get(3)?,
        games: row.get(4)?,
        games_started: row.get(5)?,
        minutes: row.get(6)?,
        field_goals: row.get(7)?,
        field_attempts: row.get(8)?,
        field_percent: row.get(9)?,
        three_fg: row.get(10)?,
        three_attempts: row.get(11)?,
        three_percent: row.get(12)?,
        two_fg: row.get(13)?,
        two_attempts: row.get(14)?,
        two_percent: row.get(15)?,
        effective_fg_percent: row.get(16)?,
        ft: row.get(17)?,
        fta: row.get(18)?,
        ft_percent: row.get(19)?,
        orb: row.get(20)?,
        drb: row.get(21)?,
        trb: row.get(22)?,
        ast: row.get(23)?,
        stl: row.get(24)?,
        blk: row.get(25)?,
        tov: row.get(26)?,
        pf: row.get(27)?,
        pts: row.get(28)?,
    })
}

pub fn advanced_from_row(row: &Row<'_>) -> rusqlite::Result<AdvancedRow> {
    Ok(AdvancedRow {
        player_name: row.get(0)?,
        team: row.get(1)?,
        season: row.get(2)?,
        age: row.get(3)?,
        games: row.get(4)?,
        minutes_played: row.get(5)?,
        per: row.get(6)?,
        ts_percent: row.get(7)?,
        three_p_attempt_rate: row.get(8)?,
        ft_attempt_rate: row.get(9)?,
        orb_percent: row.get(10)?,
        drb_percent: row.get(11)?,
        trb_percent: row.get(12)?,
        ast_percent: row.get(13)?,
        stl_percent: row.get(14)?,
        blk_percent: row.get(15)?,
        tov_percent: row.get(16)?,
        usg_percent: row.get(17)?,
        ows: row.get(18)?,
        dws: row.get(19)?,
        ws: row.get(20)?,
        ws_per_48: row.get(21)?,
        obpm: row.get(22)?,
        dbpm: row.get(23)?,
        bpm: row.get(24)?,
        vorp: row.get(25)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_box_score_row() {
        let conn = open_in_memory().unwrap();
        let row = BoxScoreRow {
            player_name: "J. Doe".to_string(),
            team: "BOS".to_string(),
            season: "2023".to_string(),
            pts: Some("11.5".to_string()),
            three_fg: None,
            ..Default::default()
        };
        insert_box_score(&conn, TableKind::PerGame, &row).unwrap();

        let sql = format!("SELECT {BOX_SCORE_SELECT} FROM per_game_stats");
        let mut stmt = conn.prepare(&sql).unwrap();
        let stored = stmt
            .query_map([], box_score_from_row)
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(stored, row);
    }

    #[test]
    fn round_trips_an_advanced_row() {
        let conn = open_in_memory().unwrap();
        let row = AdvancedRow {
            player_name: "C. Center".to_string(),
            team: "DEN".to_string(),
            season: "2023".to_string(),
            ws: Some("12.4".to_string()),
            ws_per_48: Some(".295".to_string()),
            ..Default::default()
        };
        insert_advanced(&conn, TableKind::PlayoffAdvanced, &row).unwrap();

        let sql = format!("SELECT {ADVANCED_SELECT} FROM playoff_advanced_stats");
        let mut stmt = conn.prepare(&sql).unwrap();
        let stored = stmt
            .query_map([], advanced_from_row)
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(stored, row);
    }

    #[test]
    fn reingestion_appends_rather_than_replacing() {
        let conn = open_in_memory().unwrap();
        let row = BoxScoreRow {
            player_name: "J. Doe".to_string(),
            team: "BOS".to_string(),
            season: "2023".to_string(),
            ..Default::default()
        };
        insert_box_score(&conn, TableKind::Totals, &row).unwrap();
        insert_box_score(&conn, TableKind::Totals, &row).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM totals_stats", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
