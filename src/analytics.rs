//! Read-side aggregation over the stored season records.
//!
//! Every operation is a pure function of current store contents. An empty
//! store yields an empty result, never an error, and malformed numeric text
//! is sunk or skipped per operation instead of surfacing to the caller.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::records::BoxScoreRow;
use crate::store;

pub const DEFAULT_TOP_N: usize = 20;
pub const DEFAULT_BUCKET_WIDTH: u32 = 5;
pub const DEFAULT_TOP_SCORERS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerFilter<'a> {
    Team(&'a str),
    Season(&'a str),
    /// Case-insensitive substring match on the player name.
    NameContains(&'a str),
}

/// Per-game records matching the filter, in insertion order.
pub fn filter_players(conn: &Connection, filter: PlayerFilter<'_>) -> Result<Vec<BoxScoreRow>> {
    let (predicate, value) = match filter {
        PlayerFilter::Team(team) => ("team = ?1", team),
        PlayerFilter::Season(season) => ("season = ?1", season),
        PlayerFilter::NameContains(needle) => ("instr(lower(player_name), lower(?1)) > 0", needle),
    };
    let sql = format!(
        "SELECT {} FROM per_game_stats WHERE {predicate} ORDER BY id ASC",
        store::BOX_SCORE_SELECT
    );
    let mut stmt = conn.prepare(&sql).context("prepare player filter query")?;
    let rows = stmt
        .query_map(params![value], store::box_score_from_row)
        .context("query player filter")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode player row")?);
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankStat {
    Points,
    Assists,
    TotalRebounds,
    Blocks,
    Steals,
    OffensiveRebounds,
    DefensiveRebounds,
}

impl RankStat {
    fn cell(self, row: &BoxScoreRow) -> Option<&str> {
        let cell = match self {
            RankStat::Points => &row.pts,
            RankStat::Assists => &row.ast,
            RankStat::TotalRebounds => &row.trb,
            RankStat::Blocks => &row.blk,
            RankStat::Steals => &row.stl,
            RankStat::OffensiveRebounds => &row.orb,
            RankStat::DefensiveRebounds => &row.drb,
        };
        cell.as_deref()
    }
}

/// Top `n` per-game records for the season, ranked descending by the chosen
/// stat. A value that does not parse as a number sinks below every parseable
/// one; ties keep storage order (the sort is stable).
pub fn top_by_stat(
    conn: &Connection,
    stat: RankStat,
    season: &str,
    n: usize,
) -> Result<Vec<BoxScoreRow>> {
    let mut rows = filter_players(conn, PlayerFilter::Season(season))?;
    rows.sort_by(|a, b| {
        rank_value(b, stat)
            .partial_cmp(&rank_value(a, stat))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.truncate(n);
    Ok(rows)
}

fn rank_value(row: &BoxScoreRow, stat: RankStat) -> f64 {
    stat.cell(row)
        .and_then(|value| value.trim().parse::<f64>().ok())
        .unwrap_or(f64::NEG_INFINITY)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonTrend {
    pub season: String,
    pub avg_three_made: Option<f64>,
    pub avg_three_attempts: Option<f64>,
    pub avg_two_made: Option<f64>,
    pub avg_two_attempts: Option<f64>,
}

/// League-wide shooting mix per season, ascending by season. A cell
/// contributes to a mean only if it parses as a number; a stat with no
/// parseable cells in a season averages to `None`, and a season with no
/// per-game records at all is omitted entirely.
pub fn season_shooting_trends(conn: &Connection) -> Result<Vec<SeasonTrend>> {
    let mut stmt = conn
        .prepare(
            "SELECT season, three_fg, three_attempts, two_fg, two_attempts FROM per_game_stats",
        )
        .context("prepare season trends query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })
        .context("query season trends")?;

    #[derive(Default)]
    struct SeasonAcc {
        three_made: MeanAcc,
        three_attempts: MeanAcc,
        two_made: MeanAcc,
        two_attempts: MeanAcc,
    }

    let mut seasons: BTreeMap<String, SeasonAcc> = BTreeMap::new();
    for row in rows {
        let (season, three_fg, three_attempts, two_fg, two_attempts) =
            row.context("decode season trends row")?;
        let acc = seasons.entry(season).or_default();
        acc.three_made.push(three_fg.as_deref());
        acc.three_attempts.push(three_attempts.as_deref());
        acc.two_made.push(two_fg.as_deref());
        acc.two_attempts.push(two_attempts.as_deref());
    }

    Ok(seasons
        .into_iter()
        .map(|(season, acc)| SeasonTrend {
            season,
            avg_three_made: acc.three_made.mean(),
            avg_three_attempts: acc.three_attempts.mean(),
            avg_two_made: acc.two_made.mean(),
            avg_two_attempts: acc.two_attempts.mean(),
        })
        .collect())
}

#[derive(Default)]
struct MeanAcc {
    sum: f64,
    count: usize,
}

impl MeanAcc {
    fn push(&mut self, cell: Option<&str>) {
        let Some(value) = cell.and_then(|v| v.trim().parse::<f64>().ok()) else {
            return;
        };
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub range: String,
    pub count: usize,
}

/// Fixed-width histogram of per-player points per game for one season.
/// A player lands at the first bucket edge at or above their value, so the
/// buckets read `(lower, upper]` and anyone at exactly zero falls below the
/// first edge and is not counted. Non-parseable PTS cells are skipped.
/// Only non-empty buckets are returned, ascending by lower edge.
pub fn points_histogram(
    conn: &Connection,
    season: &str,
    bucket_width: u32,
) -> Result<Vec<HistogramBucket>> {
    if bucket_width == 0 {
        return Ok(Vec::new());
    }
    let mut stmt = conn
        .prepare("SELECT pts FROM per_game_stats WHERE season = ?1")
        .context("prepare histogram query")?;
    let rows = stmt
        .query_map(params![season], |row| row.get::<_, Option<String>>(0))
        .context("query histogram points")?;

    let width = i64::from(bucket_width);
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for row in rows {
        let Some(cell) = row.context("decode histogram row")? else {
            continue;
        };
        let Ok(ppg) = cell.trim().parse::<f64>() else {
            continue;
        };
        if ppg <= 0.0 {
            continue;
        }
        // First multiple of the width at or above the value.
        let upper = (ppg / width as f64).ceil() as i64 * width;
        *counts.entry(upper - width).or_default() += 1;
    }

    Ok(counts
        .into_iter()
        .map(|(lower, count)| HistogramBucket {
            range: format!("{lower}-{}", lower + width),
            count,
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeriesPoint {
    pub season: String,
    pub total_pts: f64,
    pub total_ws: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeries {
    pub player_name: String,
    pub seasons: Vec<PlayerSeriesPoint>,
}

const TOP_SCORERS_SQL: &str = "\
WITH career AS (
    SELECT player_name, SUM(CAST(pts AS REAL)) AS career_pts
    FROM totals_stats
    GROUP BY player_name
    ORDER BY career_pts DESC, player_name ASC
    LIMIT ?1
),
season_pts AS (
    SELECT t.player_name, t.season, SUM(CAST(t.pts AS REAL)) AS season_pts
    FROM totals_stats t
    JOIN career c ON c.player_name = t.player_name
    GROUP BY t.player_name, t.season
),
season_ws AS (
    SELECT player_name, season, SUM(CAST(ws AS REAL)) AS season_ws
    FROM advanced_stats
    GROUP BY player_name, season
)
SELECT c.player_name, p.season, p.season_pts, w.season_ws
FROM career c
JOIN season_pts p ON p.player_name = c.player_name
LEFT JOIN season_ws w ON w.player_name = p.player_name AND w.season = p.season
ORDER BY c.career_pts DESC, c.player_name ASC, p.season ASC";

/// The `top_k` career scoring leaders (by summed season-total points), each
/// with one (points, win shares) pair per season, seasons ascending. Win
/// shares come from the advanced table via a left join: a player-season with
/// no advanced record carries `total_ws: None`, not zero. Career-total ties
/// break by name so the cut at `top_k` is deterministic.
pub fn top_scorers_series(conn: &Connection, top_k: usize) -> Result<Vec<PlayerSeries>> {
    let mut stmt = conn
        .prepare(TOP_SCORERS_SQL)
        .context("prepare top scorers query")?;
    let rows = stmt
        .query_map(params![top_k as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<f64>>(2)?,
                row.get::<_, Option<f64>>(3)?,
            ))
        })
        .context("query top scorers")?;

    let mut out: Vec<PlayerSeries> = Vec::new();
    for row in rows {
        let (player_name, season, season_pts, season_ws) =
            row.context("decode top scorers row")?;
        let point = PlayerSeriesPoint {
            season,
            total_pts: season_pts.unwrap_or(0.0),
            total_ws: season_ws,
        };
        match out.last_mut() {
            Some(series) if series.player_name == player_name => series.seasons.push(point),
            _ => out.push(PlayerSeries {
                player_name,
                seasons: vec![point],
            }),
        }
    }
    Ok(out)
}
