use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use hoopstats::export;
use hoopstats::fetch::{DEFAULT_BASE_URL, SportsRefClient};
use hoopstats::ingest::{self, TeamOutcome};
use hoopstats::store;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let db_path = parse_path_arg("--db")
        .or_else(|| env_path("HOOPSTATS_DB"))
        .unwrap_or_else(|| PathBuf::from("hoopstats.sqlite"));
    let base_url = std::env::var("HOOPSTATS_BASE_URL")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let season = match parse_value_arg("--season") {
        Some(season) => season,
        None => prompt_season()?,
    };
    if season.is_empty() {
        return Err(anyhow::anyhow!("no season given"));
    }

    let conn = store::open_db(&db_path)?;
    let fetcher = SportsRefClient::new(base_url);
    let report = ingest::ingest_season(&conn, &fetcher, &season)?;

    println!("Ingest complete for season {}", report.season);
    println!("DB: {}", db_path.display());
    println!("Teams ok: {}/{}", report.teams_ok(), report.teams.len());
    println!("Records written: {}", report.total_records);
    for team in &report.teams {
        match &team.outcome {
            TeamOutcome::Ok => {
                println!("{}: {} records", team.team, team.records_written);
                if !team.missing_tables.is_empty() {
                    println!("  missing tables: {}", team.missing_tables.join(", "));
                }
            }
            TeamOutcome::TableNotFound => {
                println!("{}: no stats tables on page", team.team);
            }
            TeamOutcome::TransportError(msg) => {
                println!("{}: fetch failed: {msg}", team.team);
            }
        }
        for err in team.storage_errors.iter().take(6) {
            println!("  storage error: {err}");
        }
    }

    if let Some(dir) = parse_path_arg("--export-dir") {
        let export_report = export::export_season(&conn, &dir, &season)?;
        println!(
            "Exported {} files to {}",
            export_report.files_written,
            dir.display()
        );
        for err in export_report.errors.iter().take(6) {
            println!("  export error: {err}");
        }
    }

    Ok(())
}

fn prompt_season() -> Result<String> {
    print!("What season? ");
    io::stdout().flush().context("flush season prompt")?;
    let mut season = String::new();
    io::stdin()
        .read_line(&mut season)
        .context("read season from stdin")?;
    Ok(season.trim().to_string())
}

fn parse_value_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    parse_value_arg(name).map(PathBuf::from)
}

fn env_path(key: &str) -> Option<PathBuf> {
    let raw = std::env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}
