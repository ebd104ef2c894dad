use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use hoopstats::analytics::{DEFAULT_BUCKET_WIDTH, RankStat, points_histogram, top_by_stat};
use hoopstats::extract::extract_table;
use hoopstats::records::{BoxScoreRow, TableKind};
use hoopstats::store;

static TEAM_PAGE_HTML: &str = include_str!("../tests/fixtures/team_page.html");

fn bench_extract_table(c: &mut Criterion) {
    c.bench_function("extract_per_game_table", |b| {
        b.iter(|| {
            let table = extract_table(black_box(TEAM_PAGE_HTML), "per_game").unwrap();
            black_box(table.rows.len());
        })
    });
}

fn bench_normalize_row(c: &mut Criterion) {
    let table = extract_table(TEAM_PAGE_HTML, "per_game").unwrap();
    c.bench_function("normalize_box_score_row", |b| {
        b.iter(|| {
            let row = BoxScoreRow::from_row(
                black_box(&table.headers),
                black_box(&table.rows[0]),
                "BOS",
                "2023",
            );
            black_box(row.pts);
        })
    });
}

fn seeded_store(players: usize) -> rusqlite::Connection {
    let conn = store::open_in_memory().unwrap();
    for idx in 0..players {
        let row = BoxScoreRow {
            player_name: format!("Player {idx}"),
            team: "BOS".to_string(),
            season: "2023".to_string(),
            pts: Some(format!("{}.{}", idx % 35, idx % 10)),
            ..Default::default()
        };
        store::insert_box_score(&conn, TableKind::PerGame, &row).unwrap();
    }
    conn
}

fn bench_points_histogram(c: &mut Criterion) {
    let conn = seeded_store(600);
    c.bench_function("points_histogram", |b| {
        b.iter(|| {
            let buckets = points_histogram(&conn, "2023", DEFAULT_BUCKET_WIDTH).unwrap();
            black_box(buckets.len());
        })
    });
}

fn bench_top_by_stat(c: &mut Criterion) {
    let conn = seeded_store(600);
    c.bench_function("top_by_points", |b| {
        b.iter(|| {
            let top = top_by_stat(&conn, RankStat::Points, "2023", 20).unwrap();
            black_box(top.len());
        })
    });
}

criterion_group!(
    perf,
    bench_extract_table,
    bench_normalize_row,
    bench_points_histogram,
    bench_top_by_stat
);
criterion_main!(perf);
