//! Stats-table extraction from a raw team/season page.

use scraper::{ElementRef, Html, Selector};

/// One extracted stats table: column headers with the leading rank column
/// removed, and body rows as trimmed cell text in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Locate the table with the given element id. `None` means the page carries
/// no such table, which callers treat as "no data for this team/season",
/// never as a failure.
pub fn extract_table(html: &str, table_id: &str) -> Option<StatTable> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse(&format!("table#{table_id}")).ok()?;
    let table = document.select(&table_sel).next()?;

    let header_row_sel = Selector::parse("thead tr").ok()?;
    let th_sel = Selector::parse("th").ok()?;
    let body_row_sel = Selector::parse("tbody tr").ok()?;
    let td_sel = Selector::parse("td").ok()?;

    // The first header cell is the rank column; data rows carry rank as a
    // th, not a td, so the remaining headers line up with the td cells.
    let headers: Vec<String> = table
        .select(&header_row_sel)
        .next()
        .map(|row| cell_texts(row, &th_sel))
        .unwrap_or_default()
        .into_iter()
        .skip(1)
        .collect();

    let mut rows = Vec::new();
    for row in table.select(&body_row_sel) {
        let cells = cell_texts(row, &td_sel);
        // Embedded header-repeat rows have no data cells.
        if cells.is_empty() {
            continue;
        }
        rows.push(cells);
    }

    Some(StatTable { headers, rows })
}

fn cell_texts(row: ElementRef<'_>, sel: &Selector) -> Vec<String> {
    row.select(sel)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}
