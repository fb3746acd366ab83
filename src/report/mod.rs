pub mod csv;
pub mod document;
pub mod html;

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{Cell, DailySummary, NormalizedEntry, OutputFormat, ReportMode, ReportTable};

pub const DETAILED_HEADER: [&str; 4] = ["Date", "Issue", "Hours spent", "Comment"];
pub const DAILY_HEADER: [&str; 3] = ["Date", "Hours", "Issues"];
pub const TOTAL_LABEL: &str = "Total";

/// Render hours with a decimal comma, without rounding (`1.5` -> `"1,5"`,
/// `2.0` -> `"2,0"`).
pub fn format_hours(hours: f64) -> String {
    format!("{:?}", hours).replace('.', ",")
}

/// Build the report table for `entries`, which must be sorted by day.
pub fn build_table(entries: &[NormalizedEntry], mode: ReportMode, format: OutputFormat) -> ReportTable {
    let table = match mode {
        ReportMode::Detailed => detailed(entries),
        ReportMode::Daily => daily(entries, format),
    };
    debug_assert!(table.all_rows().all(|row| row.len() == table.column_count()));
    table
}

/// One row per entry, in entry order
pub fn detailed(entries: &[NormalizedEntry]) -> ReportTable {
    let rows = entries
        .iter()
        .map(|entry| {
            vec![
                Cell::text(entry.day().format("%Y-%m-%d").to_string()),
                Cell::text(entry.issue_key.clone()),
                Cell::text(format_hours(entry.hours_spent)),
                Cell::text(entry.comment.clone()),
            ]
        })
        .collect();

    let total: f64 = entries.iter().map(|e| e.hours_spent).sum();

    ReportTable {
        header: header_row(&DETAILED_HEADER),
        rows,
        total: vec![
            Cell::text(TOTAL_LABEL),
            Cell::text(""),
            Cell::text(format_hours(total)),
            Cell::text(""),
        ],
    }
}

/// Fold entries into one summary per day, in first-seen order.
///
/// Because entries arrive sorted by day, first-seen order is ascending day
/// order; callers rely on that instead of sorting again.
pub fn daily_summaries(entries: &[NormalizedEntry]) -> Vec<DailySummary> {
    let mut summaries: Vec<DailySummary> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for entry in entries {
        let day = entry.day();
        let slot = *index.entry(day).or_insert_with(|| {
            summaries.push(DailySummary::new(day));
            summaries.len() - 1
        });
        summaries[slot].add(&entry.issue_key, entry.hours_spent);
    }

    debug_assert!(
        summaries.windows(2).all(|w| w[0].day < w[1].day),
        "entries must be sorted by day"
    );

    summaries
}

/// One row per day with summed hours and the distinct issues touched.
///
/// The total is a raw number for delimited text and a decimal-comma string
/// for the printable document.
pub fn daily(entries: &[NormalizedEntry], format: OutputFormat) -> ReportTable {
    let summaries = daily_summaries(entries);

    let rows = summaries
        .iter()
        .map(|summary| {
            vec![
                Cell::text(summary.day.format("%Y-%m-%d").to_string()),
                Cell::Number(summary.total_hours),
                Cell::text(summary.issue_keys.join(", ")),
            ]
        })
        .collect();

    let total: f64 = entries.iter().map(|e| e.hours_spent).sum();
    let total_cell = match format {
        OutputFormat::Csv => Cell::Number(total),
        OutputFormat::Document => Cell::text(format_hours(total)),
    };

    ReportTable {
        header: header_row(&DAILY_HEADER),
        rows,
        total: vec![Cell::text(TOTAL_LABEL), total_cell, Cell::text("")],
    }
}

fn header_row(labels: &[&str]) -> Vec<Cell> {
    labels.iter().map(|label| Cell::text(*label)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn entry(started: &str, issue: &str, hours: f64, comment: &str) -> NormalizedEntry {
        NormalizedEntry {
            started: DateTime::parse_from_rfc3339(started).unwrap(),
            issue_key: issue.to_string(),
            hours_spent: hours,
            comment: comment.to_string(),
        }
    }

    fn texts(row: &[Cell]) -> Vec<String> {
        row.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(1.5), "1,5");
        assert_eq!(format_hours(2.0), "2,0");
        assert_eq!(format_hours(0.25), "0,25");
        assert_eq!(format_hours(1.0 / 3.0), "0,3333333333333333");
    }

    #[test]
    fn test_detailed_example() {
        let mut entries = vec![
            entry("2024-01-02T09:00:00Z", "AB-1", 1.5, "fix"),
            entry("2024-01-01T09:00:00Z", "AB-2", 2.0, ""),
        ];
        entries.sort_by_key(|e| e.started);

        let table = detailed(&entries);

        assert_eq!(texts(&table.header), ["Date", "Issue", "Hours spent", "Comment"]);
        assert_eq!(texts(&table.rows[0]), ["2024-01-01", "AB-2", "2,0", ""]);
        assert_eq!(texts(&table.rows[1]), ["2024-01-02", "AB-1", "1,5", "fix"]);
        assert_eq!(texts(&table.total), ["Total", "", "3,5", ""]);
    }

    #[test]
    fn test_detailed_total_matches_sum() {
        let entries: Vec<NormalizedEntry> = (1..=9)
            .map(|d| entry(&format!("2024-01-0{d}T08:00:00Z"), "AB-1", d as f64 * 0.1, ""))
            .collect();
        let expected: f64 = entries.iter().map(|e| e.hours_spent).sum();

        let table = detailed(&entries);
        let total = table.total[2].to_string().replace(',', ".");

        assert!((total.parse::<f64>().unwrap() - expected).abs() < 1e-9);
        assert!(table.all_rows().all(|row| row.len() == table.column_count()));
    }

    #[test]
    fn test_detailed_empty() {
        let table = detailed(&[]);
        assert!(table.rows.is_empty());
        assert_eq!(texts(&table.total), ["Total", "", "0,0", ""]);
    }

    #[test]
    fn test_daily_example_lists_issue_once() {
        let entries = vec![
            entry("2024-01-01T09:00:00Z", "AB-1", 1.0, ""),
            entry("2024-01-01T11:00:00Z", "AB-1", 2.0, ""),
        ];

        let table = daily(&entries, OutputFormat::Csv);

        assert_eq!(texts(&table.header), ["Date", "Hours", "Issues"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(
            table.rows[0],
            vec![Cell::text("2024-01-01"), Cell::Number(3.0), Cell::text("AB-1")]
        );
        assert_eq!(table.total, vec![Cell::text("Total"), Cell::Number(3.0), Cell::text("")]);
    }

    #[test]
    fn test_daily_groups_by_day_in_order() {
        let entries = vec![
            entry("2024-01-01T09:00:00Z", "AB-2", 1.0, ""),
            entry("2024-01-01T10:00:00Z", "AB-1", 0.5, ""),
            entry("2024-01-01T12:00:00Z", "AB-2", 0.25, ""),
            entry("2024-01-03T09:00:00Z", "AB-3", 4.0, ""),
        ];

        let summaries = daily_summaries(&entries);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].issue_keys, ["AB-2", "AB-1"]);
        assert_eq!(summaries[0].total_hours, 1.75);
        assert_eq!(summaries[1].issue_keys, ["AB-3"]);

        let day_sum: f64 = summaries.iter().map(|s| s.total_hours).sum();
        let entry_sum: f64 = entries.iter().map(|e| e.hours_spent).sum();
        assert!((day_sum - entry_sum).abs() < 1e-9);

        let table = daily(&entries, OutputFormat::Csv);
        assert_eq!(texts(&table.rows[0]), ["2024-01-01", "1.75", "AB-2, AB-1"]);
        assert_eq!(texts(&table.rows[1]), ["2024-01-03", "4", "AB-3"]);
    }

    #[test]
    fn test_daily_total_for_document_uses_comma() {
        let entries = vec![
            entry("2024-01-01T09:00:00Z", "AB-1", 1.5, ""),
            entry("2024-01-02T09:00:00Z", "AB-2", 2.0, ""),
        ];

        let table = daily(&entries, OutputFormat::Document);
        assert_eq!(table.total[1], Cell::text("3,5"));
        assert_eq!(table.rows[0][1], Cell::Number(1.5));
    }

    #[test]
    fn test_build_table_dispatches_on_mode() {
        let entries = vec![entry("2024-01-01T09:00:00Z", "AB-1", 1.0, "x")];
        assert_eq!(
            build_table(&entries, ReportMode::Detailed, OutputFormat::Csv).column_count(),
            4
        );
        assert_eq!(
            build_table(&entries, ReportMode::Daily, OutputFormat::Document).column_count(),
            3
        );
    }
}
