use chrono::{DateTime, FixedOffset, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A worklog reduced to what the report shows
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEntry {
    pub started: DateTime<FixedOffset>,
    pub issue_key: String,
    pub hours_spent: f64,
    pub comment: String,
}

impl NormalizedEntry {
    /// Calendar day of the entry in the reporting timezone
    pub fn day(&self) -> NaiveDate {
        self.started.date_naive()
    }
}

/// Hours and distinct issues of one calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub day: NaiveDate,
    pub total_hours: f64,
    pub issue_keys: Vec<String>,
}

impl DailySummary {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            total_hours: 0.0,
            issue_keys: Vec::new(),
        }
    }

    /// Add an entry's hours; the issue key is recorded once, in first-seen order.
    pub fn add(&mut self, issue_key: &str, hours: f64) {
        self.total_hours += hours;
        if !self.issue_keys.iter().any(|k| k == issue_key) {
            self.issue_keys.push(issue_key.to_string());
        }
    }
}

/// A single table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

pub type ReportRow = Vec<Cell>;

/// Header row, data rows and a closing total row
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub header: ReportRow,
    pub rows: Vec<ReportRow>,
    pub total: ReportRow,
}

impl ReportTable {
    /// All rows in output order: header, data, total
    pub fn all_rows(&self) -> impl Iterator<Item = &ReportRow> {
        std::iter::once(&self.header)
            .chain(self.rows.iter())
            .chain(std::iter::once(&self.total))
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

/// How worklog entries are grouped into rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// One row per worklog entry
    Detailed,
    /// One row per calendar day
    Daily,
}

impl ReportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportMode::Detailed => "detailed",
            ReportMode::Daily => "daily",
        }
    }
}

/// Where the table ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Delimited text on stdout
    Csv,
    /// Printable document written to the output file
    Document,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Document => "document",
        }
    }
}
