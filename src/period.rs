use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, Local, Locale, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt;

/// First day of the month from which the current month is reported instead
/// of the previous one.
pub const CURRENT_MONTH_FROM_DAY: u32 = 16;

/// Inclusive range of calendar days covered by a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Pick the period for a report generated on `today`.
    ///
    /// From the 16th on the current month up to `today` is reported; before
    /// that, the whole previous month.
    pub fn for_today(today: NaiveDate) -> Self {
        let first_of_month = today.with_day(1).unwrap_or(today);
        if today.day() >= CURRENT_MONTH_FROM_DAY {
            return Self::new(first_of_month, today);
        }

        let end = first_of_month.pred_opt().unwrap_or(first_of_month);
        let start = end.with_day(1).unwrap_or(end);
        Self::new(start, end)
    }

    /// The whole calendar month `year`-`month`
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).context("Invalid month")?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .context("Invalid month")?;

        Ok(Self::new(start, next - Duration::days(1)))
    }

    /// Parse `YYYY-MM` into the whole month
    pub fn parse_month(month_str: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", month_str), "%Y-%m-%d")
            .with_context(|| format!("Invalid month format: {}. Expected YYYY-MM", month_str))?;

        Self::month(date.year(), date.month())
    }

    /// Local midnight at the start of the period
    pub fn start_utc(&self) -> DateTime<Utc> {
        local_midnight(self.start)
    }

    /// Local midnight after the last day of the period
    pub fn end_exclusive_utc(&self) -> DateTime<Utc> {
        local_midnight(self.end + Duration::days(1))
    }

    /// Month and year of the period start, e.g. "Januar 2024" for `de_DE`
    pub fn month_label(&self, locale: Locale) -> String {
        self.start.format_localized("%B %Y", locale).to_string()
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

fn local_midnight(day: NaiveDate) -> DateTime<Utc> {
    let naive: NaiveDateTime = day.and_time(chrono::NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}
