//! Calendar helpers shared by the scheduler and the CLI

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Timelike};

/// Extra days generated past the last full month of the horizon
pub const HORIZON_PADDING_DAYS: usize = 14;

/// Monday of the week containing `date`
pub fn monday_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// First day of the month `months` months after the month of `date`
///
/// Negative values step backwards.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let zero_based = date.year() * 12 + date.month0() as i32 + months;
    let year = zero_based.div_euclid(12);
    let month = zero_based.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// First and last day of a month, or `None` for an invalid month
pub fn month_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = add_months(first, 1).pred_opt()?;
    Some((first, last))
}

/// Current local time truncated to whole seconds, the precision stored on disk
pub fn local_now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Number of days generated for a horizon of `months`
pub fn horizon_days(months: u32) -> usize {
    31 * months as usize + HORIZON_PADDING_DAYS
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{raw}', expected YYYY-MM-DD"))
}

/// Parse a `YYYY-MM` month into its first and last day
pub fn parse_month(raw: &str) -> Result<(NaiveDate, NaiveDate)> {
    let (year, month) = raw
        .trim()
        .split_once('-')
        .with_context(|| format!("Invalid month '{raw}', expected YYYY-MM"))?;

    let year: i32 = year
        .parse()
        .with_context(|| format!("Invalid year in '{raw}'"))?;
    let month: u32 = month
        .parse()
        .with_context(|| format!("Invalid month in '{raw}'"))?;

    month_range(year, month).with_context(|| format!("Month out of range: '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monday_of_week() {
        assert_eq!(monday_of_week(date(2024, 1, 1)), date(2024, 1, 1));
        assert_eq!(monday_of_week(date(2024, 1, 7)), date(2024, 1, 1));
        assert_eq!(monday_of_week(date(2024, 3, 1)), date(2024, 2, 26));
    }

    #[test]
    fn test_add_months_wraps_years() {
        assert_eq!(add_months(date(2024, 1, 31), 1), date(2024, 2, 1));
        assert_eq!(add_months(date(2024, 11, 15), 3), date(2025, 2, 1));
        assert_eq!(add_months(date(2024, 1, 15), -1), date(2023, 12, 1));
    }

    #[test]
    fn test_month_range() {
        assert_eq!(month_range(2024, 2), Some((date(2024, 2, 1), date(2024, 2, 29))));
        assert_eq!(month_range(2023, 12), Some((date(2023, 12, 1), date(2023, 12, 31))));
        assert_eq!(month_range(2024, 13), None);
    }

    #[test]
    fn test_horizon_days() {
        assert_eq!(horizon_days(1), 45);
        assert_eq!(horizon_days(6), 200);
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-02").unwrap().1, date(2024, 2, 29));
        assert!(parse_month("2024/02").is_err());
        assert!(parse_month("2024-00").is_err());
        assert!(parse_date("01-01-2024").is_err());
    }
}
