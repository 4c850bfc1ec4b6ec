use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, Days, Local, NaiveDate};
use chrono_english::{parse_date_string, Dialect};

/// This is the standard way of converting a date to a string in crewlog.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.weekday().num_days_from_monday() as u64)
}

/// The 7 days of the Monday-start week containing `date`.
pub fn week_days(date: NaiveDate) -> [NaiveDate; 7] {
    let monday = week_start(date);
    std::array::from_fn(|i| monday + Days::new(i as u64))
}

/// Parses a user supplied date. ISO dates are tried first, then natural language like
/// "yesterday" or "15/03/2025".
pub fn parse_user_date(value: &str, now: DateTime<Local>, dialect: Dialect) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_date_string(value, now, dialect)
        .map(|v| v.date_naive())
        .map_err(|e| anyhow!("Can't parse {value} into a date: {e}"))
}
