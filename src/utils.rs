use crate::error::{InsightError, Result};
use chrono::{Datelike, NaiveDate};
use serde_json::Value;

/// Parses a strict `YYYY-MM` month label into the first day of that month.
pub fn parse_year_month(label: &str) -> Result<NaiveDate> {
    let bytes = label.as_bytes();
    let well_formed = bytes.len() == 7
        && bytes[4] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || b.is_ascii_digit());

    if !well_formed {
        return Err(InsightError::InvalidInput(format!(
            "Month '{}' is not in YYYY-MM format",
            label
        )));
    }

    NaiveDate::parse_from_str(&format!("{}-01", label), "%Y-%m-%d")
        .map_err(|e| InsightError::InvalidInput(format!("Month '{}' is invalid: {}", label, e)))
}

pub fn format_year_month(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// First day of the month following `date`.
pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    let year = if date.month() == 12 {
        date.year() + 1
    } else {
        date.year()
    };

    let month = if date.month() == 12 {
        1
    } else {
        date.month() + 1
    };

    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// `count` consecutive month labels starting right after `last`.
pub fn months_after(last: NaiveDate, count: usize) -> Vec<String> {
    let mut months = Vec::with_capacity(count);
    let mut current = last;
    for _ in 0..count {
        current = next_month_start(current);
        months.push(format_year_month(current));
    }
    months
}

/// Latest `month` found in a JSON array of historical records.
///
/// Returns `None` when the data is not an array or carries no parseable month labels.
pub fn latest_historical_month(historical_data: &str) -> Option<NaiveDate> {
    let value: Value = serde_json::from_str(historical_data).ok()?;
    value
        .as_array()?
        .iter()
        .filter_map(|record| record.get("month").and_then(Value::as_str))
        .filter_map(|label| parse_year_month(label).ok())
        .max()
}
