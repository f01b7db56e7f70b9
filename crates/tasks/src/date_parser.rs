//! Date-string parsing for task due dates.
//!
//! Accepts:
//! - ISO dates: `2026-10-19`
//! - `today`, `tomorrow`
//! - relative periods: `3 days from now`, `1 week from now`, `2 months from now`
//!
//! A month is counted as 30 days.

use chrono::{Days, NaiveDate};
use regex_lite::Regex;
use std::sync::LazyLock;

static RELATIVE_PERIOD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d+)\s*(day|week|month)s?\s*from\s*now$").ok());

/// Parse `input` relative to `today`.
pub fn parse_date_from(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }

    match input.to_lowercase().as_str() {
        "today" => return Some(today),
        "tomorrow" => return today.checked_add_days(Days::new(1)),
        _ => {}
    }

    let caps = RELATIVE_PERIOD.as_ref()?.captures(input)?;
    let count: u64 = caps[1].parse().ok()?;
    let days_per_unit = match caps[2].to_lowercase().as_str() {
        "day" => 1,
        "week" => 7,
        "month" => 30,
        _ => return None,
    };
    today.checked_add_days(Days::new(count.checked_mul(days_per_unit)?))
}
