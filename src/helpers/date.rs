//! Date helper functions

use chrono::{DateTime, Datelike, FixedOffset, TimeZone};

/// Parse a publication timestamp as sent by the CMS
///
/// Accepts `2021-03-15T19:25:28+0000` as well as RFC 3339.
pub fn parse_cms_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

/// Format a date as `dd MMM yyyy` with the given month abbreviations
///
/// # Examples
/// ```ignore
/// format_day_month_year(&date, &months) // -> "15 mar 2021"
/// ```
pub fn format_day_month_year<Tz: TimeZone>(date: &DateTime<Tz>, months: &[String]) -> String {
    let month = months
        .get(date.month0() as usize)
        .cloned()
        .unwrap_or_else(|| format!("{:02}", date.month()));
    format!("{:02} {} {:04}", date.day(), month, date.year())
}
