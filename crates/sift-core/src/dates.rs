use once_cell::sync::Lazy;
use regex::Regex;
use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime};
use tracing::warn;

/// Explicit due-date markers followed by a numeric month/day/year date.
static DUE_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:due|by|before|deadline)\b:?\s*(\d{1,2}/\d{1,2}/\d{2,4}|\d{1,2}-\d{1,2}-\d{2,4})\b",
    )
    .expect("valid due marker regex")
});

/// Find the first explicit due date in `text`.
///
/// Dates read month first and resolve to midnight UTC. A marker followed by an
/// impossible date (13/45/2024) yields `None` rather than an error.
pub fn find_due_date(text: &str) -> Option<OffsetDateTime> {
    let token = DUE_MARKER_RE.captures(text)?.get(1)?.as_str();
    let parsed = parse_numeric_date(token);
    if parsed.is_none() {
        warn!(token, "ignoring unparseable due date");
    }
    parsed
}

/// Parse `M/D/Y` or `M-D-Y`; two-digit years below 50 land in 2000-2049.
pub fn parse_numeric_date(token: &str) -> Option<OffsetDateTime> {
    let separator = if token.contains('/') { '/' } else { '-' };
    let mut parts = token.trim().split(separator);
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    let year_raw = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let year: i32 = year_raw.parse().ok()?;
    let year = match year_raw.len() {
        2 if year < 50 => 2000 + year,
        2 => 1900 + year,
        _ => year,
    };
    midnight_utc(year, month, day)
}

/// Interpret a model-supplied due date string.
///
/// Accepts RFC 3339 instants, `YYYY-MM-DD` dates and the numeric marker forms.
/// Anything else, including the literal `null`, is treated as absent.
pub fn parse_due_date_value(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("null") {
        return None;
    }
    if let Ok(instant) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(instant);
    }
    if let Some(date) = parse_iso_date(value) {
        return Some(date);
    }
    parse_numeric_date(value)
}

fn parse_iso_date(value: &str) -> Option<OffsetDateTime> {
    let mut parts = value.split('-');
    let year_raw = parts.next()?;
    if year_raw.len() != 4 {
        return None;
    }
    let year: i32 = year_raw.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    midnight_utc(year, month, day)
}

fn midnight_utc(year: i32, month: u8, day: u8) -> Option<OffsetDateTime> {
    let month = Month::try_from(month).ok()?;
    let date = Date::from_calendar_date(year, month, day).ok()?;
    Some(date.midnight().assume_utc())
}
