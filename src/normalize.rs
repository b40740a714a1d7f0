// Time and day normalization: canonicalizes the heterogeneous encodings the
// catalog feed carries into minute offsets and weekday sets.

use crate::errors::NormalizeError;
use crate::models::Weekday;

/// Exact day tokens, tried before the containment fallback. Thursday is
/// "TH" in the catalog feed and "R" in the registrar's row format.
const DAY_TOKENS: &[(&str, Weekday)] = &[
    ("M", Weekday::Monday),
    ("T", Weekday::Tuesday),
    ("W", Weekday::Wednesday),
    ("TH", Weekday::Thursday),
    ("R", Weekday::Thursday),
    ("F", Weekday::Friday),
    ("MONDAY", Weekday::Monday),
    ("TUESDAY", Weekday::Tuesday),
    ("WEDNESDAY", Weekday::Wednesday),
    ("THURSDAY", Weekday::Thursday),
    ("FRIDAY", Weekday::Friday),
];

/// Parse a clock time into minutes since midnight.
///
/// Accepts 24-hour `H:MM`/`HH:MM` and 12-hour `H:MM AM|PM` (case-insensitive,
/// space before the meridiem optional). A trailing `:SS` component is
/// tolerated and ignored. A bare `H:MM` with no meridiem is taken as
/// already-24-hour when the hour is valid in [0,24); it is never guessed as
/// PM.
pub fn parse_time(raw: &str) -> Result<u16, NormalizeError> {
    let err = || NormalizeError::UnparseableTime(raw.to_string());
    let upper = raw.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err(err());
    }

    let (body, meridiem_pm) = if let Some(stripped) = upper.strip_suffix("AM") {
        (stripped.trim_end(), Some(false))
    } else if let Some(stripped) = upper.strip_suffix("PM") {
        (stripped.trim_end(), Some(true))
    } else {
        (upper.as_str(), None)
    };

    let mut parts = body.split(':');
    let hour_part = parts.next().ok_or_else(err)?;
    let minute_part = parts.next().ok_or_else(err)?;
    if let Some(seconds) = parts.next() {
        if seconds.len() != 2 || !seconds.chars().all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
    }
    if parts.next().is_some() {
        return Err(err());
    }

    let valid_digits =
        |s: &str, max_len: usize| !s.is_empty() && s.len() <= max_len && s.chars().all(|c| c.is_ascii_digit());
    if !valid_digits(hour_part, 2) || minute_part.len() != 2 || !valid_digits(minute_part, 2) {
        return Err(err());
    }

    let hour: u16 = hour_part.parse().map_err(|_| err())?;
    let minute: u16 = minute_part.parse().map_err(|_| err())?;
    if minute >= 60 {
        return Err(err());
    }

    let hour24 = match meridiem_pm {
        Some(pm) => {
            if !(1..=12).contains(&hour) {
                return Err(err());
            }
            match (pm, hour) {
                (true, 12) => 12,
                (true, h) => h + 12,
                (false, 12) => 0,
                (false, h) => h,
            }
        }
        None => {
            if hour >= 24 {
                return Err(err());
            }
            hour
        }
    };

    Ok(hour24 * 60 + minute)
}

/// Resolve a single day token to a weekday.
///
/// Exact tokens first; then a two-way prefix containment fallback kept from
/// the legacy converter for unusual campus abbreviations. The fallback is
/// lossy ("MTH" resolves to Monday) and deliberately preserved as-is.
pub fn parse_day_token(raw: &str) -> Result<Weekday, NormalizeError> {
    let token = raw.trim().to_ascii_uppercase();
    if token.is_empty() {
        return Err(NormalizeError::UnparseableDay(raw.to_string()));
    }
    for (code, day) in DAY_TOKENS {
        if token == *code {
            return Ok(*day);
        }
    }
    for (code, day) in DAY_TOKENS {
        if token.starts_with(code) || code.starts_with(token.as_str()) {
            return Ok(*day);
        }
    }
    Err(NormalizeError::UnparseableDay(raw.to_string()))
}

/// Resolve a day field into a deduplicated weekday set in weekday order.
/// The field may carry several whitespace- or comma-separated tokens.
pub fn parse_days(raw: &str) -> Result<Vec<Weekday>, NormalizeError> {
    let mut days: Vec<Weekday> = Vec::new();
    let mut saw_token = false;
    for token in raw.split(|c: char| c.is_whitespace() || c == ',') {
        if token.is_empty() {
            continue;
        }
        saw_token = true;
        days.push(parse_day_token(token)?);
    }
    if !saw_token {
        return Err(NormalizeError::UnparseableDay(raw.to_string()));
    }
    days.sort();
    days.dedup();
    Ok(days)
}

/// Normalize a raw (day, start, end) triple into a canonical weekly slot.
/// An interval whose end is not after its start is unparseable.
pub fn parse_slot(
    day_raw: &str,
    start_raw: &str,
    end_raw: &str,
) -> Result<(Vec<Weekday>, u16, u16), NormalizeError> {
    let days = parse_days(day_raw)?;
    let start = parse_time(start_raw)?;
    let end = parse_time(end_raw)?;
    if end <= start {
        return Err(NormalizeError::UnparseableTime(format!(
            "{start_raw}-{end_raw}"
        )));
    }
    Ok((days, start, end))
}

/// "14:30" — machine-parseable 24-hour form.
pub fn display_24h(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// "2:30 PM" — 12-hour display form.
pub fn display_12h(minutes: u16) -> String {
    let hour = minutes / 60;
    let minute = minutes % 60;
    let period = if hour < 12 { "AM" } else { "PM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour12}:{minute:02} {period}")
}
