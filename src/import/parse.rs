//! Lenient parsing of the dates and amounts found in bank statements.

use time::{Date, Month, OffsetDateTime, format_description::well_known::Rfc3339};

/// Parse a statement date.
///
/// The standard forms are tried first: RFC 3339 date-times, `YYYY-MM-DD`,
/// `YYYY/MM/DD` and the US `MM/DD/YYYY` or `MM/DD/YY`. Otherwise the text is split on `/`,
/// `.` or `-` and read as day-month-year, then month-day-year. Two digit years
/// are taken to be in the 2000s.
///
/// Returns `None` for empty or unparseable text.
pub fn parse_date(text: &str) -> Option<Date> {
    let text = text.trim();

    if text.is_empty() {
        return None;
    }

    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(date_time.date());
    }

    // Ignore the time in date-times without an offset, e.g. "2024-03-15T09:30:00".
    let date_part = text.split([' ', 'T']).next().unwrap_or(text);

    parse_standard_date(date_part).or_else(|| parse_numeric_date(date_part))
}

fn parse_standard_date(text: &str) -> Option<Date> {
    let (separator, parts) = split_date(text)?;
    let [first, second, third] = parts;

    if first.len() == 4 && (separator == '-' || separator == '/') {
        return build_date(first, second, third);
    }

    if separator == '/' && matches!(third.len(), 2 | 4) {
        return build_date(third, first, second);
    }

    None
}

fn parse_numeric_date(text: &str) -> Option<Date> {
    let (_, [first, second, third]) = split_date(text)?;

    build_date(third, second, first).or_else(|| build_date(third, first, second))
}

/// Split `text` into three runs of digits separated by one of `/`, `.` or `-`.
fn split_date(text: &str) -> Option<(char, [&str; 3])> {
    let separator = text.chars().find(|c| matches!(c, '/' | '.' | '-'))?;
    let mut parts = text.split(separator);

    let parts = [parts.next()?, parts.next()?, parts.next()?];
    if text.split(separator).count() != 3 {
        return None;
    }

    if parts
        .iter()
        .any(|part| part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }

    Some((separator, parts))
}

fn build_date(year: &str, month: &str, day: &str) -> Option<Date> {
    let year: i32 = match year.len() {
        2 => 2000 + year.parse::<i32>().ok()?,
        4 => year.parse().ok()?,
        _ => return None,
    };

    if month.len() > 2 || day.len() > 2 {
        return None;
    }

    let month = Month::try_from(month.parse::<u8>().ok()?).ok()?;
    let day: u8 = day.parse().ok()?;

    Date::from_calendar_date(year, month, day).ok()
}

/// Parse a statement amount, keeping its sign.
///
/// Everything except digits, `,`, `.` and `-` is dropped, so currency symbols
/// and spaces are ignored. When both `,` and `.` appear the last one is the
/// decimal separator and the other is a thousands separator. A single `,` on
/// its own is a decimal comma. A `-` anywhere makes the amount negative.
///
/// Returns `None` if no number can be read.
pub fn parse_amount(text: &str) -> Option<f64> {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    let is_negative = kept.contains('-');
    let unsigned: String = kept.chars().filter(|&c| c != '-').collect();

    if !unsigned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match (unsigned.rfind(','), unsigned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => unsigned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => unsigned.replace(',', ""),
        (Some(_), None) if unsigned.matches(',').count() == 1 => unsigned.replace(',', "."),
        (Some(_), None) => unsigned.replace(',', ""),
        (None, Some(_)) if unsigned.matches('.').count() > 1 => unsigned.replace('.', ""),
        _ => unsigned,
    };

    let magnitude: f64 = normalized.parse().ok()?;

    if !magnitude.is_finite() {
        return None;
    }

    Some(if is_negative { -magnitude } else { magnitude })
}
