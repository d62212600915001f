//! Total extractors over value envelopes. Absence is the only failure signal:
//! none of these functions can error or panic.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::extract::envelope::{DateValue, Field, NumberLong, Scalar, block};

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

const NAIVE_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y"];

pub fn text(field: &Field<Scalar>) -> Option<String> {
    match block(field)? {
        Scalar::Text(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Scalar::Number(value) => format_number(*value),
        Scalar::Bool(_) | Scalar::Other(_) => None,
    }
}

pub fn number(field: &Field<Scalar>) -> Option<f64> {
    match block(field)? {
        Scalar::Number(value) if value.is_finite() => Some(*value),
        Scalar::Number(_) => None,
        Scalar::Text(value) => parse_number(value),
        Scalar::Bool(_) | Scalar::Other(_) => None,
    }
}

pub fn integer(field: &Field<Scalar>) -> Option<i64> {
    let value = number(field)?;
    if value.fract() != 0.0 || value < i64::MIN as f64 || value > i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

pub fn date(field: &Field<Scalar>) -> Option<DateTime<Utc>> {
    match block(field)? {
        Scalar::Text(value) => parse_date(value),
        _ => None,
    }
}

/// Parses a numeric-looking string. Empty, non-numeric, and non-finite input
/// yields `None`.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

/// Parses a date or timestamp into UTC. Strings without an offset are read as
/// UTC; anything unparsable is treated as absent rather than kept as a sentinel.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed.and_utc());
        }
    }

    for format in NAIVE_DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            return parsed.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc());
        }
    }

    None
}

pub fn date_value(value: Option<&DateValue>) -> Option<DateTime<Utc>> {
    match value? {
        DateValue::Wrapped { date } => parse_date(date),
        DateValue::Text(text) => parse_date(text),
    }
}

pub fn number_long(value: Option<&NumberLong>) -> Option<i64> {
    match value? {
        NumberLong::Wrapped { number_long } => number_long.trim().parse::<i64>().ok(),
        NumberLong::Integer(integer) => Some(*integer),
        NumberLong::Text(text) => text.trim().parse::<i64>().ok(),
    }
}

/// Canonical storage form: UTC, second precision, `Z` suffix. Lexicographic
/// order on this form equals chronological order.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn format_number(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return Some(format!("{}", value as i64));
    }
    Some(value.to_string())
}
