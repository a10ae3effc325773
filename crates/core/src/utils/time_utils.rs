use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::errors::Result;

/// Storage format for calendar dates.
pub const DB_DATE_FORMAT: &str = "%Y-%m-%d";

/// Naive date-time layouts accepted when reading timestamps back.
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Current instant in the canonical ISO-8601 encoding.
///
/// Fractional seconds are kept at full precision so the text parses back to
/// the exact instant.
pub fn current_timestamp() -> String {
    to_db_time(Utc::now())
}

pub fn to_db_time(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn to_db_date(date: NaiveDate) -> String {
    date.format(DB_DATE_FORMAT).to_string()
}

/// Parses any timestamp this crate writes, plus naive date-times and plain
/// dates (read as midnight UTC).
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }
    let date = NaiveDate::parse_from_str(text, DB_DATE_FORMAT)?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Calendar date of a stored date or timestamp.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    Ok(parse_timestamp(text)?.date_naive())
}
