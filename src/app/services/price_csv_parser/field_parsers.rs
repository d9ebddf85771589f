//! Field parsing utilities for change log records
//!
//! This module provides helper functions for reading fields from CSV records
//! and for parsing the change log timestamp format.

use crate::app::models::ChangeCode;
use crate::constants::{DATE_COMPONENT_LEN, MIN_TIMESTAMP_LEN};
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use csv::StringRecord;

/// Parse a change log timestamp into a UTC instant
///
/// The expected shape is a `YYYY-MM-DD` date, a space or `T` separator, an
/// `HH:MM:SS` time and a UTC offset (`+01`, `+0100`, `+01:00` or `Z`), e.g.
/// `2022-02-04 08:15:07+01`. Every component is validated, so an offset of
/// unexpected width is parsed or rejected, never silently mis-sliced.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.len() < MIN_TIMESTAMP_LEN {
        return Err(Error::invalid_timestamp(
            value,
            format!("shorter than {} characters", MIN_TIMESTAMP_LEN),
        ));
    }

    let date_part = trimmed
        .get(..DATE_COMPONENT_LEN)
        .ok_or_else(|| Error::invalid_timestamp(value, "date component is not ASCII"))?;
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| Error::invalid_timestamp(value, format!("invalid date: {}", e)))?;

    let rest = trimmed[DATE_COMPONENT_LEN..]
        .strip_prefix(|c: char| c == ' ' || c == 'T')
        .ok_or_else(|| Error::invalid_timestamp(value, "missing date/time separator"))?;

    let offset_start = rest
        .find(|c: char| c == '+' || c == '-' || c == 'Z')
        .ok_or_else(|| Error::invalid_timestamp(value, "missing UTC offset"))?;
    let (time_part, offset_part) = rest.split_at(offset_start);

    let time = NaiveTime::parse_from_str(time_part, "%H:%M:%S")
        .map_err(|e| Error::invalid_timestamp(value, format!("invalid time: {}", e)))?;
    // `%S` accepts a leap second `:60` as one second of nanoseconds
    if time.nanosecond() != 0 {
        return Err(Error::invalid_timestamp(value, "leap seconds are not supported"));
    }
    let offset = parse_utc_offset(offset_part)
        .ok_or_else(|| Error::invalid_timestamp(value, format!("invalid UTC offset '{}'", offset_part)))?;

    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| Error::invalid_timestamp(value, "ambiguous local time"))
}

/// Parse `Z`, `+HH`, `+HHMM` or `+HH:MM` (and `-` variants)
fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    if value == "Z" {
        return FixedOffset::east_opt(0);
    }

    let (sign, digits) = if let Some(digits) = value.strip_prefix('+') {
        (1, digits)
    } else if let Some(digits) = value.strip_prefix('-') {
        (-1, digits)
    } else {
        return None;
    };

    let digits: String = match digits.len() {
        5 if digits.as_bytes()[2] == b':' => digits.replacen(':', "", 1),
        2 | 4 => digits.to_string(),
        _ => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = if digits.len() == 4 {
        digits[2..].parse().ok()?
    } else {
        0
    };
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse a change code column from a CSV record
pub fn parse_change_code(record: &StringRecord, index: usize, field_name: &str) -> Result<ChangeCode> {
    let value_str = get_required_field(record, index, field_name)?;
    value_str.parse::<ChangeCode>()
}

/// Get a required, non-empty field value from a CSV record
pub fn get_required_field<'a>(
    record: &'a StringRecord,
    index: usize,
    field_name: &str,
) -> Result<&'a str> {
    let value = record.get(index).ok_or_else(|| {
        Error::malformed_record(format!("No value for required column '{}'", field_name))
    })?;

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::malformed_record(format!(
            "Empty value for required column '{}'",
            field_name
        )));
    }

    Ok(trimmed)
}

/// Get a field value that may be empty
pub fn get_field<'a>(record: &'a StringRecord, index: usize, field_name: &str) -> Result<&'a str> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| Error::malformed_record(format!("Missing column '{}'", field_name)))
}
