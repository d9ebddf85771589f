//! InfluxDB line protocol encoding
//!
//! `measurement,Brand=..,City=..,Street=.. Diesel=1.609,E5Removed=true 1643958907`
//! with second precision timestamps.

use std::fmt::Write;

use crate::app::models::{FieldValue, Point};
use crate::constants::{REMOVED_FIELD_SUFFIX, tags};

/// Encode a single point as one line (without trailing newline)
pub fn encode_point(point: &Point) -> String {
    let mut line = escape(&point.measurement, &[',', ' ']);

    // Tag keys are already in lexical order
    for (key, value) in [
        (tags::BRAND, &point.tags.brand),
        (tags::CITY, &point.tags.city),
        (tags::STREET, &point.tags.street),
    ] {
        // Empty tag values are rejected by InfluxDB
        if value.is_empty() {
            continue;
        }
        let _ = write!(line, ",{}={}", key, escape_tag(value));
    }

    for (i, (fuel, value)) in point.fields.iter().enumerate() {
        line.push(if i == 0 { ' ' } else { ',' });
        let _ = match value {
            FieldValue::Price(price) => write!(line, "{}={}", fuel.field_name(), price),
            FieldValue::Removed => write!(
                line,
                "{}{}=true",
                fuel.field_name(),
                REMOVED_FIELD_SUFFIX
            ),
        };
    }

    let _ = write!(line, " {}", point.timestamp.timestamp());
    line
}

/// Encode points as newline separated lines
pub fn encode_batch(points: &[Point]) -> String {
    points
        .iter()
        .map(encode_point)
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_tag(value: &str) -> String {
    escape(value, &[',', '=', ' '])
}

fn escape(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
