//! Individual CSV row parsing for change log files

use csv::StringRecord;

use super::field_parsers::{get_field, get_required_field, parse_change_code};
use crate::app::models::RawRecord;
use crate::constants::{COLUMN_COUNT, HEADER_FIRST_FIELD, columns};
use crate::{Error, Result};

/// Station id of a row, used to match it against the station index
pub fn station_id(record: &StringRecord) -> Option<&str> {
    record.get(columns::STATION_ID).map(str::trim)
}

/// Whether a row is the `date,station_uuid,...` header of the published dumps
pub fn is_header_row(record: &StringRecord) -> bool {
    record
        .get(columns::TIMESTAMP)
        .is_some_and(|field| field.trim() == HEADER_FIRST_FIELD)
}

/// Parse a single change log row
///
/// Prices stay as text; change codes are decoded here so a row with an
/// unknown code is rejected as a whole.
pub fn parse_raw_record(record: &StringRecord) -> Result<RawRecord> {
    if record.len() != COLUMN_COUNT {
        return Err(Error::malformed_record(format!(
            "Expected {} columns, found {}",
            COLUMN_COUNT,
            record.len()
        )));
    }

    Ok(RawRecord {
        timestamp: get_required_field(record, columns::TIMESTAMP, "date")?.to_string(),
        station_id: get_required_field(record, columns::STATION_ID, "station_uuid")?.to_string(),
        diesel_price: get_field(record, columns::DIESEL_PRICE, "diesel")?.to_string(),
        e5_price: get_field(record, columns::E5_PRICE, "e5")?.to_string(),
        e10_price: get_field(record, columns::E10_PRICE, "e10")?.to_string(),
        diesel_change: parse_change_code(record, columns::DIESEL_CHANGE, "dieselchange")?,
        e5_change: parse_change_code(record, columns::E5_CHANGE, "e5change")?,
        e10_change: parse_change_code(record, columns::E10_CHANGE, "e10change")?,
    })
}
