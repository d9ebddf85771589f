//! Shared test utilities for record transformer tests

use crate::app::models::{ChangeCode, RawRecord, Station};


pub const TEST_STATION_ID: &str = "e5215cb1-30d3-4480-9ea1-07381cd0a492";

/// The Berlin test station
pub fn create_test_station() -> Station {
    Station::new(TEST_STATION_ID, "Esso", "Berlin", "Hauptstr. 1").unwrap()
}

/// A row with the given change codes for diesel, e5 and e10
pub fn create_test_record(diesel: char, e5: char, e10: char) -> RawRecord {
    RawRecord {
        timestamp: "2022-02-04 08:15:07+01".to_string(),
        station_id: TEST_STATION_ID.to_string(),
        diesel_price: "1.609".to_string(),
        e5_price: "1.769".to_string(),
        e10_price: "1.709".to_string(),
        diesel_change: ChangeCode::decode(diesel).unwrap(),
        e5_change: ChangeCode::decode(e5).unwrap(),
        e10_change: ChangeCode::decode(e10).unwrap(),
    }
}
