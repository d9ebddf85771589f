//! Shared test utilities and fixtures for station index tests

use crate::app::models::Station;


/// Create a test station with the given id
pub fn create_test_station(id: &str, brand: &str, city: &str, street: &str) -> Station {
    Station::new(id, brand, city, street).unwrap()
}

/// A handful of stations with distinct ids
pub fn create_test_stations() -> Vec<Station> {
    vec![
        create_test_station(
            "e5215cb1-30d3-4480-9ea1-07381cd0a492",
            "Esso",
            "Berlin",
            "Hauptstr. 1",
        ),
        create_test_station(
            "77c1259a-27f4-45c0-8a25-3089e23e8866",
            "ARAL",
            "Hamburg",
            "Elbchaussee 12",
        ),
        create_test_station(
            "005056ba-7cb6-1ed2-bceb-88651ca7cd30",
            "Shell",
            "Bad Homburg",
            "Louisenstr. 7",
        ),
    ]
}
