//! Shared test utilities for change log parser tests

use crate::app::services::station_registry::StationIndex;
use crate::app::services::station_registry::tests::create_test_stations;
use std::io::Write;
use tempfile::NamedTempFile;


/// Write content to a temporary CSV file
pub fn create_temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Index holding the three test stations
pub fn create_test_index() -> StationIndex {
    StationIndex::build(create_test_stations()).unwrap()
}

/// One day of change log rows covering the common cases
///
/// Line 3 belongs to an unknown station, line 4 has no changes, line 5
/// removes diesel with a placeholder price and line 6 has an invalid code.
pub fn create_test_change_log() -> &'static str {
    indoc::indoc! {"
        2022-02-04 08:15:07+01,e5215cb1-30d3-4480-9ea1-07381cd0a492,1.609,1.769,1.709,0,1,1
        2022-02-04 08:15:07+01,77c1259a-27f4-45c0-8a25-3089e23e8866,1.629,1.759,1.699,1,0,0
        2022-02-04 08:15:07+01,e1a71869-0ddf-4f91-ac1b-1a341212712b,1.629,1.779,1.719,1,0,0
        2022-02-04 08:20:07+01,005056ba-7cb6-1ed2-bceb-88651ca7cd30,1.599,1.739,1.679,0,0,0
        2022-02-04 08:25:07+01,e5215cb1-30d3-4480-9ea1-07381cd0a492,-0.001,1.779,1.719,2,0,0
        2022-02-04 08:30:07+01,e5215cb1-30d3-4480-9ea1-07381cd0a492,1.609,1.789,1.729,0,4,0
    "}
}
