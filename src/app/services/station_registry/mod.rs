//! Station index for O(1) station lookups
//!
//! Builds the set of configured fuel stations into a map keyed by station id.
//! Change log rows are matched against this index; rows for stations that are
//! not configured are dropped by the caller without error.

use crate::app::models::Station;
use crate::{Error, Result};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

#[cfg(test)]
pub mod tests;

/// Configured stations indexed by id
///
/// Built once per run and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct StationIndex {
    /// Station metadata indexed by id for O(1) lookups
    stations: HashMap<String, Station>,
}

impl StationIndex {
    /// Build the index, rejecting stations that share an id
    ///
    /// # Errors
    /// * Returns `Error::DuplicateStation` if two stations have the same id
    /// * Returns `Error::Configuration` if a station fails validation
    pub fn build<I>(stations: I) -> Result<Self>
    where
        I: IntoIterator<Item = Station>,
    {
        let mut index = HashMap::new();

        for station in stations {
            station.validate()?;
            match index.entry(station.id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(station);
                }
                Entry::Occupied(_) => return Err(Error::duplicate_station(station.id)),
            }
        }

        debug!("Built station index with {} stations", index.len());
        Ok(Self { stations: index })
    }

    /// Get a station by id (O(1) lookup)
    pub fn lookup(&self, id: &str) -> Option<&Station> {
        self.stations.get(id)
    }

    /// Get the total number of stations in the index
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether the index holds no stations
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
