//! Per-fuel change indicator of the change log

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Change indicator attached to each fuel price in a row
///
/// Encoded in the source as a single digit:
/// `0` unchanged, `1` changed, `2` removed, `3` new.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeCode {
    Unchanged,
    Changed,
    Removed,
    New,
}

impl ChangeCode {
    /// Decode a single change indicator character
    pub fn decode(code: char) -> Result<Self> {
        match code {
            '0' => Ok(ChangeCode::Unchanged),
            '1' => Ok(ChangeCode::Changed),
            '2' => Ok(ChangeCode::Removed),
            '3' => Ok(ChangeCode::New),
            other => Err(Error::invalid_change_code(other.to_string())),
        }
    }

    /// Anything but `Unchanged` contributes a field to the point
    pub fn is_change(self) -> bool {
        self != ChangeCode::Unchanged
    }

    /// `Changed` and `New` carry a price
    pub fn carries_price(self) -> bool {
        matches!(self, ChangeCode::Changed | ChangeCode::New)
    }
}

impl TryFrom<char> for ChangeCode {
    type Error = Error;

    fn try_from(code: char) -> Result<Self> {
        Self::decode(code)
    }
}

impl FromStr for ChangeCode {
    type Err = Error;

    /// Parse a CSV field holding exactly one indicator character
    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => Self::decode(code),
            _ => Err(Error::invalid_change_code(s)),
        }
    }
}

impl fmt::Display for ChangeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeCode::Unchanged => "unchanged",
            ChangeCode::Changed => "changed",
            ChangeCode::Removed => "removed",
            ChangeCode::New => "new",
        };
        f.write_str(name)
    }
}
