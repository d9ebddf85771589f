//! Record transformation for fuel price change logs
//!
//! Turns one [`RawRecord`](crate::app::models::RawRecord) of a configured
//! station into at most one [`Point`](crate::app::models::Point). Each fuel type
//! is judged by its change code on its own:
//!
//! | Change code        | Field in the point            |
//! |--------------------|-------------------------------|
//! | `Unchanged`        | none                          |
//! | `Changed` / `New`  | parsed price                  |
//! | `Removed`          | explicit removed marker       |
//!
//! Rows without any field produce no point. Most rows of the public feed are
//! of that kind.

pub mod transformer;

#[cfg(test)]
pub mod tests;

pub use transformer::RecordTransformer;
