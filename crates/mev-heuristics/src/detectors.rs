//! MEV detection heuristics.
//!
//! Each analyzer scores one aspect of a transaction independently of the
//! others. Analyzers that parse numeric input return a [`FieldError`] on
//! malformed data; the engine turns that into an `invalid_<analyzer>_data`
//! factor instead of failing the analysis.
//!
//! [`FieldError`]: crate::error::FieldError

pub mod address;
pub mod gas;
pub mod payload;
pub mod timing;
pub mod value;
