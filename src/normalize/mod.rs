//! Cross-cutting value normalization: tolerant numeric coercion, multi-format
//! date parsing, tax-classification-code inference, and tax-rate
//! back-calculation.
//!
//! Every function here is pure and total: no panics, no errors. Unparseable
//! numeric input coerces to zero and unparseable dates to `None`, so one bad
//! field never aborts document construction.

pub mod dates;
pub mod numeric;
pub mod tax;

pub use dates::{from_serial, parse_flexible};
pub use numeric::{coerce_decimal, coerce_units};
pub use tax::{back_rate, extract_code, split_combined};
