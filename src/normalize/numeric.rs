use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

static NUMERIC_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("invalid numeric regex"));

/// Coerces an arbitrary raw value to a decimal. Strips thousands separators,
/// currency symbols, and unit suffixes ("₹12,345.60", "12 tonnes", "18 %"),
/// then parses the first digit/decimal/minus run that remains.
///
/// Returns zero when nothing numeric remains. Callers cannot distinguish an
/// explicit zero from unparseable input; this coerce-to-zero policy is
/// deliberate and matches how partner files treat blank numeric cells.
pub fn coerce_decimal(raw: Option<&str>) -> Decimal {
    let Some(raw) = raw else {
        return Decimal::ZERO;
    };

    let cleaned = raw.replace(',', "");
    NUMERIC_RUN
        .find(&cleaned)
        .and_then(|m| Decimal::from_str(m.as_str()).ok())
        .unwrap_or(Decimal::ZERO)
}

/// Coerces a raw value to a whole unit count, truncating any fraction.
/// Negative and unparseable input both coerce to zero.
pub fn coerce_units(raw: Option<&str>) -> i64 {
    let value = coerce_decimal(raw);
    if value.is_sign_negative() {
        return 0;
    }
    value.trunc().try_into().unwrap_or(0)
}
