use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::models::TaxCodeSource;

static DECLARED_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{6,8}$").expect("invalid code regex"));

/// Codes embedded in free text carry a label: "HSN: 15079090",
/// "tax code 09021000".
static LABELLED_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:hsn|tax\s*code|code)[:\s#]*(\d{6,8})\b").expect("invalid label regex")
});

/// Ordered keyword -> classification-code table for grocery categories.
/// First match wins. This inference is approximate, never authoritative;
/// the provenance flag on the canonical line records that it was a guess.
static KEYWORD_CODES: &[(&[&str], &str)] = &[
    (&["rice bran", "ricebran"], "15079090"),
    (&["mustard oil", "kachi ghani"], "15144010"),
    (&["groundnut", "peanut"], "15081010"),
    (&["sunflower"], "15121110"),
    (&["coconut oil"], "15131110"),
    (&["soybean", "soya"], "15079010"),
    (&["edible oil", "cooking oil", "refined oil"], "15179090"),
    (&["ghee", "clarified butter"], "04059020"),
    (&["atta", "wheat flour", "maida"], "11010000"),
    (&["rice", "basmati"], "10063020"),
    (&["dal", "lentil", "pulse"], "07133100"),
    (&["sugar"], "17019990"),
    (&["salt"], "25010020"),
    (&["tea"], "09021000"),
    (&["coffee"], "09011110"),
    (&["turmeric", "haldi"], "09103000"),
    (&["chilli", "mirch"], "09042110"),
    (&["masala", "spice"], "09109990"),
    (&["milk"], "04011010"),
    (&["butter"], "04051000"),
    (&["cheese", "paneer"], "04061010"),
    (&["juice"], "20098990"),
    (&["water"], "22011010"),
    (&["biscuit", "cookie"], "19053100"),
    (&["chips", "namkeen", "snack"], "19059090"),
    (&["chocolate"], "18069010"),
];

/// Infers a tax-classification code for a line. Preference order: an
/// explicit 6-8 digit declared code, a labelled code embedded in free text,
/// then the keyword table against description and category.
pub fn extract_code(
    declared: Option<&str>,
    description: Option<&str>,
    category: Option<&str>,
) -> Option<(String, TaxCodeSource)> {
    if let Some(code) = declared.map(str::trim).filter(|c| DECLARED_CODE.is_match(c)) {
        return Some((code.to_string(), TaxCodeSource::Declared));
    }

    for text in [description, category].into_iter().flatten() {
        if let Some(caps) = LABELLED_CODE.captures(text) {
            return Some((caps[1].to_string(), TaxCodeSource::Labelled));
        }
    }

    for text in [description, category].into_iter().flatten() {
        let lower = text.to_lowercase();
        for (keywords, code) in KEYWORD_CODES {
            if keywords.iter().any(|k| lower.contains(k)) {
                return Some(((*code).to_string(), TaxCodeSource::Inferred));
            }
        }
    }

    None
}

/// Back-calculates a percentage rate from a monetary tax amount and its
/// taxable base. Zero base yields a zero rate.
pub fn back_rate(tax_amount: Decimal, taxable_value: Decimal) -> Decimal {
    if taxable_value.is_zero() {
        return Decimal::ZERO;
    }
    (tax_amount / taxable_value * Decimal::ONE_HUNDRED).round_dp(3)
}

/// Splits a combined levy rate into two equal co-levies. The even split is
/// an approximation; partner files that carry only a combined rate do not
/// say how the components divide.
pub fn split_combined(rate: Decimal) -> (Decimal, Decimal) {
    let half = (rate / Decimal::TWO).round_dp(3);
    (half, half)
}
