pub mod po;
pub mod reports;

pub use po::{
    BatchDisposition, BatchOutcome, CanonicalPo, CanonicalPoHeader, CanonicalPoLine,
    DuplicateInfo, ImportOutcome, ItemResult, ItemStatus, TaxBreakdown, TaxCodeSource,
};
pub use reports::{
    InventoryExtract, InventoryFact, PeriodType, ReportOutcome, ReportSummary, SalesExtract,
    SalesFact, UploadType,
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A trading partner issuing purchase orders or periodic reports in its own
/// file format. Each partner maps to exactly one extractor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Partner {
    /// Aliased-header delimited exports, frequently bundling several
    /// purchase orders per file.
    Swiftmart,
    /// Aliased-header delimited exports, one purchase order per file with
    /// the order number carried in the filename.
    Freshkart,
    /// Fixed-offset spreadsheet template with unlabelled metadata cells.
    Urbanbasket,
    /// Date-column spreadsheet reports (secondary sales / inventory).
    Metrobazaar,
}

impl Partner {
    pub fn as_key(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn partner_round_trips_through_its_key() {
        for partner in [
            Partner::Swiftmart,
            Partner::Freshkart,
            Partner::Urbanbasket,
            Partner::Metrobazaar,
        ] {
            let key = partner.as_key();
            assert_eq!(Partner::from_str(&key).unwrap(), partner);
        }
    }

    #[test]
    fn partner_parse_is_case_insensitive() {
        assert_eq!(Partner::from_str("SwiftMart").unwrap(), Partner::Swiftmart);
    }
}
