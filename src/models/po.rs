use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Partner;

/// Provenance of a line's tax-classification code. A declared code came from
/// a dedicated column; a labelled code was lifted out of free text; an
/// inferred code is a keyword-table guess and must not be treated as
/// authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCodeSource {
    Declared,
    Labelled,
    Inferred,
}

impl TaxCodeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxCodeSource::Declared => "declared",
            TaxCodeSource::Labelled => "labelled",
            TaxCodeSource::Inferred => "inferred",
        }
    }
}

/// Per-line tax breakdown, rate + amount per levy component. A combined levy
/// is either carried on the integrated component or split across the
/// central/state co-levies by the assembler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub integrated_rate: Decimal,
    pub integrated_amount: Decimal,
    pub central_rate: Decimal,
    pub central_amount: Decimal,
    pub state_rate: Decimal,
    pub state_amount: Decimal,
    pub surcharge_rate: Decimal,
    pub surcharge_amount: Decimal,
    /// Sum of the component amounts for this line.
    pub total_amount: Decimal,
}

impl TaxBreakdown {
    pub fn combined_rate(&self) -> Decimal {
        self.integrated_rate + self.central_rate + self.state_rate + self.surcharge_rate
    }
}

/// Canonical purchase-order line, independent of source partner.
/// Line numbers are 1-based and sequential, assigned after noisy source rows
/// have been dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPoLine {
    pub line_number: i32,
    pub item_code: String,
    pub item_description: Option<String>,
    pub tax_code: Option<String>,
    pub tax_code_source: Option<TaxCodeSource>,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub mrp: Option<Decimal>,
    pub taxable_value: Decimal,
    pub tax: TaxBreakdown,
    pub line_total: Decimal,
}

/// Canonical purchase-order header. Aggregate totals are always recomputed
/// from line data; partner-declared totals are advisory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPoHeader {
    pub partner: Partner,
    pub po_number: String,
    pub po_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub vendor_name: Option<String>,
    pub vendor_code: Option<String>,
    pub vendor_tax_id: Option<String>,
    pub buyer_name: Option<String>,
    pub ship_to: Option<String>,
    pub bill_to: Option<String>,
    pub payment_terms: Option<String>,
    /// Routing output of the injected import policy, not file data.
    pub distributor: Option<String>,
    pub total_quantity: Decimal,
    pub taxable_value: Decimal,
    pub tax_amount: Decimal,
    pub grand_total: Decimal,
    pub status: String,
    /// Opaque reference into the blob-storage collaborator.
    pub attachment_path: Option<String>,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPo {
    pub header: CanonicalPoHeader,
    pub lines: Vec<CanonicalPoLine>,
}

impl CanonicalPo {
    pub fn line_total_sum(&self) -> Decimal {
        self.lines.iter().map(|l| l.line_total).sum()
    }
}

/// Identifying details of an already-persisted purchase order, returned with
/// a duplicate outcome so the caller can see what it collided with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateInfo {
    pub header_id: i64,
    pub po_number: String,
    pub po_date: Option<NaiveDate>,
    pub vendor_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of importing a single purchase order. Duplicate is a first-class
/// outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ImportOutcome {
    Imported { header_id: i64, lines: usize },
    Duplicate { existing: DuplicateInfo },
}

/// Per-item entry in a batch import result list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResult {
    pub po_number: String,
    #[serde(flatten)]
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    Imported { header_id: i64 },
    Duplicate { existing_id: i64 },
    Failed { message: String },
}

/// File-level reading of a batch result, so callers can distinguish "all
/// succeeded" from "all duplicates/failed" from a mixed outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchDisposition {
    AllImported,
    NothingImported,
    Partial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub success: usize,
    pub duplicate: usize,
    pub failed: usize,
    pub results: Vec<ItemResult>,
}

impl BatchOutcome {
    pub fn disposition(&self) -> BatchDisposition {
        if self.success > 0 && self.duplicate == 0 && self.failed == 0 {
            BatchDisposition::AllImported
        } else if self.success == 0 {
            BatchDisposition::NothingImported
        } else {
            BatchDisposition::Partial
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(success: usize, duplicate: usize, failed: usize) -> BatchOutcome {
        BatchOutcome {
            success,
            duplicate,
            failed,
            results: Vec::new(),
        }
    }

    #[test]
    fn disposition_classification() {
        assert_eq!(outcome(3, 0, 0).disposition(), BatchDisposition::AllImported);
        assert_eq!(
            outcome(0, 2, 1).disposition(),
            BatchDisposition::NothingImported
        );
        assert_eq!(outcome(1, 1, 0).disposition(), BatchDisposition::Partial);
        assert_eq!(
            outcome(0, 0, 0).disposition(),
            BatchDisposition::NothingImported
        );
    }
}
