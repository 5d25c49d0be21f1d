//! Document extractors, one per partner format.
//!
//! Each extractor turns a parsed [`Sheet`] into partner-native header/line
//! records. Row-level problems degrade gracefully: a row missing its
//! identifying fields, or matching known boilerplate, is dropped with a
//! logged reason and the rest of the file still parses.

pub mod freshkart;
pub mod inventory;
pub mod metrobazaar;
pub mod swiftmart;
pub mod urbanbasket;

use chrono::NaiveDate;
use tracing::warn;

use crate::errors::ExtractError;
use crate::models::Partner;
use crate::sheet::Sheet;

/// Detection confidence reported by `PoExtractor::detect`. The classifier
/// picks the highest non-zero score, so an extractor only has to be more
/// certain than its peers, not absolutely certain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Confidence(pub u8);

impl Confidence {
    pub const NONE: Confidence = Confidence(0);
    pub const WEAK: Confidence = Confidence(30);
    pub const STRONG: Confidence = Confidence(80);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Partner-native purchase-order header as extracted, before normalization
/// to the canonical schema. Monetary fields stay raw strings here; the
/// assembler owns numeric coercion. Declared totals are advisory only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeHeader {
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
    pub declared_total: Option<String>,
}

/// Partner-native line record. Optional fields are simply absent from that
/// partner's format; the assembler defaults or derives them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeLine {
    pub item_code: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tax_code: Option<String>,
    pub quantity: Option<String>,
    pub unit_cost: Option<String>,
    pub mrp: Option<String>,
    pub taxable_value: Option<String>,
    /// A single combined levy percentage needing the co-levy split.
    pub combined_rate: Option<String>,
    pub integrated_rate: Option<String>,
    pub integrated_amount: Option<String>,
    pub central_rate: Option<String>,
    pub central_amount: Option<String>,
    pub state_rate: Option<String>,
    pub state_amount: Option<String>,
    pub surcharge_rate: Option<String>,
    pub surcharge_amount: Option<String>,
    pub tax_amount: Option<String>,
    pub line_total: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NativePo {
    pub partner: Partner,
    pub header: NativeHeader,
    pub lines: Vec<NativeLine>,
}

/// Extractor output: one purchase order, or several grouped out of a single
/// file. Downstream components consume `into_documents` and never branch on
/// the shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Single(NativePo),
    Multiple(Vec<NativePo>),
}

impl Extraction {
    pub fn into_documents(self) -> Vec<NativePo> {
        match self {
            Extraction::Single(po) => vec![po],
            Extraction::Multiple(pos) => pos,
        }
    }

    pub fn document_count(&self) -> usize {
        match self {
            Extraction::Single(_) => 1,
            Extraction::Multiple(pos) => pos.len(),
        }
    }
}

/// Request-scoped context available to extractors. The file hash gives
/// extractors a deterministic seed when a document number has to be
/// synthesized, so re-parsing the same bytes yields identical output.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    pub filename: &'a str,
    pub uploaded_by: &'a str,
    pub file_hash: &'a str,
}

/// Collected field-extraction warnings. Each entry is also logged at `warn`
/// level as it is recorded; the collection travels with the preview so the
/// caller sees what was dropped or defaulted.
#[derive(Debug, Default, Clone)]
pub struct Warnings {
    items: Vec<String>,
}

impl Warnings {
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(warning = %message, "field extraction warning");
        self.items.push(message);
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

/// Closed capability interface for purchase-order extractors. `detect`
/// reports how confident the extractor is that the bytes are its partner's
/// format; `extract` produces the native documents.
pub trait PoExtractor: Send + Sync {
    fn partner(&self) -> Partner;

    /// Ordered filename keywords for classifier matching.
    fn keywords(&self) -> &'static [&'static str];

    fn detect(&self, sheet: &Sheet, filename: &str) -> Confidence;

    fn extract(
        &self,
        sheet: &Sheet,
        ctx: &ExtractContext<'_>,
        warnings: &mut Warnings,
    ) -> Result<Extraction, ExtractError>;
}

/// Boilerplate text that marks summary or terms rows in partner exports.
/// Rows whose identifying cell matches are dropped, never parsed as lines.
const BOILERPLATE_MARKERS: &[&str] = &[
    "total",
    "grand total",
    "total quantity",
    "terms & conditions",
    "terms and conditions",
    "important notification",
    "please advise",
];

pub(crate) fn is_boilerplate(cell: &str) -> bool {
    let lower = cell.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    BOILERPLATE_MARKERS.iter().any(|marker| {
        lower == *marker
            || (lower.starts_with(marker)
                && lower[marker.len()..]
                    .chars()
                    .next()
                    .is_some_and(|c| !c.is_alphanumeric()))
    })
}

/// Groups rows by a repeating key, preserving first-seen order of distinct
/// keys. Multi-document files interleave rows for several purchase orders.
pub(crate) fn group_preserving_order<T>(
    items: impl IntoIterator<Item = (String, T)>,
) -> Vec<(String, Vec<T>)> {
    let mut groups: Vec<(String, Vec<T>)> = Vec::new();
    for (key, item) in items {
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, bucket)) => bucket.push(item),
            None => groups.push((key, vec![item])),
        }
    }
    groups
}
