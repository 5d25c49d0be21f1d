use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Period granularity of a periodic report upload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PeriodType {
    Daily,
    DateRange,
}

/// Kind of periodic report, part of the upload-dedup key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum UploadType {
    Inventory,
    SecondarySales,
}

/// One inventory fact row extracted from a partner stock report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryFact {
    pub sku: String,
    pub sku_description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub city: Option<String>,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryExtract {
    pub facts: Vec<InventoryFact>,
    pub summary: ReportSummary,
}

/// One secondary-sales data point. Date-column reports yield one fact per
/// (row, date column) pair with a positive quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesFact {
    pub sku: String,
    pub sku_description: Option<String>,
    pub brand: Option<String>,
    pub sale_date: NaiveDate,
    pub quantity: i64,
    pub revenue: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesExtract {
    pub facts: Vec<SalesFact>,
    pub summary: ReportSummary,
}

/// Aggregates reported back from report parsing and again after persistence,
/// so the caller can reconcile preview against import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub source_rows: usize,
    pub facts: usize,
    pub total_units: i64,
    pub distinct_skus: usize,
}

/// Outcome of a periodic report import. A previously-seen file for the same
/// import combination is reported, never re-persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReportOutcome {
    Imported {
        rows: usize,
        summary: ReportSummary,
    },
    DuplicateFile {
        file_hash: String,
        first_uploaded_at: chrono::DateTime<chrono::Utc>,
        first_uploaded_by: String,
    },
}
