//! MetroBazaar secondary-sales extractor.
//!
//! MetroBazaar sales reports name only the identity columns. To their right
//! sits a run of otherwise-unlabelled columns whose headers are themselves
//! calendar dates; each such column is one time-series data point per SKU
//! row. Non-positive values are discarded — the report writes zeros into
//! every date a SKU did not sell.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ExtractError;
use crate::extract::Warnings;
use crate::models::{ReportSummary, SalesExtract, SalesFact};
use crate::normalize;
use crate::sheet::{HeaderIndex, Record, Sheet};

const SKU: &[&str] = &["SKU Code", "SKU", "Product Id"];
const TITLE: &[&str] = &["Product Title", "Product Name", "SKU Name"];
const BRAND: &[&str] = &["Brand", "Brand Name"];
const UNIT_PRICE: &[&str] = &["Selling Price", "Unit Price"];

static DATE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("invalid date header regex"));

/// Parses a date-column sales report. The header row is located beneath any
/// banner rows by looking for the SKU identity column.
pub fn parse_sales(sheet: &Sheet, warnings: &mut Warnings) -> Result<SalesExtract, ExtractError> {
    let (header_idx, index) = find_identity_header(sheet)
        .ok_or_else(|| ExtractError::MissingColumn("SKU Code".to_string()))?;
    let header_row = sheet.row(header_idx).unwrap_or_default();

    let date_columns: Vec<(usize, chrono::NaiveDate)> = header_row
        .iter()
        .enumerate()
        .filter(|(_, header)| DATE_HEADER.is_match(header))
        .filter_map(|(col, header)| normalize::parse_flexible(header).map(|date| (col, date)))
        .collect();
    if date_columns.is_empty() {
        return Err(ExtractError::NoDocuments(
            "no date columns in header row".to_string(),
        ));
    }

    let mut facts = Vec::new();
    let mut source_rows = 0usize;
    let mut skus = std::collections::HashSet::new();

    for (row_idx, row) in sheet.rows().iter().enumerate().skip(header_idx + 1) {
        if Sheet::row_is_blank(row) {
            continue;
        }
        source_rows += 1;
        let record = Record::new(&index, row);

        let Some(sku) = record.field(SKU) else {
            warnings.push(format!("row {}: missing SKU, row dropped", row_idx + 1));
            continue;
        };
        skus.insert(sku.to_string());

        let description = record.field_string(TITLE);
        let brand = record.field_string(BRAND);
        let unit_price = record
            .field(UNIT_PRICE)
            .map(|raw| normalize::coerce_decimal(Some(raw)));

        for (col, date) in &date_columns {
            let quantity = normalize::coerce_units(row.get(*col).map(String::as_str));
            if quantity <= 0 {
                continue;
            }
            facts.push(SalesFact {
                sku: sku.to_string(),
                sku_description: description.clone(),
                brand: brand.clone(),
                sale_date: *date,
                quantity,
                revenue: unit_price.map(|price| price * rust_decimal::Decimal::from(quantity)),
            });
        }
    }

    let summary = ReportSummary {
        source_rows,
        facts: facts.len(),
        total_units: facts.iter().map(|f| f.quantity).sum(),
        distinct_skus: skus.len(),
    };

    Ok(SalesExtract { facts, summary })
}

fn find_identity_header(sheet: &Sheet) -> Option<(usize, HeaderIndex)> {
    for (idx, row) in sheet.rows().iter().enumerate().take(10) {
        let index = HeaderIndex::new(row);
        if index.contains(SKU) && index.contains(TITLE) {
            return Some((idx, index));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const FIXTURE: &str = "\
MetroBazaar Vendor Sales Report,,,,,,
,,,,,,
SKU Code,Product Title,Brand,Selling Price,2025-09-15,2025-09-16,2025-09-17
MB-001,Sunflower Oil 1L,Sungold,199,3,0,5
MB-002,Wheat Atta 10kg,Khet,420,0,2,0
MB-003,Idle SKU,Khet,99,0,0,0
";

    fn parse(csv: &str) -> (SalesExtract, Warnings) {
        let sheet = Sheet::parse(csv.as_bytes()).unwrap();
        let mut warnings = Warnings::default();
        let extract = parse_sales(&sheet, &mut warnings).unwrap();
        (extract, warnings)
    }

    #[test]
    fn each_positive_date_cell_becomes_one_fact() {
        let (extract, warnings) = parse(FIXTURE);
        assert!(warnings.is_empty());
        assert_eq!(extract.facts.len(), 3);

        let first = &extract.facts[0];
        assert_eq!(first.sku, "MB-001");
        assert_eq!(
            first.sale_date,
            NaiveDate::from_ymd_opt(2025, 9, 15).unwrap()
        );
        assert_eq!(first.quantity, 3);
        assert_eq!(first.revenue, Some(dec!(597)));

        // Zero cells are not facts; MB-003 contributes nothing.
        assert!(extract.facts.iter().all(|f| f.sku != "MB-003"));
    }

    #[test]
    fn summary_counts_rows_facts_and_units() {
        let (extract, _) = parse(FIXTURE);
        assert_eq!(extract.summary.source_rows, 3);
        assert_eq!(extract.summary.facts, 3);
        assert_eq!(extract.summary.total_units, 10);
        assert_eq!(extract.summary.distinct_skus, 3);
    }

    #[test]
    fn missing_date_columns_is_fatal() {
        let sheet = Sheet::parse(b"SKU Code,Product Title\nA,B\n").unwrap();
        let mut warnings = Warnings::default();
        assert!(matches!(
            parse_sales(&sheet, &mut warnings),
            Err(ExtractError::NoDocuments(_))
        ));
    }

    #[test]
    fn missing_identity_columns_is_fatal() {
        let sheet = Sheet::parse(b"Foo,Bar\n1,2\n").unwrap();
        let mut warnings = Warnings::default();
        assert!(matches!(
            parse_sales(&sheet, &mut warnings),
            Err(ExtractError::MissingColumn(_))
        ));
    }
}
