//! Inventory snapshot extractor.
//!
//! Partner stock reports are header-named delimited files, one fact row per
//! (city, SKU). Header names differ per partner generation, so identity
//! fields probe alias lists like the purchase-order extractors do.

use crate::errors::ExtractError;
use crate::extract::Warnings;
use crate::models::{InventoryExtract, InventoryFact, ReportSummary};
use crate::normalize;
use crate::sheet::{HeaderIndex, Record, Sheet};

const SKU: &[&str] = &["SKU Code", "SKU", "Item Code"];
const SKU_NAME: &[&str] = &["SKU Name", "Product Name", "Item Name"];
const CATEGORY: &[&str] = &["SKU Category", "Category"];
const BRAND: &[&str] = &["Brand Name", "Brand"];
const CITY: &[&str] = &["City", "Location"];
const UNITS: &[&str] = &["Units", "Qty", "Stock On Hand", "SOH"];

/// Parses a stock report into inventory facts. Rows missing both SKU and
/// SKU name carry no identity and are dropped with a logged reason.
pub fn parse_inventory(
    sheet: &Sheet,
    warnings: &mut Warnings,
) -> Result<InventoryExtract, ExtractError> {
    let header_idx = sheet
        .find_header_row(3)
        .ok_or(ExtractError::Empty)?;
    let index = HeaderIndex::new(sheet.row(header_idx).unwrap_or_default());
    if !index.contains(SKU) && !index.contains(SKU_NAME) {
        return Err(ExtractError::MissingColumn("SKU Code".to_string()));
    }
    if !index.contains(UNITS) {
        return Err(ExtractError::MissingColumn("Units".to_string()));
    }

    let mut facts = Vec::new();
    let mut source_rows = 0usize;
    let mut total_units = 0i64;
    let mut skus = std::collections::HashSet::new();

    for (row_idx, row) in sheet.rows().iter().enumerate().skip(header_idx + 1) {
        if Sheet::row_is_blank(row) {
            continue;
        }
        source_rows += 1;
        let record = Record::new(&index, row);

        let sku = record.field(SKU);
        let name = record.field(SKU_NAME);
        let Some(identity) = sku.or(name) else {
            warnings.push(format!(
                "row {}: missing SKU and SKU name, row dropped",
                row_idx + 1
            ));
            continue;
        };

        let units = normalize::coerce_units(record.field(UNITS));
        total_units += units;
        skus.insert(identity.to_string());

        facts.push(InventoryFact {
            sku: identity.to_string(),
            sku_description: name.map(str::to_string),
            category: record.field_string(CATEGORY),
            brand: record.field_string(BRAND),
            city: record.field_string(CITY),
            quantity: units,
        });
    }

    if facts.is_empty() {
        return Err(ExtractError::NoDocuments(
            "no inventory rows with a SKU identity".to_string(),
        ));
    }

    let summary = ReportSummary {
        source_rows,
        facts: facts.len(),
        total_units,
        distinct_skus: skus.len(),
    };

    Ok(InventoryExtract { facts, summary })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
City,SKU Name,SKU Code,SKU Category,Brand Name,Units
Mumbai,Sunflower Oil 1L,MB-001,Edible Oils,Sungold,140
Pune,Sunflower Oil 1L,MB-001,Edible Oils,Sungold,65
Mumbai,Wheat Atta 10kg,MB-002,Staples,Khet,0
,,,,,12
";

    #[test]
    fn one_fact_per_row_with_identity() {
        let sheet = Sheet::parse(FIXTURE.as_bytes()).unwrap();
        let mut warnings = Warnings::default();
        let extract = parse_inventory(&sheet, &mut warnings).unwrap();

        assert_eq!(extract.facts.len(), 3);
        assert_eq!(extract.facts[0].city.as_deref(), Some("Mumbai"));
        assert_eq!(extract.facts[0].quantity, 140);
        // A zero stock row is still a fact; absence of stock is data.
        assert_eq!(extract.facts[2].quantity, 0);

        // The identity-less trailing row was dropped with a reason.
        assert_eq!(warnings.len(), 1);

        assert_eq!(extract.summary.source_rows, 4);
        assert_eq!(extract.summary.facts, 3);
        assert_eq!(extract.summary.total_units, 205);
        assert_eq!(extract.summary.distinct_skus, 2);
    }

    #[test]
    fn units_column_is_required() {
        let sheet = Sheet::parse(b"City,SKU Name,SKU Code\nMumbai,Oil,A1\n").unwrap();
        let mut warnings = Warnings::default();
        assert!(matches!(
            parse_inventory(&sheet, &mut warnings),
            Err(ExtractError::MissingColumn(_))
        ));
    }
}
