//! UrbanBasket purchase-order extractor.
//!
//! UrbanBasket sends a spreadsheet template with no labelled columns in the
//! metadata block: the order number, party blocks, and dates sit at fixed
//! (row, column) positions reverse-engineered from the partner's template.
//! Address blocks are rebuilt by concatenating non-empty cells down a fixed
//! column; dates arrive as spreadsheet serial numbers. There is no
//! structural validation beyond "row has at least N cells" — a template
//! change breaks extraction silently.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ExtractError;
use crate::extract::{
    is_boilerplate, Confidence, ExtractContext, Extraction, NativeHeader, NativeLine, NativePo,
    PoExtractor, Warnings,
};
use crate::models::Partner;
use crate::normalize;
use crate::sheet::Sheet;

// Template geometry (0-based). The metadata block occupies rows 2..=10,
// line headers sit on row 11, line data starts at row 12.
const ROW_PO_NUMBER: usize = 2;
const ROW_DATE_CREATED: usize = 4;
const ROW_DATE_DELIVERY: usize = 6;
const ROW_DATE_EXPIRY: usize = 8;
const ROW_TAX_ID: usize = 8;
const ROW_VENDOR_CODE: usize = 9;
const ROW_LINE_HEADER: usize = 11;
const ROW_LINES_START: usize = 12;

const COL_VENDOR_BLOCK: usize = 1;
const COL_SHIP_BLOCK: usize = 3;
const COL_BILL_BLOCK: usize = 7;
const ADDRESS_ROWS: std::ops::RangeInclusive<usize> = 3..=6;

// Line region columns; column 7 is a spacer in the template.
const COL_SKU: usize = 0;
const COL_NAME: usize = 1;
const COL_COMBINED_RATE: usize = 2;
const COL_SURCHARGE_RATE: usize = 3;
const COL_TAX_CODE: usize = 4;
const COL_QTY: usize = 5;
const COL_MRP: usize = 6;
const COL_BUY_PRICE: usize = 8;
const COL_GROSS: usize = 9;
const MIN_LINE_CELLS: usize = 6;

static TAX_ID_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"GSTIN:\s*(\S+)").expect("invalid tax id regex"));
static VENDOR_CODE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Vendor Code:\s*(\S+)").expect("invalid vendor code regex"));

pub struct UrbanbasketExtractor;

impl PoExtractor for UrbanbasketExtractor {
    fn partner(&self) -> Partner {
        Partner::Urbanbasket
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["urbanbasket", "urban_basket", "urban-basket"]
    }

    fn detect(&self, sheet: &Sheet, _filename: &str) -> Confidence {
        if sheet
            .cell(ROW_LINE_HEADER, COL_SKU)
            .eq_ignore_ascii_case("sku")
            && !sheet.cell(ROW_PO_NUMBER, 0).is_empty()
        {
            Confidence::STRONG
        } else if sheet.row_count() > ROW_LINES_START && !sheet.cell(ROW_PO_NUMBER, 0).is_empty() {
            Confidence::WEAK
        } else {
            Confidence::NONE
        }
    }

    fn extract(
        &self,
        sheet: &Sheet,
        _ctx: &ExtractContext<'_>,
        warnings: &mut Warnings,
    ) -> Result<Extraction, ExtractError> {
        let po_number = sheet.cell(ROW_PO_NUMBER, 0).to_string();
        if po_number.is_empty() {
            return Err(ExtractError::Malformed(
                "order number cell is empty; template layout not recognized".to_string(),
            ));
        }

        let header = NativeHeader {
            po_number,
            po_date: serial_date(sheet, ROW_DATE_CREATED),
            delivery_date: serial_date(sheet, ROW_DATE_DELIVERY),
            expiry_date: serial_date(sheet, ROW_DATE_EXPIRY),
            vendor_name: non_empty(sheet.cell(ROW_PO_NUMBER, COL_VENDOR_BLOCK)),
            vendor_code: labelled(sheet.cell(ROW_VENDOR_CODE, COL_VENDOR_BLOCK), &VENDOR_CODE_LABEL),
            vendor_tax_id: labelled(sheet.cell(ROW_TAX_ID, COL_VENDOR_BLOCK), &TAX_ID_LABEL),
            buyer_name: non_empty(sheet.cell(ROW_PO_NUMBER, COL_SHIP_BLOCK)),
            ship_to: address_block(sheet, COL_SHIP_BLOCK),
            bill_to: address_block(sheet, COL_BILL_BLOCK),
            ..NativeHeader::default()
        };

        let mut lines = Vec::new();
        for row_idx in ROW_LINES_START..sheet.row_count() {
            let row = match sheet.row(row_idx) {
                Some(row) if !Sheet::row_is_blank(row) => row,
                _ => continue,
            };
            if row.len() < MIN_LINE_CELLS {
                warnings.push(format!(
                    "row {}: fewer than {} cells, row dropped",
                    row_idx + 1,
                    MIN_LINE_CELLS
                ));
                continue;
            }

            let sku = sheet.cell(row_idx, COL_SKU);
            let name = sheet.cell(row_idx, COL_NAME);
            if sku.is_empty() || sheet.cell(row_idx, COL_QTY).is_empty() {
                warnings.push(format!(
                    "row {}: missing SKU or quantity, row dropped",
                    row_idx + 1
                ));
                continue;
            }
            if is_boilerplate(sku) || is_boilerplate(name) {
                warnings.push(format!("row {}: summary row dropped", row_idx + 1));
                continue;
            }

            lines.push(NativeLine {
                item_code: sku.to_string(),
                description: non_empty(name),
                tax_code: non_empty(sheet.cell(row_idx, COL_TAX_CODE)),
                quantity: non_empty(sheet.cell(row_idx, COL_QTY)),
                unit_cost: non_empty(sheet.cell(row_idx, COL_BUY_PRICE)),
                mrp: non_empty(sheet.cell(row_idx, COL_MRP)),
                combined_rate: non_empty(sheet.cell(row_idx, COL_COMBINED_RATE)),
                surcharge_rate: non_empty(sheet.cell(row_idx, COL_SURCHARGE_RATE)),
                line_total: non_empty(sheet.cell(row_idx, COL_GROSS)),
                ..NativeLine::default()
            });
        }

        if lines.is_empty() {
            return Err(ExtractError::NoDocuments(
                "no line rows below the template header".to_string(),
            ));
        }

        Ok(Extraction::Single(NativePo {
            partner: Partner::Urbanbasket,
            header,
            lines,
        }))
    }
}

/// Dates in the metadata block are spreadsheet serial numbers. Text in the
/// cell (a stray label, a blank) simply yields no date.
fn serial_date(sheet: &Sheet, row: usize) -> Option<chrono::NaiveDate> {
    let raw = sheet.cell(row, 0);
    raw.parse::<f64>().ok().and_then(normalize::from_serial)
}

/// Rebuilds a party address by joining the non-empty cells of one column
/// across the template's address rows.
fn address_block(sheet: &Sheet, col: usize) -> Option<String> {
    let parts: Vec<&str> = ADDRESS_ROWS
        .map(|row| sheet.cell(row, col))
        .filter(|cell| !cell.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn labelled(cell: &str, pattern: &Regex) -> Option<String> {
    pattern.captures(cell).map(|caps| caps[1].to_string())
}

fn non_empty(cell: &str) -> Option<String> {
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}
