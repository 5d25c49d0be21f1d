//! FreshKart purchase-order extractor.
//!
//! FreshKart portal downloads carry one purchase order per file and no
//! header block at all: the order number only exists in the download's
//! filename ("PO-1346338_20250917.csv"). Levy rate and surcharge share one
//! newline-separated cell, as do their amounts.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ExtractError;
use crate::extract::{
    is_boilerplate, Confidence, ExtractContext, Extraction, NativeHeader, NativeLine, NativePo,
    PoExtractor, Warnings,
};
use crate::models::Partner;
use crate::sheet::{HeaderIndex, Record, Sheet};

const ARTICLE_ID: &[&str] = &["Article Id", "Article ID", "Item Id"];
const ARTICLE_NAME: &[&str] = &["Article Name", "Item Name"];
const TAX_CODE: &[&str] = &["HSN Code", "HSN"];
const MRP: &[&str] = &["MRP (₹)", "MRP"];
const BASE_COST: &[&str] = &["Base Cost Price (₹)", "Base Cost Price"];
const QUANTITY: &[&str] = &["Quantity", "Qty"];
const BASE_AMOUNT: &[&str] = &["Base Amount (₹)", "Base Amount"];
const LEVY_RATES: &[&str] = &["IGST (%) cess (%)", "IGST (%) CESS (%)"];
const LEVY_AMOUNTS: &[&str] = &["IGST (₹) cess", "IGST (₹) CESS (₹)"];
const LINE_TOTAL: &[&str] = &["Total Amount (₹)", "Total Amount"];

static FILENAME_PO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)PO[-_]?(\d+)").expect("invalid filename regex"));

pub struct FreshkartExtractor;

impl PoExtractor for FreshkartExtractor {
    fn partner(&self) -> Partner {
        Partner::Freshkart
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["freshkart", "fresh_kart", "fresh-kart"]
    }

    fn detect(&self, sheet: &Sheet, _filename: &str) -> Confidence {
        let Some(header_row) = sheet.row(0) else {
            return Confidence::NONE;
        };
        let index = HeaderIndex::new(header_row);
        if index.contains(ARTICLE_ID) && index.contains(BASE_COST) {
            Confidence::STRONG
        } else if index.contains(ARTICLE_ID) && index.contains(QUANTITY) {
            Confidence::WEAK
        } else {
            Confidence::NONE
        }
    }

    fn extract(
        &self,
        sheet: &Sheet,
        ctx: &ExtractContext<'_>,
        warnings: &mut Warnings,
    ) -> Result<Extraction, ExtractError> {
        let header_row = sheet.row(0).ok_or(ExtractError::Empty)?;
        let index = HeaderIndex::new(header_row);
        if !index.contains(ARTICLE_ID) {
            return Err(ExtractError::MissingColumn("Article Id".to_string()));
        }

        let po_number = po_number_for(ctx);

        let mut lines = Vec::new();
        for (row_idx, row) in sheet.rows().iter().enumerate().skip(1) {
            if Sheet::row_is_blank(row) {
                continue;
            }
            let record = Record::new(&index, row);

            let Some(article_id) = record.field(ARTICLE_ID) else {
                warnings.push(format!(
                    "row {}: missing article id, row dropped",
                    row_idx + 1
                ));
                continue;
            };
            if is_boilerplate(article_id)
                || record.field(ARTICLE_NAME).is_some_and(is_boilerplate)
            {
                warnings.push(format!("row {}: summary row dropped", row_idx + 1));
                continue;
            }

            // Rate and surcharge percentages stack in one cell, newline
            // separated; the amounts cell mirrors that layout.
            let (integrated_rate, surcharge_rate) = split_stacked(record.field(LEVY_RATES));
            let (integrated_amount, surcharge_amount) = split_stacked(record.field(LEVY_AMOUNTS));

            lines.push(NativeLine {
                item_code: article_id.to_string(),
                description: record.field_string(ARTICLE_NAME),
                tax_code: record.field_string(TAX_CODE),
                quantity: record.field_string(QUANTITY),
                unit_cost: record.field_string(BASE_COST),
                mrp: record.field_string(MRP),
                taxable_value: record.field_string(BASE_AMOUNT),
                integrated_rate,
                integrated_amount,
                surcharge_rate,
                surcharge_amount,
                line_total: record.field_string(LINE_TOTAL),
                ..NativeLine::default()
            });
        }

        if lines.is_empty() {
            return Err(ExtractError::NoDocuments(
                "no line rows with an article id".to_string(),
            ));
        }

        Ok(Extraction::Single(NativePo {
            partner: Partner::Freshkart,
            header: NativeHeader {
                po_number,
                ..NativeHeader::default()
            },
            lines,
        }))
    }
}

/// The order number lives in the filename. When even that is absent the
/// number is synthesized from the file hash so a re-parse of the same bytes
/// stays deterministic.
fn po_number_for(ctx: &ExtractContext<'_>) -> String {
    if let Some(caps) = FILENAME_PO.captures(ctx.filename) {
        return caps[1].to_string();
    }
    let seed: String = ctx.file_hash.chars().take(10).collect();
    format!("FK-{}", seed)
}

fn split_stacked(cell: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(cell) = cell else {
        return (None, None);
    };
    let mut parts = cell.splitn(2, '\n');
    let first = parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let second = parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    (first, second)
}
