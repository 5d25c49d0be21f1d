//! SwiftMart purchase-order extractor.
//!
//! SwiftMart exports are header-named delimited files that bundle every open
//! purchase order for a vendor into one download, distinguished only by the
//! repeating PO-number column. Column names have drifted across three format
//! revisions, so every logical field probes an ordered alias list.

use crate::errors::ExtractError;
use crate::extract::{
    group_preserving_order, is_boilerplate, Confidence, ExtractContext, Extraction, NativeHeader,
    NativeLine, NativePo, PoExtractor, Warnings,
};
use crate::models::Partner;
use crate::normalize;
use crate::sheet::{HeaderIndex, Record, Sheet};

// Ordered newest-first; older generations follow.
const PO_NUMBER: &[&str] = &["PO No.", "PO Number", "Order No"];
const PO_DATE: &[&str] = &["PO Date", "Order Date", "Created On"];
const EXPIRY_DATE: &[&str] = &["PO Expiry Date", "Expiry Date", "Valid Till"];
const DELIVERY_DATE: &[&str] = &["Delivery Date", "Expected Delivery"];
const VENDOR_CODE: &[&str] = &["Vendor Code", "Supplier Code"];
const VENDOR_NAME: &[&str] = &["Vendor Name", "Supplier Name"];
const DELIVERY_LOCATION: &[&str] = &["Del Location", "Delivery Location", "Facility"];
const DECLARED_AMOUNT: &[&str] = &["PO Amount", "PO Value"];
const SKU: &[&str] = &["SKU Code", "SKU", "Item Code"];
const SKU_DESC: &[&str] = &["SKU Desc", "SKU Description", "Item Name"];
const BRAND: &[&str] = &["Brand"];
const TAX_CODE: &[&str] = &["HSN", "HSN Code"];
const QUANTITY: &[&str] = &["Qty", "PO Qty", "Quantity"];
const UNIT_COST: &[&str] = &["Unit Base Cost", "Unit Cost", "Cost Price"];
const CENTRAL_RATE: &[&str] = &["CGST %", "CGST"];
const STATE_RATE: &[&str] = &["SGST %", "SGST"];
const INTEGRATED_RATE: &[&str] = &["IGST %", "IGST"];
const SURCHARGE_RATE: &[&str] = &["CESS %", "CESS"];
const MRP: &[&str] = &["MRP"];
const LINE_TOTAL: &[&str] = &["Total Amount", "Total Value", "Line Total"];

pub struct SwiftmartExtractor;

impl PoExtractor for SwiftmartExtractor {
    fn partner(&self) -> Partner {
        Partner::Swiftmart
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["swiftmart", "swift_mart", "swift-mart"]
    }

    fn detect(&self, sheet: &Sheet, _filename: &str) -> Confidence {
        let Some(header_row) = sheet.row(0) else {
            return Confidence::NONE;
        };
        let index = HeaderIndex::new(header_row);
        if index.contains(PO_NUMBER) && index.contains(SKU) && index.contains(QUANTITY) {
            Confidence::STRONG
        } else if index.contains(SKU_DESC) && index.contains(UNIT_COST) {
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
        let header_row = sheet.row(0).ok_or(ExtractError::Empty)?;
        let index = HeaderIndex::new(header_row);
        if !index.contains(PO_NUMBER) {
            return Err(ExtractError::MissingColumn("PO No.".to_string()));
        }
        if !index.contains(SKU) {
            return Err(ExtractError::MissingColumn("SKU Code".to_string()));
        }

        let mut keyed_rows = Vec::new();
        for (row_idx, row) in sheet.rows().iter().enumerate().skip(1) {
            if Sheet::row_is_blank(row) {
                continue;
            }
            let record = Record::new(&index, row);

            let first_cell = row.first().map(String::as_str).unwrap_or("");
            if is_boilerplate(first_cell) {
                warnings.push(format!("row {}: boilerplate row dropped", row_idx + 1));
                continue;
            }

            let Some(po_number) = record.field(PO_NUMBER) else {
                warnings.push(format!("row {}: missing PO number, row dropped", row_idx + 1));
                continue;
            };
            let Some(sku) = record.field(SKU) else {
                warnings.push(format!("row {}: missing SKU, row dropped", row_idx + 1));
                continue;
            };
            if is_boilerplate(sku) {
                warnings.push(format!("row {}: boilerplate row dropped", row_idx + 1));
                continue;
            }

            keyed_rows.push((po_number.to_string(), (sku.to_string(), record)));
        }

        let groups = group_preserving_order(keyed_rows);
        if groups.is_empty() {
            return Err(ExtractError::NoDocuments(
                "no rows with a PO number".to_string(),
            ));
        }

        let documents = groups
            .into_iter()
            .map(|(po_number, rows)| self.build_document(po_number, rows))
            .collect();
        Ok(Extraction::Multiple(documents))
    }
}

impl SwiftmartExtractor {
    fn build_document(
        &self,
        po_number: String,
        rows: Vec<(String, Record<'_>)>,
    ) -> NativePo {
        // Header fields repeat on every row of the group; the first row is
        // as good as any.
        let first = rows
            .first()
            .map(|(_, record)| *record)
            .expect("group always has at least one row");

        let header = NativeHeader {
            po_number,
            po_date: first
                .field(PO_DATE)
                .and_then(normalize::parse_flexible),
            expiry_date: first
                .field(EXPIRY_DATE)
                .and_then(normalize::parse_flexible),
            delivery_date: first
                .field(DELIVERY_DATE)
                .and_then(normalize::parse_flexible),
            vendor_name: first.field_string(VENDOR_NAME),
            vendor_code: first.field_string(VENDOR_CODE),
            ship_to: first.field_string(DELIVERY_LOCATION),
            declared_total: first.field_string(DECLARED_AMOUNT),
            ..NativeHeader::default()
        };

        let lines = rows
            .into_iter()
            .map(|(sku, record)| NativeLine {
                item_code: sku,
                description: record.field_string(SKU_DESC),
                category: record.field_string(BRAND),
                tax_code: record.field_string(TAX_CODE),
                quantity: record.field_string(QUANTITY),
                unit_cost: record.field_string(UNIT_COST),
                mrp: record.field_string(MRP),
                central_rate: record.field_string(CENTRAL_RATE),
                state_rate: record.field_string(STATE_RATE),
                integrated_rate: record.field_string(INTEGRATED_RATE),
                surcharge_rate: record.field_string(SURCHARGE_RATE),
                line_total: record.field_string(LINE_TOTAL),
                ..NativeLine::default()
            })
            .collect();

        NativePo {
            partner: Partner::Swiftmart,
            header,
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const CTX: ExtractContext<'static> = ExtractContext {
        filename: "swiftmart_po_export.csv",
        uploaded_by: "tester",
        file_hash: "0000",
    };

    fn extract(csv: &str) -> (Extraction, Warnings) {
        let sheet = Sheet::parse(csv.as_bytes()).unwrap();
        let mut warnings = Warnings::default();
        let extraction = SwiftmartExtractor
            .extract(&sheet, &CTX, &mut warnings)
            .unwrap();
        (extraction, warnings)
    }

    const INTERLEAVED: &str = "\
PO No.,PO Date,PO Expiry Date,Vendor Code,Vendor Name,Del Location,PO Amount,SKU Code,SKU Desc,Brand,HSN,Qty,Unit Base Cost,CGST %,SGST %,MRP,Total Amount
PO-1,17-09-2025,30-09-2025,V042,North Foods,Pune FC,472.5,SKU-A,Sunflower Oil 1L,Sungold,15121110,2,150,9,9,199,354
PO-2,17-09-2025,30-09-2025,V042,North Foods,Pune FC,118.1,SKU-C,Basmati Rice 5kg,Khet,10063020,1,100,2.5,2.5,149,105
PO-1,17-09-2025,30-09-2025,V042,North Foods,Pune FC,472.5,SKU-B,Wheat Atta 10kg,Khet,11010000,1,100,0,0,120,100
Total,,,,,,,,,,,4,,,,,577
";

    #[test]
    fn groups_interleaved_rows_in_first_seen_order() {
        let (extraction, warnings) = extract(INTERLEAVED);
        let documents = extraction.into_documents();
        assert_eq!(documents.len(), 2);

        assert_eq!(documents[0].header.po_number, "PO-1");
        assert_eq!(documents[0].lines.len(), 2);
        assert_eq!(documents[0].lines[0].item_code, "SKU-A");
        assert_eq!(documents[0].lines[1].item_code, "SKU-B");

        assert_eq!(documents[1].header.po_number, "PO-2");
        assert_eq!(documents[1].lines.len(), 1);

        // Summary row is dropped with a reason, not parsed as a line.
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn header_fields_come_from_first_row_of_group() {
        let (extraction, _) = extract(INTERLEAVED);
        let documents = extraction.into_documents();
        let header = &documents[0].header;
        assert_eq!(
            header.po_date,
            Some(NaiveDate::from_ymd_opt(2025, 9, 17).unwrap())
        );
        assert_eq!(header.vendor_name.as_deref(), Some("North Foods"));
        assert_eq!(header.vendor_code.as_deref(), Some("V042"));
        assert_eq!(header.ship_to.as_deref(), Some("Pune FC"));
        assert_eq!(header.declared_total.as_deref(), Some("472.5"));
    }

    #[test]
    fn legacy_header_aliases_are_probed() {
        let csv = "\
Order No,Order Date,Supplier Name,Item Code,Item Name,Quantity,Cost Price,Line Total
PO-9,2025-01-05,South Foods,SKU-X,Turmeric Powder 200g,5,40,200
";
        let (extraction, warnings) = extract(csv);
        let documents = extraction.into_documents();
        assert_eq!(documents[0].header.po_number, "PO-9");
        assert_eq!(
            documents[0].lines[0].description.as_deref(),
            Some("Turmeric Powder 200g")
        );
        assert_eq!(documents[0].lines[0].quantity.as_deref(), Some("5"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn rows_missing_identity_fields_are_dropped_not_fatal() {
        let csv = "\
PO No.,SKU Code,SKU Desc,Qty,Unit Base Cost
PO-1,SKU-A,Milk 500ml,2,25
,SKU-B,Orphan Row,1,10
PO-1,,No Sku Here,1,10
";
        let (extraction, warnings) = extract(csv);
        let documents = extraction.into_documents();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].lines.len(), 1);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn file_with_no_po_numbers_is_no_documents() {
        let csv = "PO No.,SKU Code,Qty\n,,\n";
        let sheet = Sheet::parse(csv.as_bytes()).unwrap();
        let mut warnings = Warnings::default();
        let err = SwiftmartExtractor
            .extract(&sheet, &CTX, &mut warnings)
            .unwrap_err();
        assert!(matches!(err, ExtractError::NoDocuments(_)));
    }

    #[test]
    fn detect_is_strong_for_current_headers() {
        let sheet = Sheet::parse(INTERLEAVED.as_bytes()).unwrap();
        assert_eq!(
            SwiftmartExtractor.detect(&sheet, "anything.csv"),
            Confidence::STRONG
        );
    }

    #[test]
    fn detect_rejects_foreign_layouts() {
        let sheet = Sheet::parse(b"Article Id,Article Name,Quantity\n1,x,2\n").unwrap();
        assert_eq!(
            SwiftmartExtractor.detect(&sheet, "anything.csv"),
            Confidence::NONE
        );
    }
}
