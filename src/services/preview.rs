use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::assemble;
use crate::classify::Classifier;
use crate::config::ImportPolicy;
use crate::errors::ServiceError;
use crate::extract::{ExtractContext, Warnings};
use crate::models::{CanonicalPo, Partner};
use crate::services::sha256_hex;
use crate::sheet::Sheet;

/// Caller parameters for the preview operation, checked before the file is
/// touched.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PreviewRequest {
    #[validate(length(min = 1, message = "filename is required"))]
    pub filename: String,

    #[validate(length(min = 1, message = "uploader identity is required"))]
    pub uploaded_by: String,

    /// Explicit partner hint; skips filename and content classification.
    pub partner: Option<String>,

    /// Blob-storage reference of the retained original file.
    pub attachment_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewSummary {
    pub documents: usize,
    pub total_lines: usize,
    pub total_quantity: Decimal,
    pub grand_total: Decimal,
}

/// Canonical preview of an uploaded file: what the import would persist,
/// without persisting it. Deterministic for identical bytes.
#[derive(Debug, Clone, Serialize)]
pub struct PoPreview {
    pub partner: Partner,
    pub documents: Vec<CanonicalPo>,
    pub warnings: Vec<String>,
    pub summary: PreviewSummary,
}

pub struct PreviewService {
    classifier: Classifier,
    policy: ImportPolicy,
}

impl PreviewService {
    pub fn new(policy: ImportPolicy) -> Self {
        Self {
            classifier: Classifier::default(),
            policy,
        }
    }

    /// Classifies, extracts, and assembles a purchase-order file into its
    /// canonical document(s).
    #[instrument(skip(self, bytes, request), fields(filename = %request.filename))]
    pub fn preview(&self, bytes: &[u8], request: &PreviewRequest) -> Result<PoPreview, ServiceError> {
        request.validate()?;

        let sheet = Sheet::parse(bytes)
            .map_err(|e| ServiceError::UnrecognizedFormat(e.to_string()))?;
        let extractor =
            self.classifier
                .classify(&sheet, &request.filename, request.partner.as_deref())?;
        let partner = extractor.partner();

        let file_hash = sha256_hex(bytes);
        let ctx = ExtractContext {
            filename: &request.filename,
            uploaded_by: &request.uploaded_by,
            file_hash: &file_hash,
        };

        let mut warnings = Warnings::default();
        let extraction = extractor
            .extract(&sheet, &ctx, &mut warnings)
            .map_err(|source| ServiceError::Extraction { partner, source })?;

        let documents: Vec<CanonicalPo> = extraction
            .into_documents()
            .into_iter()
            .map(|native| {
                assemble::assemble(
                    native,
                    &self.policy,
                    &request.uploaded_by,
                    request.attachment_path.as_deref(),
                    &mut warnings,
                )
            })
            .collect();

        let summary = PreviewSummary {
            documents: documents.len(),
            total_lines: documents.iter().map(|d| d.lines.len()).sum(),
            total_quantity: documents.iter().map(|d| d.header.total_quantity).sum(),
            grand_total: documents.iter().map(|d| d.header.grand_total).sum(),
        };

        info!(
            partner = %partner,
            documents = summary.documents,
            lines = summary.total_lines,
            warnings = warnings.len(),
            "preview assembled"
        );

        Ok(PoPreview {
            partner,
            documents,
            warnings: warnings.into_vec(),
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    const SWIFTMART_CSV: &str = "\
PO No.,PO Date,Vendor Name,PO Amount,SKU Code,SKU Desc,Qty,Unit Base Cost,CGST %,SGST %,Total Amount
PO-1,17-09-2025,North Foods,454,SKU-A,Sunflower Oil 1L,2,150,9,9,354
PO-2,17-09-2025,North Foods,105,SKU-C,Basmati Rice 5kg,1,100,2.5,2.5,105
PO-1,17-09-2025,North Foods,354,SKU-B,Wheat Atta 10kg,1,100,0,0,100
";

    fn request() -> PreviewRequest {
        PreviewRequest {
            filename: "swiftmart_orders.csv".to_string(),
            uploaded_by: "ops@vendorhub".to_string(),
            partner: None,
            attachment_path: None,
        }
    }

    fn service() -> PreviewService {
        PreviewService::new(ImportPolicy::default())
    }

    #[test]
    fn multi_document_file_previews_in_first_seen_order() {
        let preview = service()
            .preview(SWIFTMART_CSV.as_bytes(), &request())
            .unwrap();

        assert_eq!(preview.partner, Partner::Swiftmart);
        assert_eq!(preview.summary.documents, 2);
        assert_eq!(preview.documents[0].header.po_number, "PO-1");
        assert_eq!(preview.documents[0].lines.len(), 2);
        assert_eq!(preview.documents[1].header.po_number, "PO-2");
        assert_eq!(preview.documents[1].lines.len(), 1);

        // PO-1 quantity is the sum of its two rows.
        assert_eq!(preview.documents[0].header.total_quantity, dec!(3));
    }

    #[test]
    fn preview_is_deterministic_for_identical_bytes() {
        let svc = service();
        let a = svc.preview(SWIFTMART_CSV.as_bytes(), &request()).unwrap();
        let b = svc.preview(SWIFTMART_CSV.as_bytes(), &request()).unwrap();
        assert_eq!(a.documents, b.documents);
        assert_eq!(
            serde_json::to_value(&a.documents).unwrap(),
            serde_json::to_value(&b.documents).unwrap()
        );
    }

    #[test]
    fn totals_reconcile_within_tolerance() {
        let preview = service()
            .preview(SWIFTMART_CSV.as_bytes(), &request())
            .unwrap();
        for document in &preview.documents {
            let diff = (document.line_total_sum() - document.header.grand_total).abs();
            assert!(diff <= dec!(0.01));
        }
    }

    #[test]
    fn blank_uploader_is_rejected_before_parsing() {
        let mut req = request();
        req.uploaded_by = String::new();
        let err = service().preview(b"not,even,csv", &req).unwrap_err();
        assert_matches!(err, ServiceError::Validation(_));
    }

    #[test]
    fn unrecognized_file_is_rejected() {
        let mut req = request();
        req.filename = "mystery.csv".to_string();
        let err = service().preview(b"Foo,Bar\n1,2\n", &req).unwrap_err();
        assert_matches!(err, ServiceError::UnrecognizedFormat(_));
    }
}
