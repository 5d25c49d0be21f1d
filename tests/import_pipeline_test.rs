mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use vendorhub_api::entities::{po_header, po_ledger, po_line};
use vendorhub_api::models::{BatchDisposition, ImportOutcome};
use vendorhub_api::services::PreviewRequest;

/// Two purchase orders interleaved in one SwiftMart export: PO-1 has two
/// rows, PO-2 has one.
const SWIFTMART_CSV: &str = "\
PO No.,PO Date,Vendor Name,PO Amount,SKU Code,SKU Desc,Qty,Unit Base Cost,CGST %,SGST %,Total Amount
PO-1,17-09-2025,North Foods,454,SKU-A,Sunflower Oil 1L,2,150,9,9,354
PO-2,17-09-2025,North Foods,105,SKU-C,Basmati Rice 5kg,1,100,2.5,2.5,105
PO-1,17-09-2025,North Foods,454,SKU-B,Wheat Atta 10kg,1,100,0,0,100
";

fn preview_request() -> PreviewRequest {
    PreviewRequest {
        filename: "swiftmart_orders.csv".to_string(),
        uploaded_by: "ops@vendorhub".to_string(),
        partner: None,
        attachment_path: None,
    }
}

#[tokio::test]
async fn end_to_end_import_is_idempotent() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let db = &*app.state.db;

    let preview = services
        .preview
        .preview(SWIFTMART_CSV.as_bytes(), &preview_request())
        .expect("preview");

    assert_eq!(preview.documents.len(), 2);
    assert_eq!(preview.documents[0].header.po_number, "PO-1");
    assert_eq!(preview.documents[0].lines.len(), 2);
    // PO-1's total quantity is the sum of its two rows' quantities.
    assert_eq!(preview.documents[0].header.total_quantity, dec!(3));
    assert_eq!(preview.documents[1].header.po_number, "PO-2");

    // First import persists both documents.
    let outcome = services.imports.import_batch(&preview.documents).await;
    assert_eq!(outcome.success, 2);
    assert_eq!(outcome.duplicate, 0);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.disposition(), BatchDisposition::AllImported);

    let headers = po_header::Entity::find().count(db).await.unwrap();
    let lines = po_line::Entity::find().count(db).await.unwrap();
    let ledger = po_ledger::Entity::find().count(db).await.unwrap();
    assert_eq!((headers, lines, ledger), (2, 3, 2));

    // Re-importing the same file reports duplicates and writes nothing.
    let again = services
        .preview
        .preview(SWIFTMART_CSV.as_bytes(), &preview_request())
        .expect("second preview");
    let outcome = services.imports.import_batch(&again.documents).await;
    assert_eq!(outcome.success, 0);
    assert_eq!(outcome.duplicate, 2);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.disposition(), BatchDisposition::NothingImported);

    assert_eq!(po_header::Entity::find().count(db).await.unwrap(), 2);
    assert_eq!(po_line::Entity::find().count(db).await.unwrap(), 3);
    assert_eq!(po_ledger::Entity::find().count(db).await.unwrap(), 2);
}

#[tokio::test]
async fn lines_are_tagged_and_renumbered_per_header() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let db = &*app.state.db;

    let preview = services
        .preview
        .preview(SWIFTMART_CSV.as_bytes(), &preview_request())
        .expect("preview");
    services.imports.import_batch(&preview.documents).await;

    let header = po_header::Entity::find()
        .filter(po_header::Column::PoNumber.eq("PO-1"))
        .one(db)
        .await
        .unwrap()
        .expect("PO-1 header");

    let mut lines = po_line::Entity::find()
        .filter(po_line::Column::HeaderId.eq(header.id))
        .all(db)
        .await
        .unwrap();
    lines.sort_by_key(|l| l.line_number);

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].line_number, 1);
    assert_eq!(lines[1].line_number, 2);
    assert_eq!(lines[0].item_code, "SKU-A");

    // Header totals reconcile with the sum of line totals within 0.01.
    let line_sum: rust_decimal::Decimal = lines.iter().map(|l| l.line_total).sum();
    assert!((line_sum - header.grand_total).abs() <= dec!(0.01));

    // The ledger mirror carries the same po_number and totals.
    let mirrored = po_ledger::Entity::find()
        .filter(po_ledger::Column::PoNumber.eq("PO-1"))
        .one(db)
        .await
        .unwrap()
        .expect("ledger row");
    assert_eq!(mirrored.header_id, header.id);
    assert_eq!(mirrored.grand_total, header.grand_total);
}

#[tokio::test]
async fn concurrent_imports_of_same_po_yield_one_success_one_duplicate() {
    let app = TestApp::new().await;
    let services = &app.state.services;

    let preview = services
        .preview
        .preview(SWIFTMART_CSV.as_bytes(), &preview_request())
        .expect("preview");
    let po = preview.documents[0].clone();

    let imports_a = services.imports.clone();
    let imports_b = services.imports.clone();
    let po_a = po.clone();
    let po_b = po.clone();

    let (a, b) = tokio::join!(
        tokio::spawn(async move { imports_a.import(&po_a).await }),
        tokio::spawn(async move { imports_b.import(&po_b).await }),
    );
    let outcomes = [a.unwrap().unwrap(), b.unwrap().unwrap()];

    let imported = outcomes
        .iter()
        .filter(|o| matches!(o, ImportOutcome::Imported { .. }))
        .count();
    let duplicates = outcomes
        .iter()
        .filter(|o| matches!(o, ImportOutcome::Duplicate { .. }))
        .count();
    assert_eq!((imported, duplicates), (1, 1));

    let headers = po_header::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(headers, 1);
}

#[tokio::test]
async fn partial_batch_reports_mixed_disposition() {
    let app = TestApp::new().await;
    let services = &app.state.services;

    let preview = services
        .preview
        .preview(SWIFTMART_CSV.as_bytes(), &preview_request())
        .expect("preview");

    // Seed PO-2 alone, then submit the whole file.
    let second = preview.documents[1].clone();
    services.imports.import(&second).await.expect("seed import");

    let outcome = services.imports.import_batch(&preview.documents).await;
    assert_eq!(outcome.success, 1);
    assert_eq!(outcome.duplicate, 1);
    assert_eq!(outcome.disposition(), BatchDisposition::Partial);

    // The duplicate entry identifies what it collided with.
    let duplicate = outcome
        .results
        .iter()
        .find(|r| r.po_number == "PO-2")
        .expect("PO-2 result");
    assert!(matches!(
        duplicate.status,
        vendorhub_api::models::ItemStatus::Duplicate { .. }
    ));
}

#[tokio::test]
async fn duplicate_outcome_carries_existing_record_details() {
    let app = TestApp::new().await;
    let services = &app.state.services;

    let preview = services
        .preview
        .preview(SWIFTMART_CSV.as_bytes(), &preview_request())
        .expect("preview");
    let po = &preview.documents[0];

    services.imports.import(po).await.expect("first import");
    let outcome = services.imports.import(po).await.expect("second import");

    match outcome {
        ImportOutcome::Duplicate { existing } => {
            assert_eq!(existing.po_number, "PO-1");
            assert_eq!(existing.vendor_name.as_deref(), Some("North Foods"));
            assert!(existing.header_id > 0);
        }
        other => panic!("expected duplicate outcome, got {:?}", other),
    }
}
