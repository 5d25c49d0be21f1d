mod common;

use chrono::NaiveDate;
use common::TestApp;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use vendorhub_api::entities::{inventory_snapshot, secondary_sale, upload_tracking};
use vendorhub_api::errors::ServiceError;
use vendorhub_api::models::{Partner, PeriodType, ReportOutcome};
use vendorhub_api::services::ReportRequest;

const INVENTORY_CSV: &str = "\
City,SKU Name,SKU Code,SKU Category,Brand Name,Units
Mumbai,Sunflower Oil 1L,MB-001,Edible Oils,Sungold,140
Pune,Sunflower Oil 1L,MB-001,Edible Oils,Sungold,65
Mumbai,Wheat Atta 10kg,MB-002,Staples,Khet,30
";

const SALES_CSV: &str = "\
SKU Code,Product Title,Brand,Selling Price,2025-09-15,2025-09-16
MB-001,Sunflower Oil 1L,Sungold,199,3,0
MB-002,Wheat Atta 10kg,Khet,420,0,2
";

fn inventory_request() -> ReportRequest {
    ReportRequest {
        partner: Partner::Metrobazaar,
        business_unit: "foods".to_string(),
        period_type: PeriodType::Daily,
        report_date: NaiveDate::from_ymd_opt(2025, 9, 17),
        period_start: None,
        period_end: None,
        filename: "metrobazaar_stock.csv".to_string(),
        uploaded_by: "ops@vendorhub".to_string(),
        attachment_path: None,
    }
}

fn sales_request() -> ReportRequest {
    ReportRequest {
        partner: Partner::Metrobazaar,
        business_unit: "foods".to_string(),
        period_type: PeriodType::DateRange,
        report_date: None,
        period_start: NaiveDate::from_ymd_opt(2025, 9, 15),
        period_end: NaiveDate::from_ymd_opt(2025, 9, 16),
        filename: "metrobazaar_sales.csv".to_string(),
        uploaded_by: "ops@vendorhub".to_string(),
        attachment_path: None,
    }
}

#[tokio::test]
async fn identical_inventory_file_is_rejected_on_reupload() {
    let app = TestApp::new().await;
    let reports = &app.state.services.reports;
    let db = &*app.state.db;

    let outcome = reports
        .import_inventory(INVENTORY_CSV.as_bytes(), &inventory_request())
        .await
        .expect("first import");
    match outcome {
        ReportOutcome::Imported { rows, summary } => {
            assert_eq!(rows, 3);
            assert_eq!(summary.total_units, 235);
            assert_eq!(summary.distinct_skus, 2);
        }
        other => panic!("expected imported outcome, got {:?}", other),
    }

    assert_eq!(
        inventory_snapshot::Entity::find().count(db).await.unwrap(),
        3
    );
    assert_eq!(upload_tracking::Entity::find().count(db).await.unwrap(), 1);

    // Same bytes, same combination: duplicate file, nothing persisted.
    let outcome = reports
        .import_inventory(INVENTORY_CSV.as_bytes(), &inventory_request())
        .await
        .expect("second import");
    match outcome {
        ReportOutcome::DuplicateFile {
            first_uploaded_by, ..
        } => assert_eq!(first_uploaded_by, "ops@vendorhub"),
        other => panic!("expected duplicate file outcome, got {:?}", other),
    }
    assert_eq!(
        inventory_snapshot::Entity::find().count(db).await.unwrap(),
        3
    );
}

#[tokio::test]
async fn same_file_for_different_business_unit_is_accepted() {
    let app = TestApp::new().await;
    let reports = &app.state.services.reports;

    reports
        .import_inventory(INVENTORY_CSV.as_bytes(), &inventory_request())
        .await
        .expect("first import");

    let mut request = inventory_request();
    request.business_unit = "personal-care".to_string();
    let outcome = reports
        .import_inventory(INVENTORY_CSV.as_bytes(), &request)
        .await
        .expect("different combination");
    assert!(matches!(outcome, ReportOutcome::Imported { rows: 3, .. }));

    assert_eq!(
        upload_tracking::Entity::find()
            .count(&*app.state.db)
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn date_column_sales_report_lands_one_row_per_positive_cell() {
    let app = TestApp::new().await;
    let reports = &app.state.services.reports;
    let db = &*app.state.db;

    let outcome = reports
        .import_sales(SALES_CSV.as_bytes(), &sales_request())
        .await
        .expect("sales import");
    assert!(matches!(outcome, ReportOutcome::Imported { rows: 2, .. }));

    let facts = secondary_sale::Entity::find().all(db).await.unwrap();
    assert_eq!(facts.len(), 2);

    let oil = facts.iter().find(|f| f.sku == "MB-001").expect("oil fact");
    assert_eq!(
        oil.sale_date,
        NaiveDate::from_ymd_opt(2025, 9, 15).unwrap()
    );
    assert_eq!(oil.quantity, 3);
    assert_eq!(
        oil.period_start,
        NaiveDate::from_ymd_opt(2025, 9, 15)
    );
    assert_eq!(oil.report_date, None);

    let atta = facts.iter().find(|f| f.sku == "MB-002").expect("atta fact");
    assert_eq!(
        atta.sale_date,
        NaiveDate::from_ymd_opt(2025, 9, 16).unwrap()
    );
}

#[tokio::test]
async fn date_range_upload_without_bounds_is_rejected_before_parsing() {
    let app = TestApp::new().await;
    let reports = &app.state.services.reports;

    let mut request = sales_request();
    request.period_start = None;
    let err = reports
        .import_sales(SALES_CSV.as_bytes(), &request)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    // Nothing was tracked for the rejected upload.
    assert_eq!(
        upload_tracking::Entity::find()
            .count(&*app.state.db)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn report_preview_persists_nothing_and_matches_import_summary() {
    let app = TestApp::new().await;
    let reports = &app.state.services.reports;
    let db = &*app.state.db;

    let previewed = reports
        .preview_sales(SALES_CSV.as_bytes(), &sales_request())
        .expect("preview");
    assert_eq!(previewed.facts.len(), 2);
    assert_eq!(secondary_sale::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(upload_tracking::Entity::find().count(db).await.unwrap(), 0);

    let outcome = reports
        .import_sales(SALES_CSV.as_bytes(), &sales_request())
        .await
        .expect("import");
    match outcome {
        ReportOutcome::Imported { rows, summary } => {
            assert_eq!(rows, previewed.facts.len());
            assert_eq!(summary.total_units, previewed.summary.total_units);
        }
        other => panic!("expected imported outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn inventory_rows_carry_the_requested_period_stamp() {
    let app = TestApp::new().await;
    let reports = &app.state.services.reports;

    reports
        .import_inventory(INVENTORY_CSV.as_bytes(), &inventory_request())
        .await
        .expect("import");

    let rows = inventory_snapshot::Entity::find()
        .filter(inventory_snapshot::Column::Sku.eq("MB-002"))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].report_date,
        NaiveDate::from_ymd_opt(2025, 9, 17)
    );
    assert_eq!(rows[0].partner, "metrobazaar");
    assert_eq!(rows[0].period_type, "daily");
}
