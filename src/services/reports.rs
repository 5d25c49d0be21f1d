use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::error::SqlErr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{inventory_snapshot, secondary_sale, upload_tracking};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::extract::{inventory, metrobazaar, Warnings};
use crate::models::{Partner, PeriodType, ReportOutcome, UploadType};
use crate::services::sha256_hex;
use crate::sheet::Sheet;

/// Caller parameters for a periodic report import.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReportRequest {
    pub partner: Partner,

    #[validate(length(min = 1, message = "business unit is required"))]
    pub business_unit: String,

    pub period_type: PeriodType,
    pub report_date: Option<NaiveDate>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,

    #[validate(length(min = 1, message = "filename is required"))]
    pub filename: String,

    #[validate(length(min = 1, message = "uploader identity is required"))]
    pub uploaded_by: String,

    pub attachment_path: Option<String>,
}

/// Resolved reporting period: the stamp for daily uploads, or both bounds
/// for a date range.
#[derive(Debug, Clone, Copy)]
enum Period {
    Daily(NaiveDate),
    Range(NaiveDate, NaiveDate),
}

impl ReportRequest {
    /// Period checks beyond what `validator` derives express: a date-range
    /// upload must carry both bounds, in order. Daily uploads default to
    /// today, like the partner portals do.
    fn check_period(&self) -> Result<Period, ServiceError> {
        match self.period_type {
            PeriodType::Daily => Ok(Period::Daily(
                self.report_date.unwrap_or_else(|| Utc::now().date_naive()),
            )),
            PeriodType::DateRange => {
                let (Some(start), Some(end)) = (self.period_start, self.period_end) else {
                    return Err(ServiceError::validation(
                        "date-range uploads need period_start and period_end",
                    ));
                };
                if end < start {
                    return Err(ServiceError::validation(
                        "period_end must not precede period_start",
                    ));
                }
                Ok(Period::Range(start, end))
            }
        }
    }
}

enum FactRows {
    Inventory(Vec<inventory_snapshot::ActiveModel>),
    Sales(Vec<secondary_sale::ActiveModel>),
}

impl FactRows {
    fn len(&self) -> usize {
        match self {
            FactRows::Inventory(rows) => rows.len(),
            FactRows::Sales(rows) => rows.len(),
        }
    }
}

/// Importer for periodic inventory-snapshot and secondary-sales reports.
///
/// Fact rows are append-only; the guard against double-counting is the
/// upload-dedup ledger keyed by (file_hash, partner, business_unit,
/// period_type, upload_type), enforced by a pre-check for clear messages
/// and by the unique index when two identical uploads race.
#[derive(Clone)]
pub struct ReportImportService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ReportImportService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// Parses an inventory report and returns its facts without persisting,
    /// for caller-side confirmation.
    pub fn preview_inventory(
        &self,
        bytes: &[u8],
        request: &ReportRequest,
    ) -> Result<crate::models::InventoryExtract, ServiceError> {
        request.validate()?;
        request.check_period()?;
        let sheet = self.parse_sheet(bytes, request)?;
        let mut warnings = Warnings::default();
        inventory::parse_inventory(&sheet, &mut warnings).map_err(|source| {
            ServiceError::Extraction {
                partner: request.partner,
                source,
            }
        })
    }

    /// Parses a secondary-sales report without persisting.
    pub fn preview_sales(
        &self,
        bytes: &[u8],
        request: &ReportRequest,
    ) -> Result<crate::models::SalesExtract, ServiceError> {
        request.validate()?;
        request.check_period()?;
        let sheet = self.parse_sheet(bytes, request)?;
        let mut warnings = Warnings::default();
        metrobazaar::parse_sales(&sheet, &mut warnings).map_err(|source| {
            ServiceError::Extraction {
                partner: request.partner,
                source,
            }
        })
    }

    #[instrument(skip(self, bytes, request), fields(partner = %request.partner, filename = %request.filename))]
    pub async fn import_inventory(
        &self,
        bytes: &[u8],
        request: &ReportRequest,
    ) -> Result<ReportOutcome, ServiceError> {
        request.validate()?;
        let period = request.check_period()?;
        let file_hash = sha256_hex(bytes);

        if let Some(existing) = self
            .find_tracked(&file_hash, request, UploadType::Inventory)
            .await?
        {
            return Ok(duplicate_outcome(existing));
        }

        let sheet = self.parse_sheet(bytes, request)?;
        let mut warnings = Warnings::default();
        let extract = inventory::parse_inventory(&sheet, &mut warnings).map_err(|source| {
            ServiceError::Extraction {
                partner: request.partner,
                source,
            }
        })?;

        let now = Utc::now();
        let rows: Vec<inventory_snapshot::ActiveModel> = extract
            .facts
            .iter()
            .map(|fact| inventory_snapshot::ActiveModel {
                partner: Set(request.partner.as_key()),
                business_unit: Set(request.business_unit.clone()),
                period_type: Set(request.period_type.to_string()),
                report_date: Set(period.report_date()),
                period_start: Set(period.start()),
                period_end: Set(period.end()),
                sku: Set(fact.sku.clone()),
                sku_description: Set(fact.sku_description.clone()),
                category: Set(fact.category.clone()),
                brand: Set(fact.brand.clone()),
                city: Set(fact.city.clone()),
                quantity: Set(fact.quantity),
                attachment_path: Set(request.attachment_path.clone()),
                created_at: Set(now),
                ..Default::default()
            })
            .collect();

        match self
            .persist(
                request,
                UploadType::Inventory,
                &file_hash,
                bytes.len(),
                FactRows::Inventory(rows),
            )
            .await?
        {
            Persisted::Rows(rows) => {
                self.notify(request.partner, UploadType::Inventory, rows).await;
                Ok(ReportOutcome::Imported {
                    rows,
                    summary: extract.summary,
                })
            }
            Persisted::DuplicateFile(existing) => Ok(duplicate_outcome(existing)),
        }
    }

    #[instrument(skip(self, bytes, request), fields(partner = %request.partner, filename = %request.filename))]
    pub async fn import_sales(
        &self,
        bytes: &[u8],
        request: &ReportRequest,
    ) -> Result<ReportOutcome, ServiceError> {
        request.validate()?;
        let period = request.check_period()?;
        let file_hash = sha256_hex(bytes);

        if let Some(existing) = self
            .find_tracked(&file_hash, request, UploadType::SecondarySales)
            .await?
        {
            return Ok(duplicate_outcome(existing));
        }

        let sheet = self.parse_sheet(bytes, request)?;
        let mut warnings = Warnings::default();
        let extract = metrobazaar::parse_sales(&sheet, &mut warnings).map_err(|source| {
            ServiceError::Extraction {
                partner: request.partner,
                source,
            }
        })?;

        let now = Utc::now();
        let rows: Vec<secondary_sale::ActiveModel> = extract
            .facts
            .iter()
            .map(|fact| secondary_sale::ActiveModel {
                partner: Set(request.partner.as_key()),
                business_unit: Set(request.business_unit.clone()),
                period_type: Set(request.period_type.to_string()),
                report_date: Set(period.report_date()),
                period_start: Set(period.start()),
                period_end: Set(period.end()),
                sku: Set(fact.sku.clone()),
                sku_description: Set(fact.sku_description.clone()),
                brand: Set(fact.brand.clone()),
                sale_date: Set(fact.sale_date),
                quantity: Set(fact.quantity),
                revenue: Set(fact.revenue),
                attachment_path: Set(request.attachment_path.clone()),
                created_at: Set(now),
                ..Default::default()
            })
            .collect();

        match self
            .persist(
                request,
                UploadType::SecondarySales,
                &file_hash,
                bytes.len(),
                FactRows::Sales(rows),
            )
            .await?
        {
            Persisted::Rows(rows) => {
                self.notify(request.partner, UploadType::SecondarySales, rows)
                    .await;
                Ok(ReportOutcome::Imported {
                    rows,
                    summary: extract.summary,
                })
            }
            Persisted::DuplicateFile(existing) => Ok(duplicate_outcome(existing)),
        }
    }

    fn parse_sheet(&self, bytes: &[u8], request: &ReportRequest) -> Result<Sheet, ServiceError> {
        Sheet::parse(bytes).map_err(|source| ServiceError::Extraction {
            partner: request.partner,
            source,
        })
    }

    /// Inserts fact rows plus the tracking record in one transaction. A
    /// unique violation on the tracking index means an identical upload won
    /// a race; it is re-classified as a duplicate-file outcome.
    async fn persist(
        &self,
        request: &ReportRequest,
        upload_type: UploadType,
        file_hash: &str,
        file_size: usize,
        rows: FactRows,
    ) -> Result<Persisted, ServiceError> {
        let row_count = rows.len();
        let result: Result<(), DbErr> = async {
            let txn = self.db.begin().await?;

            match rows {
                FactRows::Inventory(rows) => {
                    inventory_snapshot::Entity::insert_many(rows).exec(&txn).await?;
                }
                FactRows::Sales(rows) => {
                    secondary_sale::Entity::insert_many(rows).exec(&txn).await?;
                }
            }

            let tracking = upload_tracking::ActiveModel {
                file_hash: Set(file_hash.to_string()),
                partner: Set(request.partner.as_key()),
                business_unit: Set(request.business_unit.clone()),
                period_type: Set(request.period_type.to_string()),
                upload_type: Set(upload_type.to_string()),
                file_name: Set(request.filename.clone()),
                file_size: Set(file_size as i64),
                uploaded_by: Set(request.uploaded_by.clone()),
                uploaded_at: Set(Utc::now()),
                ..Default::default()
            };
            tracking.insert(&txn).await?;

            txn.commit().await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => Ok(Persisted::Rows(row_count)),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                warn!("identical upload won a race; re-classified as duplicate file");
                match self.find_tracked(file_hash, request, upload_type).await? {
                    Some(existing) => Ok(Persisted::DuplicateFile(existing)),
                    None => Err(ServiceError::Database(err)),
                }
            }
            Err(err) => Err(ServiceError::Database(err)),
        }
    }

    async fn find_tracked(
        &self,
        file_hash: &str,
        request: &ReportRequest,
        upload_type: UploadType,
    ) -> Result<Option<upload_tracking::Model>, ServiceError> {
        let existing = upload_tracking::Entity::find()
            .filter(upload_tracking::Column::FileHash.eq(file_hash))
            .filter(upload_tracking::Column::Partner.eq(request.partner.as_key()))
            .filter(upload_tracking::Column::BusinessUnit.eq(&*request.business_unit))
            .filter(upload_tracking::Column::PeriodType.eq(request.period_type.to_string()))
            .filter(upload_tracking::Column::UploadType.eq(upload_type.to_string()))
            .one(&*self.db)
            .await?;
        Ok(existing)
    }

    async fn notify(&self, partner: Partner, upload_type: UploadType, rows: usize) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::ReportImported {
                    partner,
                    upload_type,
                    rows,
                })
                .await
            {
                warn!(error = %e, "failed to send report event");
            }
        }
    }
}

impl Period {
    fn report_date(&self) -> Option<NaiveDate> {
        match self {
            Period::Daily(date) => Some(*date),
            Period::Range(..) => None,
        }
    }

    fn start(&self) -> Option<NaiveDate> {
        match self {
            Period::Daily(_) => None,
            Period::Range(start, _) => Some(*start),
        }
    }

    fn end(&self) -> Option<NaiveDate> {
        match self {
            Period::Daily(_) => None,
            Period::Range(_, end) => Some(*end),
        }
    }
}

enum Persisted {
    Rows(usize),
    DuplicateFile(upload_tracking::Model),
}

fn duplicate_outcome(existing: upload_tracking::Model) -> ReportOutcome {
    info!(
        file_hash = %existing.file_hash,
        uploaded_at = %existing.uploaded_at,
        "identical file already imported for this combination"
    );
    ReportOutcome::DuplicateFile {
        file_hash: existing.file_hash,
        first_uploaded_at: existing.uploaded_at,
        first_uploaded_by: existing.uploaded_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request(period_type: PeriodType) -> ReportRequest {
        ReportRequest {
            partner: Partner::Metrobazaar,
            business_unit: "foods".to_string(),
            period_type,
            report_date: None,
            period_start: None,
            period_end: None,
            filename: "metrobazaar_sales.csv".to_string(),
            uploaded_by: "ops@vendorhub".to_string(),
            attachment_path: None,
        }
    }

    #[test]
    fn daily_defaults_report_date_to_today() {
        let period = request(PeriodType::Daily).check_period().unwrap();
        assert_eq!(period.report_date(), Some(Utc::now().date_naive()));
        assert_eq!(period.start(), None);
    }

    #[test]
    fn date_range_requires_ordered_bounds() {
        let mut req = request(PeriodType::DateRange);
        assert_matches!(req.check_period(), Err(ServiceError::Validation(_)));

        req.period_start = NaiveDate::from_ymd_opt(2025, 9, 1);
        req.period_end = NaiveDate::from_ymd_opt(2025, 8, 1);
        assert_matches!(req.check_period(), Err(ServiceError::Validation(_)));

        req.period_end = NaiveDate::from_ymd_opt(2025, 9, 30);
        let period = req.check_period().unwrap();
        assert_eq!(period.start(), NaiveDate::from_ymd_opt(2025, 9, 1));
        assert_eq!(period.end(), NaiveDate::from_ymd_opt(2025, 9, 30));
        assert_eq!(period.report_date(), None);
    }
}
