use std::sync::Arc;

use chrono::Utc;
use sea_orm::error::SqlErr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{error, info, instrument, warn};

use crate::db::DbPool;
use crate::entities::{po_header, po_ledger, po_line};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{
    BatchOutcome, CanonicalPo, DuplicateInfo, ImportOutcome, ItemResult, ItemStatus, Partner,
};

/// Duplicate detector and importer for canonical purchase orders.
///
/// The pre-persist existence check is an optimization for clearer duplicate
/// messages; the unique index on (partner, po_number) is the actual
/// authority. Two concurrent imports of the same new po_number race on the
/// check, and the loser's constraint violation is re-classified as a
/// duplicate outcome rather than a failure.
#[derive(Clone)]
pub struct PoImportService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl PoImportService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// Imports one canonical purchase order: header, lines, and the unified
    /// ledger mirror in a single all-or-nothing transaction.
    #[instrument(skip(self, po), fields(partner = %po.header.partner, po_number = %po.header.po_number))]
    pub async fn import(&self, po: &CanonicalPo) -> Result<ImportOutcome, ServiceError> {
        validate(po)?;

        if let Some(existing) = self
            .find_existing(po.header.partner, &po.header.po_number)
            .await?
        {
            info!(existing_id = existing.header_id, "purchase order already imported");
            return Ok(ImportOutcome::Duplicate { existing });
        }

        match self.persist(po).await {
            Ok((header_id, lines)) => {
                info!(header_id, lines, "purchase order imported");
                if let Some(sender) = &self.event_sender {
                    if let Err(e) = sender
                        .send(Event::PoImported {
                            header_id,
                            partner: po.header.partner,
                            po_number: po.header.po_number.clone(),
                        })
                        .await
                    {
                        warn!(error = %e, "failed to send import event");
                    }
                }
                Ok(ImportOutcome::Imported { header_id, lines })
            }
            Err(err) if is_unique_violation(&err) => {
                // Lost the race to a concurrent import; the constraint is
                // the authority, so this is a duplicate, not a failure.
                warn!("duplicate key on insert; concurrent import won the race");
                match self
                    .find_existing(po.header.partner, &po.header.po_number)
                    .await?
                {
                    Some(existing) => Ok(ImportOutcome::Duplicate { existing }),
                    None => Err(self.persistence_error(po, err)),
                }
            }
            Err(err) => {
                error!(error = %err, "transactional write failed");
                Err(self.persistence_error(po, err))
            }
        }
    }

    /// Imports a batch, evaluating and persisting each purchase order
    /// independently. Item k failing never blocks item k+1; the caller gets
    /// counts plus a per-item result list.
    #[instrument(skip(self, pos), fields(batch_size = pos.len()))]
    pub async fn import_batch(&self, pos: &[CanonicalPo]) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            success: 0,
            duplicate: 0,
            failed: 0,
            results: Vec::with_capacity(pos.len()),
        };

        for po in pos {
            let po_number = po.header.po_number.clone();
            let status = match self.import(po).await {
                Ok(ImportOutcome::Imported { header_id, .. }) => {
                    outcome.success += 1;
                    ItemStatus::Imported { header_id }
                }
                Ok(ImportOutcome::Duplicate { existing }) => {
                    outcome.duplicate += 1;
                    ItemStatus::Duplicate {
                        existing_id: existing.header_id,
                    }
                }
                Err(err) => {
                    outcome.failed += 1;
                    error!(po_number = %po_number, error = %err, "batch item failed");
                    ItemStatus::Failed {
                        message: err.to_string(),
                    }
                }
            };
            outcome.results.push(ItemResult { po_number, status });
        }

        info!(
            success = outcome.success,
            duplicate = outcome.duplicate,
            failed = outcome.failed,
            "batch import finished"
        );
        outcome
    }

    async fn find_existing(
        &self,
        partner: Partner,
        po_number: &str,
    ) -> Result<Option<DuplicateInfo>, ServiceError> {
        let existing = po_header::Entity::find()
            .filter(po_header::Column::Partner.eq(partner.as_key()))
            .filter(po_header::Column::PoNumber.eq(po_number))
            .one(&*self.db)
            .await?;

        Ok(existing.map(|model| DuplicateInfo {
            header_id: model.id,
            po_number: model.po_number,
            po_date: model.po_date,
            vendor_name: model.vendor_name,
            created_at: model.created_at,
        }))
    }

    async fn persist(&self, po: &CanonicalPo) -> Result<(i64, usize), DbErr> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let header = po_header::ActiveModel {
            partner: Set(po.header.partner.as_key()),
            po_number: Set(po.header.po_number.clone()),
            po_date: Set(po.header.po_date),
            expiry_date: Set(po.header.expiry_date),
            delivery_date: Set(po.header.delivery_date),
            vendor_name: Set(po.header.vendor_name.clone()),
            vendor_code: Set(po.header.vendor_code.clone()),
            vendor_tax_id: Set(po.header.vendor_tax_id.clone()),
            buyer_name: Set(po.header.buyer_name.clone()),
            ship_to: Set(po.header.ship_to.clone()),
            bill_to: Set(po.header.bill_to.clone()),
            payment_terms: Set(po.header.payment_terms.clone()),
            total_quantity: Set(po.header.total_quantity),
            taxable_value: Set(po.header.taxable_value),
            tax_amount: Set(po.header.tax_amount),
            grand_total: Set(po.header.grand_total),
            status: Set(po.header.status.clone()),
            attachment_path: Set(po.header.attachment_path.clone()),
            created_by: Set(po.header.created_by.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let header_model = header.insert(&txn).await?;
        let header_id = header_model.id;

        // Lines are tagged with the generated header id and renumbered
        // 1-based regardless of what the source rows carried.
        let line_models: Vec<po_line::ActiveModel> = po
            .lines
            .iter()
            .enumerate()
            .map(|(idx, line)| po_line::ActiveModel {
                header_id: Set(header_id),
                line_number: Set(idx as i32 + 1),
                item_code: Set(line.item_code.clone()),
                item_description: Set(line.item_description.clone()),
                tax_code: Set(line.tax_code.clone()),
                tax_code_source: Set(line.tax_code_source.map(|s| s.as_str().to_string())),
                quantity: Set(line.quantity),
                unit_cost: Set(line.unit_cost),
                mrp: Set(line.mrp),
                taxable_value: Set(line.taxable_value),
                integrated_rate: Set(line.tax.integrated_rate),
                integrated_amount: Set(line.tax.integrated_amount),
                central_rate: Set(line.tax.central_rate),
                central_amount: Set(line.tax.central_amount),
                state_rate: Set(line.tax.state_rate),
                state_amount: Set(line.tax.state_amount),
                surcharge_rate: Set(line.tax.surcharge_rate),
                surcharge_amount: Set(line.tax.surcharge_amount),
                tax_amount: Set(line.tax.total_amount),
                line_total: Set(line.line_total),
                created_at: Set(now),
                ..Default::default()
            })
            .collect();
        let line_count = line_models.len();
        po_line::Entity::insert_many(line_models).exec(&txn).await?;

        let ledger = po_ledger::ActiveModel {
            header_id: Set(header_id),
            partner: Set(po.header.partner.as_key()),
            po_number: Set(po.header.po_number.clone()),
            po_date: Set(po.header.po_date),
            vendor_name: Set(po.header.vendor_name.clone()),
            distributor: Set(po.header.distributor.clone()),
            total_quantity: Set(po.header.total_quantity),
            grand_total: Set(po.header.grand_total),
            status: Set(po.header.status.clone()),
            created_by: Set(po.header.created_by.clone()),
            created_at: Set(now),
            ..Default::default()
        };
        ledger.insert(&txn).await?;

        txn.commit().await?;
        Ok((header_id, line_count))
    }

    fn persistence_error(&self, po: &CanonicalPo, source: DbErr) -> ServiceError {
        ServiceError::Persistence {
            partner: po.header.partner.as_key(),
            po_number: po.header.po_number.clone(),
            source,
        }
    }
}

fn validate(po: &CanonicalPo) -> Result<(), ServiceError> {
    if po.header.po_number.trim().is_empty() {
        return Err(ServiceError::validation("po_number must not be empty"));
    }
    if po.lines.is_empty() {
        return Err(ServiceError::validation(
            "a purchase order needs at least one line",
        ));
    }
    if po.lines.iter().any(|l| l.quantity.is_sign_negative()) {
        return Err(ServiceError::validation("line quantity must not be negative"));
    }
    Ok(())
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonicalPoHeader, CanonicalPoLine, TaxBreakdown};
    use assert_matches::assert_matches;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn po(po_number: &str, lines: Vec<CanonicalPoLine>) -> CanonicalPo {
        CanonicalPo {
            header: CanonicalPoHeader {
                partner: Partner::Swiftmart,
                po_number: po_number.to_string(),
                po_date: None,
                expiry_date: None,
                delivery_date: None,
                vendor_name: None,
                vendor_code: None,
                vendor_tax_id: None,
                buyer_name: None,
                ship_to: None,
                bill_to: None,
                payment_terms: None,
                distributor: None,
                total_quantity: Decimal::ZERO,
                taxable_value: Decimal::ZERO,
                tax_amount: Decimal::ZERO,
                grand_total: Decimal::ZERO,
                status: "Open".to_string(),
                attachment_path: None,
                created_by: "tester".to_string(),
            },
            lines,
        }
    }

    fn sample_line() -> CanonicalPoLine {
        CanonicalPoLine {
            line_number: 1,
            item_code: "SKU-1".to_string(),
            item_description: None,
            tax_code: None,
            tax_code_source: None,
            quantity: dec!(1),
            unit_cost: dec!(10),
            mrp: None,
            taxable_value: dec!(10),
            tax: TaxBreakdown::default(),
            line_total: dec!(10),
        }
    }

    #[test]
    fn validation_rejects_empty_po_number_and_empty_lines() {
        assert_matches!(
            validate(&po("  ", vec![sample_line()])),
            Err(ServiceError::Validation(_))
        );
        assert_matches!(validate(&po("PO-1", vec![])), Err(ServiceError::Validation(_)));
        assert!(validate(&po("PO-1", vec![sample_line()])).is_ok());
    }

    #[test]
    fn negative_quantity_fails_validation() {
        let mut line = sample_line();
        line.quantity = dec!(-1);
        assert_matches!(
            validate(&po("PO-1", vec![line])),
            Err(ServiceError::Validation(_))
        );
    }
}
