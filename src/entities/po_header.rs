use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Canonical purchase-order header row. One row per (partner, po_number);
/// the unique index on that pair is the final authority for duplicate
/// detection under concurrent imports.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "po_headers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub partner: String,
    pub po_number: String,
    pub po_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub vendor_name: Option<String>,
    pub vendor_code: Option<String>,
    pub vendor_tax_id: Option<String>,
    pub buyer_name: Option<String>,
    pub ship_to: Option<String>,
    pub bill_to: Option<String>,
    pub payment_terms: Option<String>,
    pub total_quantity: Decimal,
    pub taxable_value: Decimal,
    pub tax_amount: Decimal,
    pub grand_total: Decimal,
    pub status: String,
    pub attachment_path: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::po_line::Entity")]
    PoLines,
    #[sea_orm(has_many = "super::po_ledger::Entity")]
    PoLedger,
}

impl Related<super::po_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PoLines.def()
    }
}

impl Related<super::po_ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PoLedger.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
