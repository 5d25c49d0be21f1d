use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Unified cross-partner ledger. Every imported purchase order is mirrored
/// here in the same transaction as its header and lines, for consolidated
/// reporting by downstream collaborators.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "po_ledger")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub header_id: i64,
    pub partner: String,
    pub po_number: String,
    pub po_date: Option<NaiveDate>,
    pub vendor_name: Option<String>,
    pub distributor: Option<String>,
    pub total_quantity: Decimal,
    pub grand_total: Decimal,
    pub status: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::po_header::Entity",
        from = "Column::HeaderId",
        to = "super::po_header::Column::Id",
        on_delete = "Cascade"
    )]
    PoHeader,
}

impl Related<super::po_header::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PoHeader.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
