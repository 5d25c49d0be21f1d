use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Canonical purchase-order line. Line numbers are 1-based and sequential,
/// assigned at import time after noisy source rows were dropped.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "po_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub header_id: i64,
    pub line_number: i32,
    pub item_code: String,
    pub item_description: Option<String>,
    pub tax_code: Option<String>,
    pub tax_code_source: Option<String>,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub mrp: Option<Decimal>,
    pub taxable_value: Decimal,
    pub integrated_rate: Decimal,
    pub integrated_amount: Decimal,
    pub central_rate: Decimal,
    pub central_amount: Decimal,
    pub state_rate: Decimal,
    pub state_amount: Decimal,
    pub surcharge_rate: Decimal,
    pub surcharge_amount: Decimal,
    pub tax_amount: Decimal,
    pub line_total: Decimal,
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
