use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only secondary-sales fact row. Date-column reports produce one row
/// per (sku, sale_date) with a positive quantity.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "secondary_sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub partner: String,
    pub business_unit: String,
    pub period_type: String,
    pub report_date: Option<NaiveDate>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub sku: String,
    pub sku_description: Option<String>,
    pub brand: Option<String>,
    pub sale_date: NaiveDate,
    pub quantity: i64,
    pub revenue: Option<Decimal>,
    pub attachment_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
