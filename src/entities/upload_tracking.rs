use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Upload-dedup ledger for periodic reports. The unique index on
/// (file_hash, partner, business_unit, period_type, upload_type) guarantees
/// an identical file is never persisted twice for the same import
/// combination.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "upload_tracking")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub file_hash: String,
    pub partner: String,
    pub business_unit: String,
    pub period_type: String,
    pub upload_type: String,
    pub file_name: String,
    pub file_size: i64,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
