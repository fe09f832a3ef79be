//! Payment entity (append-only)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub booking_reference: String,

    /// Payment gateway, e.g. STRIPE
    pub gateway: String,

    #[sea_orm(unique)]
    pub transaction_id: String,

    pub amount_cents: i64,

    /// COMPLETED or FAILED
    pub outcome: String,

    #[sea_orm(nullable)]
    pub failure_reason: Option<String>,

    pub user_id: String,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
