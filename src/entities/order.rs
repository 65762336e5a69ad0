use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A durable order created once per checkout. After creation the row is
/// read-only except for `order_total`, which is recomputed when an order
/// line is removed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Human-shareable random code; unique, not retried on collision.
    #[validate(length(min = 1, max = 50, message = "Track number must be 1-50 characters"))]
    pub track_number: String,

    pub user_id: Uuid,
    pub shipping_address_id: Uuid,
    pub payment_type_id: Uuid,
    pub shipping_method_id: Uuid,
    pub status_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub order_total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLines,
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
