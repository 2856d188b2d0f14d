//! Order entity - a dine-in order placed from a restaurant's menu.
//!
//! Totals are computed server-side when the order is placed and never change
//! afterwards; only `status` is updated, and it is set directly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Restaurant the order was placed at
    #[sea_orm(indexed)]
    pub restaurant_id: i64,
    /// Table the guest is sitting at, if known
    pub table_id: Option<i64>,
    /// Auth-provider user id of the guest, if signed in
    pub user_id: Option<String>,
    /// Name the guest gave
    pub customer_name: Option<String>,
    /// Free-text notes for the kitchen
    pub notes: Option<String>,
    /// `NEW`, `PREPARING`, `READY`, `COMPLETED` or `CANCELLED`
    pub status: String,
    /// Sum of line totals
    pub subtotal: f64,
    /// Tax on the subtotal
    pub tax: f64,
    /// Subtotal plus tax
    pub total: f64,
    /// When the order was placed
    pub created_at: DateTimeUtc,
    /// When the status last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one restaurant
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id",
        on_delete = "Cascade"
    )]
    Restaurant,
    /// Each order may reference one table
    #[sea_orm(
        belongs_to = "super::dining_table::Entity",
        from = "Column::TableId",
        to = "super::dining_table::Column::Id",
        on_delete = "SetNull"
    )]
    DiningTable,
    /// One order has many lines
    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Kitchen status of an order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Just placed
    New,
    /// Being cooked
    Preparing,
    /// Ready to serve
    Ready,
    /// Served and closed
    Completed,
    /// Cancelled by staff
    Cancelled,
}

impl OrderStatus {
    /// Value stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Preparing => "PREPARING",
            Self::Ready => "READY",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PREPARING" => Ok(Self::Preparing),
            "READY" => Ok(Self::Ready),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(crate::errors::Error::validation(
                "status",
                format!("حالة الطلب غير معروفة: {other}"),
            )),
        }
    }
}
