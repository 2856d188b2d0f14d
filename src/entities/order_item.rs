//! Order item entity - one priced line of an order.
//!
//! Dish name and unit price are copied at order time so later menu edits do
//! not rewrite past orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Parent order
    #[sea_orm(indexed)]
    pub order_id: i64,
    /// Ordered dish
    pub dish_id: i64,
    /// Dish name at order time
    pub dish_name: String,
    /// Dish price at order time
    pub unit_price: f64,
    /// Quantity, 1 to 99
    pub quantity: i32,
    /// `unit_price * quantity`, rounded to cents
    pub line_total: f64,
}

/// Defines relationships between `OrderItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
