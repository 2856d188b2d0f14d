//! Dining table entity - a numbered table that dine-in orders can reference.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dining table database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dining_tables")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning restaurant
    #[sea_orm(indexed)]
    pub restaurant_id: i64,
    /// Table number, unique within the restaurant
    pub number: i32,
    /// Seat count
    pub seats: i32,
    /// Optional label (e.g., "تراس")
    pub label: Option<String>,
    /// Inactive tables cannot receive orders
    pub is_active: bool,
    /// When the table was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `DiningTable` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each table belongs to one restaurant
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id",
        on_delete = "Cascade"
    )]
    Restaurant,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
