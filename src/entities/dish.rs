//! Dish entity - a menu item belonging to one restaurant.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dish database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dishes")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning restaurant
    #[sea_orm(indexed)]
    pub restaurant_id: i64,
    /// Display name
    pub name: String,
    /// URL slug, unique within the restaurant
    pub slug: String,
    /// Menu description
    pub description: Option<String>,
    /// Menu section (e.g., "مقبلات", "مشاوي")
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Hosted image URL
    pub image_url: Option<String>,
    /// Whether the dish can currently be ordered
    pub is_available: bool,
    /// Average review rating rounded to one decimal
    pub rating: f64,
    /// Number of reviews the rating is computed from
    pub rating_count: i32,
    /// When the dish was created
    pub created_at: DateTimeUtc,
    /// When the dish was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Dish and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each dish belongs to one restaurant
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
