//! Restaurant review entity - one rating per (user, restaurant) pair.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Restaurant review database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restaurant_reviews")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Reviewed restaurant
    #[sea_orm(indexed)]
    pub restaurant_id: i64,
    /// Auth-provider user id of the reviewer
    pub user_id: String,
    /// Display name captured at review time
    pub user_name: Option<String>,
    /// Rating from 1 to 5
    pub rating: i32,
    /// Optional comment
    pub comment: Option<String>,
    /// When the review was first submitted
    pub created_at: DateTimeUtc,
    /// When the review was last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `RestaurantReview` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each review belongs to one restaurant
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
