//! Favorite restaurant entity - a (user, restaurant) bookmark.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Favorite restaurant database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "favorite_restaurants")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Auth-provider user id
    #[sea_orm(indexed)]
    pub user_id: String,
    /// Bookmarked restaurant
    pub restaurant_id: i64,
    /// When the bookmark was made
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `FavoriteRestaurant` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each favorite points at one restaurant
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
