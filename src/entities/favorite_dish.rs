//! Favorite dish entity - a (user, dish) bookmark.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Favorite dish database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "favorite_dishes")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Auth-provider user id
    #[sea_orm(indexed)]
    pub user_id: String,
    /// Bookmarked dish
    pub dish_id: i64,
    /// When the bookmark was made
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `FavoriteDish` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each favorite points at one dish
    #[sea_orm(
        belongs_to = "super::dish::Entity",
        from = "Column::DishId",
        to = "super::dish::Column::Id",
        on_delete = "Cascade"
    )]
    Dish,
}

impl Related<super::dish::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dish.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
